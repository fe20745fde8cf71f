//! Collision detection and hit scoring
//!
//! Projectiles are points, gifts are axis-aligned boxes. The test runs against
//! the gift's *next* position so a fast gift cannot step over a projectile
//! between two frames.

use glam::Vec2;

use super::state::{ComboState, FallingGift, GiftState, Projectile, ScorePopup};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Inclusive on every edge
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }
}

/// Box of a gift if it were at `y`
pub fn gift_rect_at(gift: &FallingGift, y: f32) -> Rect {
    Rect::new(gift.pos.x, y, gift.width, gift.height)
}

/// First projectile overlapping the rectangle, if any
pub fn first_overlap<'a>(rect: &Rect, projectiles: &'a [Projectile]) -> Option<&'a Projectile> {
    projectiles.iter().find(|p| rect.contains(p.pos))
}

/// Outcome of resolving one gift against the projectiles for one frame
#[derive(Debug, Clone)]
pub struct HitResolution {
    pub hit: bool,
    /// The gift after this frame (moved, damaged or exploding)
    pub gift: FallingGift,
    pub combo: ComboState,
    /// Base points plus combo bonus, added to the score
    pub points_awarded: u32,
    /// Value shown in the popup (base points only)
    pub popup_value: u32,
    pub popup: Option<ScorePopup>,
}

/// Resolve one frame for one gift
///
/// A gift takes at most one hit per frame no matter how many projectiles
/// overlap it, and projectiles are not consumed. A gift that is hit does not
/// advance this frame; a gift that is missed moves to its candidate y.
pub fn resolve_hit(
    gift: &FallingGift,
    projectiles: &[Projectile],
    combo: &ComboState,
    now_ms: f64,
) -> HitResolution {
    let unchanged = |gift: FallingGift| HitResolution {
        hit: false,
        gift,
        combo: *combo,
        points_awarded: 0,
        popup_value: 0,
        popup: None,
    };

    if gift.is_hit() {
        return unchanged(gift.clone());
    }

    let next_y = gift.pos.y + gift.speed;
    let candidate = gift_rect_at(gift, next_y);

    if first_overlap(&candidate, projectiles).is_none() {
        let mut moved = gift.clone();
        moved.pos.y = next_y;
        return unchanged(moved);
    }

    let new_combo = combo.register_hit(now_ms);
    let points_awarded = gift.points + new_combo.bonus();

    let mut damaged = gift.clone();
    if damaged.health > 1 {
        damaged.health -= 1;
    } else {
        damaged.health = 0;
        damaged.state = GiftState::Exploding { timer_ms: 0.0 };
    }

    HitResolution {
        hit: true,
        gift: damaged,
        combo: new_combo,
        points_awarded,
        popup_value: gift.points,
        popup: Some(ScorePopup {
            pos: Vec2::new(gift.pos.x + gift.width / 2.0, next_y),
            value: gift.points,
            created_ms: now_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GiftColor;

    fn gift(x: f32, y: f32, health: u8, points: u32) -> FallingGift {
        FallingGift {
            id: 1,
            pos: Vec2::new(x, y),
            width: 40.0,
            height: 40.0,
            speed: 2.0,
            health,
            points,
            color: GiftColor::Red,
            state: GiftState::Falling,
        }
    }

    fn shot(x: f32, y: f32) -> Projectile {
        Projectile::new(100, Vec2::new(x, y))
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(100.0, 100.0, 40.0, 40.0);
        assert!(r.contains(Vec2::new(100.0, 100.0)));
        assert!(r.contains(Vec2::new(140.0, 140.0)));
        assert!(!r.contains(Vec2::new(140.1, 120.0)));
        assert!(!r.contains(Vec2::new(120.0, 99.9)));
    }

    #[test]
    fn test_single_hit_destroys_one_health_gift() {
        let g = gift(100.0, 100.0, 1, 1);
        let res = resolve_hit(&g, &[shot(120.0, 110.0)], &ComboState::default(), 5000.0);

        assert!(res.hit);
        assert!(res.gift.is_hit());
        assert_eq!(res.combo.combo, 1);
        assert_eq!(res.points_awarded, 1);
        assert_eq!(res.popup_value, 1);
        let popup = res.popup.expect("popup on hit");
        assert_eq!(popup.pos, Vec2::new(120.0, 102.0));
        // Hit gifts hold their position
        assert_eq!(res.gift.pos.y, 100.0);
    }

    #[test]
    fn test_lookahead_uses_next_position() {
        // Projectile sits just below the current box but inside the next one
        let g = gift(100.0, 100.0, 1, 1);
        let res = resolve_hit(&g, &[shot(120.0, 141.5)], &ComboState::default(), 0.0);
        assert!(res.hit);

        // Projectile at the current top edge is above the next box
        let res = resolve_hit(&g, &[shot(120.0, 101.0)], &ComboState::default(), 0.0);
        assert!(!res.hit);
        assert_eq!(res.gift.pos.y, 102.0);
    }

    #[test]
    fn test_tough_gift_loses_health_and_keeps_falling_state() {
        let g = gift(0.0, 0.0, 2, 1);
        let res = resolve_hit(&g, &[shot(10.0, 10.0)], &ComboState::default(), 0.0);
        assert!(res.hit);
        assert!(!res.gift.is_hit());
        assert_eq!(res.gift.health, 1);

        let res = resolve_hit(&res.gift, &[shot(10.0, 10.0)], &res.combo, 100.0);
        assert!(res.gift.is_hit());
        assert_eq!(res.combo.combo, 2);
    }

    #[test]
    fn test_overlapping_volley_counts_once() {
        let g = gift(0.0, 0.0, 2, 1);
        let volley = [shot(5.0, 10.0), shot(10.0, 10.0), shot(15.0, 10.0)];
        let res = resolve_hit(&g, &volley, &ComboState::default(), 0.0);
        assert_eq!(res.gift.health, 1);
        assert_eq!(res.combo.combo, 1);
    }

    #[test]
    fn test_popup_hides_combo_bonus() {
        let combo = ComboState {
            combo: 2,
            last_hit_ms: Some(900.0),
        };
        let g = gift(0.0, 0.0, 1, 3);
        let res = resolve_hit(&g, &[shot(20.0, 20.0)], &combo, 1000.0);
        assert_eq!(res.combo.combo, 3);
        assert_eq!(res.points_awarded, 4);
        assert_eq!(res.popup_value, 3);
    }

    #[test]
    fn test_exploding_gift_is_ignored() {
        let mut g = gift(0.0, 0.0, 0, 1);
        g.state = GiftState::Exploding { timer_ms: 50.0 };
        let res = resolve_hit(&g, &[shot(20.0, 20.0)], &ComboState::default(), 0.0);
        assert!(!res.hit);
        assert_eq!(res.gift.pos.y, 0.0);
        assert_eq!(res.combo, ComboState::default());
    }
}
