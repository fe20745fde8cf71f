//! Per-frame simulation step
//!
//! `step` advances projectiles, resolves hits, scores, and retires expired
//! entities. Entity speeds are in pixels per frame; `dt_ms` only advances the
//! session clock that combo timing, popups and explosions are measured on.

use super::collision::resolve_hit;
use super::state::{GameEvent, GameState, GiftState, Facing, Projectile, SessionPhase};
use crate::consts::*;

/// Continuous movement intent, sampled on the input-poll cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

/// Discrete inputs for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Fire events received since the previous frame
    pub fire: u32,
}

/// Spawn a projectile at the avatar's muzzle
pub fn fire(state: &mut GameState) -> Option<u32> {
    if state.phase != SessionPhase::Playing {
        return None;
    }
    let id = state.next_entity_id();
    let projectile = Projectile::new(id, state.avatar.muzzle());
    state.projectiles.push(projectile);
    state.events.push(GameEvent::Fired);
    Some(id)
}

/// Apply one input-poll tick of movement
///
/// `speed_scale` is 1.0 for the keyboard and higher for touch.
pub fn move_avatar(state: &mut GameState, intent: MoveIntent, speed_scale: f32) {
    if state.phase != SessionPhase::Playing {
        return;
    }
    let max_x = state.avatar.max_x(state.viewport);
    let avatar = &mut state.avatar;
    let delta = avatar.speed * speed_scale;

    match intent {
        MoveIntent::None => {
            avatar.is_moving = false;
        }
        MoveIntent::Left => {
            avatar.pos.x = (avatar.pos.x - delta).max(0.0);
            avatar.is_moving = true;
            avatar.facing = Facing::Left;
        }
        MoveIntent::Right => {
            avatar.pos.x = (avatar.pos.x + delta).min(max_x);
            avatar.is_moving = true;
            avatar.facing = Facing::Right;
        }
    }
}

/// Advance the game state by one animation frame
pub fn step(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if state.phase != SessionPhase::Playing {
        return;
    }

    state.clock_ms += dt_ms.max(0.0);
    let now = state.clock_ms;

    for _ in 0..input.fire {
        fire(state);
    }

    // Projectiles leave their previous position behind as trail, then fly up
    for projectile in &mut state.projectiles {
        projectile.record_trail();
        projectile.pos.y -= projectile.speed;
    }
    state.projectiles.retain(|p| p.pos.y >= 0.0);

    // Gifts fall, or take a hit at their next position
    let mut combo = state.combo;
    for gift in state.gifts.iter_mut() {
        if let GiftState::Exploding { timer_ms } = &mut gift.state {
            *timer_ms += dt_ms.max(0.0);
            continue;
        }

        let res = resolve_hit(gift, &state.projectiles, &combo, now);
        if res.hit {
            combo = res.combo;
            state.score += u64::from(res.points_awarded);
            if let Some(popup) = res.popup {
                state.popups.push(popup);
            }
            state.events.push(GameEvent::Hit {
                gift_id: gift.id,
                points: res.points_awarded,
                combo: combo.combo,
                destroyed: res.gift.is_hit(),
            });
            if combo.combo % COMBO_BONUS_EVERY == 0 {
                state.events.push(GameEvent::ComboMilestone { combo: combo.combo });
            }
        }
        *gift = res.gift;
    }
    state.combo = combo;

    let cleanup_y = state.viewport.height + GIFT_EXIT_MARGIN;
    state.gifts.retain(|g| {
        let finished = matches!(g.state, GiftState::Exploding { timer_ms } if timer_ms >= EXPLOSION_DURATION_MS);
        g.pos.y <= cleanup_y && !finished
    });

    state.popups.retain(|p| !p.is_expired(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ComboState, FallingGift, GiftColor, Viewport};
    use glam::Vec2;

    fn playing() -> GameState {
        let mut state = GameState::new(12345, Viewport::new(800.0, 600.0));
        state.start();
        state
    }

    fn add_gift(state: &mut GameState, x: f32, y: f32, health: u8, points: u32) -> u32 {
        let id = state.next_entity_id();
        state.gifts.push(FallingGift {
            id,
            pos: Vec2::new(x, y),
            width: 40.0,
            height: 40.0,
            speed: 2.0,
            health,
            points,
            color: GiftColor::Gold,
            state: GiftState::Falling,
        });
        id
    }

    fn add_projectile(state: &mut GameState, x: f32, y: f32) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(id, Vec2::new(x, y)));
    }

    #[test]
    fn test_step_is_noop_outside_playing() {
        let mut state = GameState::new(1, Viewport::default());
        add_gift(&mut state, 10.0, 10.0, 1, 1);
        step(&mut state, &TickInput { fire: 1 }, 16.0);
        assert_eq!(state.clock_ms, 0.0);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.gifts[0].pos.y, 10.0);
    }

    #[test]
    fn test_empty_step_changes_nothing_but_clock() {
        let mut state = playing();
        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.score, 0);
        assert!(state.gifts.is_empty());
        assert!(state.projectiles.is_empty());
        assert!(state.drain_events().is_empty());
        assert_eq!(state.clock_ms, 16.0);
    }

    #[test]
    fn test_fire_spawns_at_avatar_center() {
        let mut state = playing();
        state.avatar.pos.x = 400.0;
        fire(&mut state);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pos, Vec2::new(430.0, 520.0));
        assert_eq!(state.drain_events(), vec![GameEvent::Fired]);
    }

    #[test]
    fn test_projectile_removed_after_leaving_top() {
        let mut state = playing();
        fire(&mut state);
        let start_y = state.projectiles[0].pos.y;

        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.projectiles[0].pos.y, start_y - PROJECTILE_SPEED);
        assert_eq!(state.projectiles[0].trail.len(), 1);
        // Trail lags one step behind the projectile
        assert_eq!(state.projectiles[0].trail[0].pos.y, start_y);

        let frames_to_exit = (start_y / PROJECTILE_SPEED).ceil() as usize + 1;
        for _ in 0..frames_to_exit {
            step(&mut state, &TickInput::default(), 16.0);
        }
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_gift_falls_by_speed() {
        let mut state = playing();
        add_gift(&mut state, 100.0, 0.0, 1, 1);
        step(&mut state, &TickInput::default(), 16.0);
        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.gifts[0].pos.y, 4.0);
    }

    #[test]
    fn test_hit_scores_and_spawns_popup() {
        let mut state = playing();
        state.clock_ms = 5000.0;
        let id = add_gift(&mut state, 100.0, 100.0, 1, 1);
        // After moving up 10px the shot sits inside the gift's next box
        add_projectile(&mut state, 120.0, 130.0);

        step(&mut state, &TickInput::default(), 16.0);

        assert_eq!(state.score, 1);
        assert_eq!(state.combo.combo, 1);
        assert!(state.gifts[0].is_hit());
        assert_eq!(state.popups.len(), 1);
        assert_eq!(state.popups[0].value, 1);
        assert!(state.drain_events().contains(&GameEvent::Hit {
            gift_id: id,
            points: 1,
            combo: 1,
            destroyed: true,
        }));
    }

    #[test]
    fn test_hit_gift_is_not_hit_again() {
        let mut state = playing();
        add_gift(&mut state, 100.0, 100.0, 1, 1);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_tough_gift_needs_two_hits() {
        let mut state = playing();
        add_gift(&mut state, 100.0, 100.0, 2, 1);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.gifts[0].health, 1);
        assert!(!state.gifts[0].is_hit());

        // The same projectile is still inside the box next frame
        step(&mut state, &TickInput::default(), 16.0);
        assert!(state.gifts[0].is_hit());
        assert_eq!(state.score, 2);
        assert_eq!(state.combo.combo, 2);
    }

    #[test]
    fn test_three_quick_hits_earn_bonus() {
        let mut state = playing();
        let mut awarded = Vec::new();
        for i in 0..3 {
            let x = 100.0 + i as f32 * 100.0;
            add_gift(&mut state, x, 100.0, 1, 1);
            add_projectile(&mut state, x + 20.0, 130.0);
            let before = state.score;
            step(&mut state, &TickInput::default(), 300.0);
            awarded.push(state.score - before);
            state.projectiles.clear();
        }
        assert_eq!(awarded, vec![1, 1, 2]);
        assert_eq!(state.combo.combo, 3);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ComboMilestone { combo: 3 })
        );
        // Popups show base points only
        assert!(state.popups.iter().all(|p| p.value == 1));
    }

    #[test]
    fn test_combo_resets_after_window() {
        let mut state = playing();
        state.combo = ComboState {
            combo: 5,
            last_hit_ms: Some(0.0),
        };
        state.clock_ms = 2000.0;
        add_gift(&mut state, 100.0, 100.0, 1, 1);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.combo.combo, 1);
    }

    #[test]
    fn test_gifts_cleaned_up_below_margin() {
        let mut state = playing();
        add_gift(&mut state, 0.0, 649.0, 1, 1);
        step(&mut state, &TickInput::default(), 16.0);
        assert!(state.gifts.is_empty());
    }

    #[test]
    fn test_explosion_finishes_and_is_removed() {
        let mut state = playing();
        add_gift(&mut state, 100.0, 100.0, 1, 1);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        state.projectiles.clear();
        assert_eq!(state.gifts.len(), 1);

        step(&mut state, &TickInput::default(), 200.0);
        assert_eq!(state.gifts.len(), 1);
        assert!(state.gifts[0].explosion_progress() > 0.4);
        step(&mut state, &TickInput::default(), 200.0);
        assert!(state.gifts.is_empty());
    }

    #[test]
    fn test_popups_expire_after_one_second() {
        let mut state = playing();
        add_gift(&mut state, 100.0, 100.0, 1, 1);
        add_projectile(&mut state, 120.0, 130.0);
        step(&mut state, &TickInput::default(), 16.0);
        state.projectiles.clear();
        assert_eq!(state.popups.len(), 1);
        step(&mut state, &TickInput::default(), 999.0);
        assert_eq!(state.popups.len(), 1);
        step(&mut state, &TickInput::default(), 1.0);
        assert!(state.popups.is_empty());
    }

    #[test]
    fn test_move_avatar_clamps_both_edges() {
        let mut state = playing();
        state.avatar.pos.x = 5.0;
        move_avatar(&mut state, MoveIntent::Left, 1.0);
        assert_eq!(state.avatar.pos.x, 0.0);
        assert_eq!(state.avatar.facing, Facing::Left);
        assert!(state.avatar.is_moving);

        state.avatar.pos.x = 735.0;
        move_avatar(&mut state, MoveIntent::Right, 1.0);
        assert_eq!(state.avatar.pos.x, 740.0);

        move_avatar(&mut state, MoveIntent::None, 1.0);
        assert!(!state.avatar.is_moving);
        assert_eq!(state.avatar.facing, Facing::Right);
    }

    #[test]
    fn test_touch_scale_moves_faster() {
        let mut state = playing();
        state.avatar.pos.x = 100.0;
        move_avatar(&mut state, MoveIntent::Right, TOUCH_SPEED_MULTIPLIER);
        assert!((state.avatar.pos.x - 114.4).abs() < 1e-4);
    }
}
