//! Gift spawner
//!
//! Runs on its own cadence, independent of the frame loop. The cap is for the
//! whole session: once reached (or once the timer hits zero) nothing spawns
//! until the next `start`.

use glam::Vec2;
use rand::Rng;

use super::state::{FallingGift, GameEvent, GameState, GiftColor, GiftState, SessionPhase, Viewport};
use crate::consts::*;

/// Why a spawn tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnBlocked {
    NotPlaying,
    TimeUp,
    CapReached,
}

/// Whether another gift may be spawned right now
pub fn can_spawn(state: &GameState) -> Result<(), SpawnBlocked> {
    if state.phase != SessionPhase::Playing {
        Err(SpawnBlocked::NotPlaying)
    } else if state.time_left == 0 {
        Err(SpawnBlocked::TimeUp)
    } else if state.gifts_spawned >= MAX_GIFTS_PER_SESSION {
        Err(SpawnBlocked::CapReached)
    } else {
        Ok(())
    }
}

/// Roll a new gift just above the viewport
///
/// The horizontal range is clamped so a viewport narrower than a gift still
/// yields an on-screen x of 0.
pub fn random_gift<R: Rng>(rng: &mut R, id: u32, viewport: Viewport) -> FallingGift {
    let max_x = (viewport.width - GIFT_SIZE).max(0.0);
    let x = if max_x > 0.0 {
        rng.random_range(0.0..=max_x)
    } else {
        0.0
    };
    let speed = rng.random_range(GIFT_MIN_SPEED..GIFT_MAX_SPEED);
    let health = if rng.random_bool(TOUGH_GIFT_CHANCE) {
        TOUGH_GIFT_HEALTH
    } else {
        1
    };
    let points = if rng.random_bool(BONUS_GIFT_CHANCE) {
        BONUS_GIFT_POINTS
    } else {
        1
    };
    let color = GiftColor::ALL[rng.random_range(0..GiftColor::ALL.len())];

    FallingGift {
        id,
        pos: Vec2::new(x, GIFT_SPAWN_Y),
        width: GIFT_SIZE,
        height: GIFT_SIZE,
        speed,
        health,
        points,
        color,
        state: GiftState::Falling,
    }
}

/// One spawn tick: adds a gift if allowed
///
/// Emits `SpawnerExhausted` when this spawn used up the session cap.
pub fn spawn_gift(state: &mut GameState) -> Result<u32, SpawnBlocked> {
    can_spawn(state)?;

    let id = state.next_entity_id();
    let viewport = state.viewport;
    let gift = random_gift(&mut state.rng, id, viewport);
    state.gifts.push(gift);
    state.gifts_spawned += 1;

    if state.gifts_spawned >= MAX_GIFTS_PER_SESSION {
        log::info!("Spawn cap of {} gifts reached", MAX_GIFTS_PER_SESSION);
        state.events.push(GameEvent::SpawnerExhausted);
    }
    Ok(id)
}

/// Drop the first gift right at session start
///
/// Not a spawn tick: it does not count toward the session cap.
pub fn place_opening_gift(state: &mut GameState) -> u32 {
    let id = state.next_entity_id();
    let viewport = state.viewport;
    let gift = random_gift(&mut state.rng, id, viewport);
    state.gifts.push(gift);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        let mut state = GameState::new(7, Viewport::new(800.0, 600.0));
        state.phase = SessionPhase::Playing;
        state
    }

    #[test]
    fn test_random_gift_ranges() {
        let mut rng = Pcg32::seed_from_u64(42);
        let vp = Viewport::new(800.0, 600.0);
        for i in 0..500 {
            let g = random_gift(&mut rng, i, vp);
            assert!(g.pos.x >= 0.0 && g.pos.x <= 760.0);
            assert_eq!(g.pos.y, GIFT_SPAWN_Y);
            assert!(g.speed >= 2.0 && g.speed < 3.0);
            assert!(g.health == 1 || g.health == 2);
            assert!(g.points == 1 || g.points == 3);
            assert_eq!(g.state, GiftState::Falling);
        }
    }

    #[test]
    fn test_random_gift_distribution_is_plausible() {
        let mut rng = Pcg32::seed_from_u64(9);
        let vp = Viewport::default();
        let n = 5000;
        let gifts: Vec<_> = (0..n).map(|i| random_gift(&mut rng, i, vp)).collect();
        let tough = gifts.iter().filter(|g| g.health == 2).count() as f64 / n as f64;
        let bonus = gifts.iter().filter(|g| g.points == 3).count() as f64 / n as f64;
        assert!((tough - 0.2).abs() < 0.03, "tough ratio {tough}");
        assert!((bonus - 0.1).abs() < 0.03, "bonus ratio {bonus}");
        for color in GiftColor::ALL {
            assert!(gifts.iter().any(|g| g.color == color));
        }
    }

    #[test]
    fn test_narrow_viewport_clamps_to_zero() {
        let mut rng = Pcg32::seed_from_u64(1);
        let g = random_gift(&mut rng, 1, Viewport::new(0.0, 600.0));
        assert_eq!(g.pos.x, 0.0);
        assert!(g.width > 0.0 && g.height > 0.0);
    }

    #[test]
    fn test_spawn_respects_phase_and_timer() {
        let mut state = GameState::new(7, Viewport::default());
        assert_eq!(spawn_gift(&mut state), Err(SpawnBlocked::NotPlaying));

        let mut state = playing_state();
        state.time_left = 0;
        assert_eq!(spawn_gift(&mut state), Err(SpawnBlocked::TimeUp));
        assert!(state.gifts.is_empty());
    }

    #[test]
    fn test_spawn_cap() {
        let mut state = playing_state();
        for _ in 0..MAX_GIFTS_PER_SESSION {
            assert!(spawn_gift(&mut state).is_ok());
        }
        assert_eq!(spawn_gift(&mut state), Err(SpawnBlocked::CapReached));
        assert_eq!(state.gifts_spawned, MAX_GIFTS_PER_SESSION);
        assert_eq!(state.gifts.len(), MAX_GIFTS_PER_SESSION as usize);
        let exhausted = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::SpawnerExhausted)
            .count();
        assert_eq!(exhausted, 1);

        // Extending the timer does not lift the cap
        state.time_left = 30;
        assert_eq!(spawn_gift(&mut state), Err(SpawnBlocked::CapReached));
    }

    #[test]
    fn test_opening_gift_is_not_counted() {
        let mut state = playing_state();
        let id = place_opening_gift(&mut state);
        assert_eq!(state.gifts.len(), 1);
        assert_eq!(state.gifts[0].id, id);
        assert_eq!(state.gifts[0].pos.y, GIFT_SPAWN_Y);
        assert_eq!(state.gifts_spawned, 0);
        assert!(state.events.is_empty());
    }
}
