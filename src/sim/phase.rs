//! Session phase transitions
//!
//! `NotStarted -> Playing -> Over`. Starting again from `Over` is a full reset.

use super::state::{Avatar, ComboState, GameEvent, GameState, SessionPhase, Viewport};
use crate::consts::*;

impl GameState {
    /// Begin a fresh session: score, timer, spawn count and entities reset
    pub fn start(&mut self) {
        self.phase = SessionPhase::Playing;
        self.score = 0;
        self.time_left = SESSION_SECONDS;
        self.gifts_spawned = 0;
        self.clock_ms = 0.0;
        self.combo = ComboState::default();
        self.avatar = Avatar::new(self.viewport);
        self.projectiles.clear();
        self.gifts.clear();
        self.popups.clear();
        self.events.clear();
        log::info!("Session started ({}s)", SESSION_SECONDS);
    }

    /// One countdown second; returns true when this tick ended the session
    pub fn tick_countdown(&mut self) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.phase = SessionPhase::Over;
            self.events.push(GameEvent::GameOver {
                final_score: self.score,
            });
            log::info!("Session over, final score {}", self.score);
            return true;
        }
        false
    }

    /// New viewport size: avatar re-anchors, nothing else moves
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.avatar.anchor(viewport);
    }
}
