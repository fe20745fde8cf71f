//! Game state and core simulation types
//!
//! Everything the update engine mutates and the renderer reads lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    /// Waiting on the start screen
    #[default]
    NotStarted,
    /// Countdown running, gifts falling
    Playing,
    /// Timer ran out
    Over,
}

/// Facing direction of the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Drawable area in pixels (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Sizes are floored at one pixel so nothing downstream divides by zero
    pub fn new(width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// The player-controlled character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels per input poll
    pub speed: f32,
    pub is_moving: bool,
    pub facing: Facing,
}

impl Avatar {
    pub fn new(viewport: Viewport) -> Self {
        let mut avatar = Self {
            pos: Vec2::ZERO,
            width: AVATAR_WIDTH,
            height: AVATAR_HEIGHT,
            speed: AVATAR_SPEED,
            is_moving: false,
            facing: Facing::Right,
        };
        avatar.recenter(viewport);
        avatar
    }

    /// Rightmost allowed x for this viewport
    pub fn max_x(&self, viewport: Viewport) -> f32 {
        (viewport.width - self.width).max(0.0)
    }

    /// Place at the horizontal middle, anchored above the ground
    pub fn recenter(&mut self, viewport: Viewport) {
        self.pos.x = (viewport.width / 2.0).min(self.max_x(viewport));
        self.anchor(viewport);
    }

    /// Recompute the vertical anchor and re-clamp x after a resize
    pub fn anchor(&mut self, viewport: Viewport) {
        self.pos.y = viewport.height - AVATAR_GROUND_OFFSET;
        self.pos.x = self.pos.x.clamp(0.0, self.max_x(viewport));
    }

    /// Where projectiles leave from
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.width / 2.0, self.pos.y)
    }
}

/// Trail point for projectile rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// A player-fired shot travelling upward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per frame, subtracted from y
    pub speed: f32,
    /// Most recent positions, oldest first
    pub trail: Vec<TrailPoint>,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            speed: PROJECTILE_SPEED,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Record current position to trail, dropping the oldest past the cap
    pub fn record_trail(&mut self) {
        self.trail.push(TrailPoint { pos: self.pos });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

/// Gift box colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GiftColor {
    Red,
    Green,
    Blue,
    Gold,
}

impl GiftColor {
    pub const ALL: [GiftColor; 4] = [
        GiftColor::Red,
        GiftColor::Green,
        GiftColor::Blue,
        GiftColor::Gold,
    ];

    /// sRGB bytes
    pub fn rgb(self) -> [u8; 3] {
        match self {
            GiftColor::Red => [0xFF, 0x00, 0x00],
            GiftColor::Green => [0x00, 0xFF, 0x00],
            GiftColor::Blue => [0x00, 0x00, 0xFF],
            GiftColor::Gold => [0xFF, 0xD7, 0x00],
        }
    }
}

/// Gift state - falling or blowing up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GiftState {
    /// Active target
    Falling,
    /// Destroyed; plays the explosion and never collides again
    Exploding { timer_ms: f64 },
}

/// A descending target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingGift {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels per frame
    pub speed: f32,
    pub health: u8,
    /// Base point value
    pub points: u32,
    pub color: GiftColor,
    pub state: GiftState,
}

impl FallingGift {
    /// True once the gift is mid-explosion
    pub fn is_hit(&self) -> bool {
        matches!(self.state, GiftState::Exploding { .. })
    }

    /// Explosion progress in 0..=1 (0 while falling)
    pub fn explosion_progress(&self) -> f32 {
        match self.state {
            GiftState::Falling => 0.0,
            GiftState::Exploding { timer_ms } => {
                (timer_ms / EXPLOSION_DURATION_MS).clamp(0.0, 1.0) as f32
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Floating "+N" label at a hit location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    /// Base points of the gift (combo bonus is not shown)
    pub value: u32,
    /// Session clock at creation
    pub created_ms: f64,
}

impl ScorePopup {
    /// Age as a fraction of the popup lifetime
    pub fn age(&self, now_ms: f64) -> f32 {
        ((now_ms - self.created_ms) / POPUP_LIFETIME_MS).clamp(0.0, 1.0) as f32
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_ms >= POPUP_LIFETIME_MS
    }
}

/// Streak of hits made within the combo window of each other
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComboState {
    pub combo: u32,
    /// Session clock of the last successful hit
    pub last_hit_ms: Option<f64>,
}

impl ComboState {
    /// Combo after a hit at `now_ms`: extends inside the window, else restarts at 1
    pub fn register_hit(&self, now_ms: f64) -> ComboState {
        let within_window = self
            .last_hit_ms
            .is_some_and(|last| now_ms - last < COMBO_WINDOW_MS);
        ComboState {
            combo: if within_window { self.combo + 1 } else { 1 },
            last_hit_ms: Some(now_ms),
        }
    }

    /// Bonus points for the current streak
    pub fn bonus(&self) -> u32 {
        self.combo / COMBO_BONUS_EVERY
    }

    /// Whether the streak is worth showing
    pub fn is_active(&self, now_ms: f64) -> bool {
        self.combo > 1
            && self
                .last_hit_ms
                .is_some_and(|last| now_ms - last < COMBO_WINDOW_MS)
    }
}

/// Things the caller may want to react to (audio, HUD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A projectile left the avatar
    Fired,
    /// A gift took damage
    Hit {
        gift_id: u32,
        points: u32,
        combo: u32,
        destroyed: bool,
    },
    /// The combo just reached a multiple of the bonus step
    ComboMilestone { combo: u32 },
    /// The spawner will not produce any more gifts this session
    SpawnerExhausted,
    /// Timer ran out
    GameOver { final_score: u64 },
}

/// What the HUD shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    pub phase: SessionPhase,
    pub score: u64,
    pub time_left: u32,
    pub combo: u32,
    pub combo_active: bool,
    pub final_score: Option<u64>,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: SessionPhase,
    pub viewport: Viewport,
    pub score: u64,
    /// Seconds remaining
    pub time_left: u32,
    /// Gifts spawned this session
    pub gifts_spawned: u32,
    /// Session clock, advanced by each frame
    pub clock_ms: f64,
    pub combo: ComboState,
    pub avatar: Avatar,
    pub projectiles: Vec<Projectile>,
    pub gifts: Vec<FallingGift>,
    pub popups: Vec<ScorePopup>,
    /// Pending events for the caller, drained once per frame
    pub events: Vec<GameEvent>,
    /// Spawner randomness
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a session on the start screen
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            viewport,
            score: 0,
            time_left: SESSION_SECONDS,
            gifts_spawned: 0,
            clock_ms: 0.0,
            combo: ComboState::default(),
            avatar: Avatar::new(viewport),
            projectiles: Vec::new(),
            gifts: Vec::new(),
            popups: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            phase: self.phase,
            score: self.score,
            time_left: self.time_left,
            combo: self.combo.combo,
            combo_active: self.combo.is_active(self.clock_ms),
            final_score: (self.phase == SessionPhase::Over).then_some(self.score),
        }
    }
}
