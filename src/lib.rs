//! Gift Shooter - a winter arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entities, collisions, scoring, spawning)
//! - `session`: Session controller wiring timers, input and audio around `sim`
//! - `scheduler`: Periodic task registry with cancellation handles
//! - `input`: Keyboard/touch events to movement and fire intents
//! - `renderer`: Scene tessellation and WebGPU pipeline
//! - `audio`: Owned sound-effect service with a mute flag

pub mod audio;
pub mod error;
pub mod input;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;

pub use audio::{AudioConfig, AudioService, AudioSink, SoundEffect};
pub use error::{AudioError, RenderError};
pub use session::{FrameStatus, GameSession};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Player avatar size (square)
    pub const AVATAR_WIDTH: f32 = 60.0;
    pub const AVATAR_HEIGHT: f32 = 60.0;
    /// Pixels moved per input poll
    pub const AVATAR_SPEED: f32 = 12.0;
    /// Avatar top edge sits this far above the viewport bottom
    pub const AVATAR_GROUND_OFFSET: f32 = 80.0;
    /// Touch controls move slightly faster than the keyboard
    pub const TOUCH_SPEED_MULTIPLIER: f32 = 1.2;

    /// Projectile speed (pixels per frame, upward)
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    /// Number of past positions kept for the trail
    pub const TRAIL_LENGTH: usize = 5;

    /// Gift box size (square)
    pub const GIFT_SIZE: f32 = 40.0;
    /// Spawn height, just above the viewport
    pub const GIFT_SPAWN_Y: f32 = -50.0;
    /// Fall speed band (pixels per frame), upper bound exclusive
    pub const GIFT_MIN_SPEED: f32 = 2.0;
    pub const GIFT_MAX_SPEED: f32 = 3.0;
    /// Chance a gift needs two hits
    pub const TOUGH_GIFT_CHANCE: f64 = 0.2;
    pub const TOUGH_GIFT_HEALTH: u8 = 2;
    /// Chance a gift is worth bonus points
    pub const BONUS_GIFT_CHANCE: f64 = 0.1;
    pub const BONUS_GIFT_POINTS: u32 = 3;
    /// Gifts are cleaned up once below viewport height + this margin
    pub const GIFT_EXIT_MARGIN: f32 = 50.0;
    /// Length of the explosion animation for a destroyed gift
    pub const EXPLOSION_DURATION_MS: f64 = 400.0;

    /// Hits closer together than this extend the combo
    pub const COMBO_WINDOW_MS: f64 = 1000.0;
    /// One bonus point per this many consecutive hits
    pub const COMBO_BONUS_EVERY: u32 = 3;

    /// Score popup lifetime and rise distance over that lifetime
    pub const POPUP_LIFETIME_MS: f64 = 1000.0;
    pub const POPUP_RISE: f32 = 50.0;

    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 60;
    /// Gifts spawned per session, at most
    pub const MAX_GIFTS_PER_SESSION: u32 = 150;

    /// Timer cadences (milliseconds)
    pub const COUNTDOWN_INTERVAL_MS: f64 = 1000.0;
    pub const SPAWN_INTERVAL_MS: f64 = 800.0;
    pub const INPUT_POLL_MS: f64 = 16.0;
    /// Maximum overdue firings per task per scheduler advance
    pub const MAX_CATCHUP_FIRINGS: u32 = 8;
    /// Longest frame delta fed to the simulation clock
    pub const MAX_FRAME_DT_MS: f64 = 250.0;

    /// Drifting clouds drawn behind the play field
    pub const CLOUD_COUNT: usize = 6;
    /// Cloud width at scale 1
    pub const CLOUD_WIDTH: f32 = 120.0;

    /// Viewport used by the headless build
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 800.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;
}
