//! Session controller
//!
//! Owns the game state, its periodic tasks, the held inputs and the audio
//! service. The platform layer forwards raw input and animation-frame
//! timestamps; everything time-based flows through [`GameSession::advance`].
//! Every task is cancelled on game over and on teardown, so a finished or
//! abandoned session never keeps firing.

use crate::audio::{AudioService, AudioSink, SoundEffect};
use crate::consts::*;
use crate::input::{InputEvent, InputSource, IntentCollector};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::sim::{
    GameEvent, GameState, SessionPhase, SessionSummary, SpawnBlocked, TickInput, Viewport, fire,
    move_avatar, place_opening_gift, spawn_gift, step,
};

/// Periodic jobs of a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    Countdown,
    Spawn,
    InputPoll,
}

/// Whether the caller should keep requesting frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Stopped,
}

pub struct GameSession<S> {
    state: GameState,
    scheduler: Scheduler<SessionTask>,
    spawn_task: Option<TaskHandle>,
    intents: IntentCollector,
    audio: AudioService<S>,
    pending: TickInput,
    last_frame_ms: Option<f64>,
    torn_down: bool,
}

impl<S: AudioSink> GameSession<S> {
    pub fn new(seed: u64, viewport: Viewport, audio: AudioService<S>) -> Self {
        Self {
            state: GameState::new(seed, viewport),
            scheduler: Scheduler::new(),
            spawn_task: None,
            intents: IntentCollector::new(),
            audio,
            pending: TickInput::default(),
            last_frame_ms: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }

    pub fn is_running(&self) -> bool {
        !self.torn_down && self.state.phase == SessionPhase::Playing
    }

    /// Start (or restart) a session at `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.scheduler.cancel_all();
        self.intents.reset();
        self.pending = TickInput::default();
        self.torn_down = false;
        self.state.start();
        place_opening_gift(&mut self.state);

        self.scheduler
            .register(SessionTask::Countdown, COUNTDOWN_INTERVAL_MS, now_ms);
        self.spawn_task = Some(
            self.scheduler
                .register(SessionTask::Spawn, SPAWN_INTERVAL_MS, now_ms),
        );
        self.scheduler
            .register(SessionTask::InputPoll, INPUT_POLL_MS, now_ms);

        self.last_frame_ms = Some(now_ms);
        self.audio.resume();
    }

    /// Forward one input event from the keyboard or touch controls
    pub fn handle_input(&mut self, event: InputEvent, source: InputSource) {
        let fire_requested = self.intents.handle(event, source);
        if fire_requested && self.is_running() {
            fire(&mut self.state);
            self.dispatch_events();
        }
    }

    /// Queue a fire for the next frame (headless drivers)
    pub fn queue_fire(&mut self) {
        self.pending.fire += 1;
    }

    /// Drop all held directions (focus lost)
    pub fn release_inputs(&mut self) {
        self.intents.reset();
    }

    /// Run due tasks and one simulation step
    pub fn advance(&mut self, now_ms: f64) -> FrameStatus {
        if !self.is_running() {
            return FrameStatus::Stopped;
        }

        let last = self.last_frame_ms.unwrap_or(now_ms);
        let dt_ms = (now_ms - last).clamp(0.0, MAX_FRAME_DT_MS);
        self.last_frame_ms = Some(now_ms);

        for task in self.scheduler.advance(now_ms) {
            if self.state.phase != SessionPhase::Playing {
                break;
            }
            self.run_task(task);
        }

        if self.state.phase == SessionPhase::Playing {
            let input = std::mem::take(&mut self.pending);
            step(&mut self.state, &input, dt_ms);
        }
        self.dispatch_events();

        if self.is_running() {
            FrameStatus::Running
        } else {
            FrameStatus::Stopped
        }
    }

    fn run_task(&mut self, task: SessionTask) {
        match task {
            SessionTask::Countdown => {
                self.state.tick_countdown();
            }
            SessionTask::Spawn => match spawn_gift(&mut self.state) {
                Ok(_) => {}
                Err(SpawnBlocked::TimeUp | SpawnBlocked::CapReached) => self.cancel_spawner(),
                Err(SpawnBlocked::NotPlaying) => {}
            },
            SessionTask::InputPoll => {
                let intent = self.intents.intent();
                let scale = self.intents.speed_scale();
                move_avatar(&mut self.state, intent, scale);
            }
        }
    }

    fn cancel_spawner(&mut self) {
        if let Some(handle) = self.spawn_task.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Route simulation events to audio and task bookkeeping
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Fired => self.audio.play(SoundEffect::Shoot),
                GameEvent::Hit { .. } => self.audio.play(SoundEffect::Hit),
                GameEvent::ComboMilestone { combo } => {
                    log::debug!("Combo x{}", combo);
                    self.audio.play(SoundEffect::Combo);
                }
                GameEvent::SpawnerExhausted => self.cancel_spawner(),
                GameEvent::GameOver { .. } => {
                    self.scheduler.cancel_all();
                    self.spawn_task = None;
                    self.intents.reset();
                    self.audio.play(SoundEffect::GameOver);
                }
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(Viewport::new(width, height));
    }

    /// Stop everything; the session stays readable but never advances again
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel_all();
        self.spawn_task = None;
        self.intents.reset();
        self.torn_down = true;
        log::info!("Session torn down");
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.audio.toggle_mute()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    pub fn audio(&self) -> &AudioService<S> {
        &self.audio
    }

    /// Number of live periodic tasks
    pub fn active_tasks(&self) -> usize {
        self.scheduler.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioConfig, RecordingSink};
    use crate::input::Direction;
    use crate::sim::{FallingGift, GiftColor, GiftState, Projectile};
    use glam::Vec2;

    fn session() -> GameSession<RecordingSink> {
        let audio = AudioService::new(RecordingSink::default(), AudioConfig::default());
        GameSession::new(99, Viewport::new(800.0, 600.0), audio)
    }

    fn run_until(s: &mut GameSession<RecordingSink>, from: f64, to: f64, frame: f64) -> f64 {
        let mut t = from;
        while t < to {
            t += frame;
            s.advance(t);
        }
        t
    }

    #[test]
    fn test_not_started_does_not_advance() {
        let mut s = session();
        assert_eq!(s.advance(1000.0), FrameStatus::Stopped);
        assert_eq!(s.state().time_left, SESSION_SECONDS);
        assert_eq!(s.active_tasks(), 0);
    }

    #[test]
    fn test_start_registers_tasks() {
        let mut s = session();
        s.start(0.0);
        assert_eq!(s.active_tasks(), 3);
        assert_eq!(s.state().phase, SessionPhase::Playing);
        // One gift is already falling, outside the spawn count
        assert_eq!(s.state().gifts.len(), 1);
        assert_eq!(s.state().gifts_spawned, 0);
    }

    #[test]
    fn test_holding_right_moves_and_clamps() {
        let mut s = session();
        s.start(0.0);
        assert_eq!(s.state().avatar.pos.x, 400.0);

        s.handle_input(InputEvent::MoveStart(Direction::Right), InputSource::Keyboard);
        run_until(&mut s, 0.0, 160.0, 16.0);
        assert_eq!(s.state().avatar.pos.x, 520.0);

        run_until(&mut s, 160.0, 500.0, 16.0);
        assert_eq!(s.state().avatar.pos.x, 740.0);

        s.handle_input(InputEvent::MoveStop(Direction::Right), InputSource::Keyboard);
        run_until(&mut s, 512.0, 544.0, 16.0);
        assert!(!s.state().avatar.is_moving);
        assert_eq!(s.state().avatar.pos.x, 740.0);
    }

    #[test]
    fn test_touch_release_keeps_key_hold() {
        let mut s = session();
        s.start(0.0);
        s.handle_input(InputEvent::MoveStart(Direction::Right), InputSource::Keyboard);
        s.handle_input(InputEvent::MoveStart(Direction::Right), InputSource::Touch);
        s.handle_input(InputEvent::MoveStop(Direction::Right), InputSource::Touch);

        run_until(&mut s, 0.0, 160.0, 16.0);
        assert_eq!(s.state().avatar.pos.x, 520.0);
        assert!(s.state().avatar.is_moving);
    }

    #[test]
    fn test_fire_plays_shoot_cue() {
        let mut s = session();
        s.handle_input(InputEvent::Fire, InputSource::Keyboard);
        assert!(s.state().projectiles.is_empty(), "no firing before start");

        s.start(0.0);
        s.handle_input(InputEvent::Fire, InputSource::Touch);
        assert_eq!(s.state().projectiles.len(), 1);
        assert_eq!(s.audio().sink().effects(), vec![SoundEffect::Shoot]);
    }

    #[test]
    fn test_queued_fire_lands_on_next_frame() {
        let mut s = session();
        s.start(0.0);
        s.queue_fire();
        s.queue_fire();
        assert!(s.state().projectiles.is_empty());

        s.advance(16.0);
        assert_eq!(s.state().projectiles.len(), 2);
        assert_eq!(
            s.audio().sink().effects(),
            vec![SoundEffect::Shoot, SoundEffect::Shoot]
        );

        // Consumed once
        s.advance(32.0);
        assert_eq!(s.state().projectiles.len(), 2);
    }

    #[test]
    fn test_muted_session_still_simulates() {
        let mut s = session();
        s.start(0.0);
        assert!(s.toggle_mute());
        s.handle_input(InputEvent::Fire, InputSource::Keyboard);
        assert_eq!(s.state().projectiles.len(), 1);
        assert!(s.audio().sink().played.is_empty());
    }

    #[test]
    fn test_spawns_on_cadence() {
        let mut s = session();
        s.start(0.0);
        run_until(&mut s, 0.0, 8000.0, 100.0);
        assert_eq!(s.state().gifts_spawned, 10);
    }

    #[test]
    fn test_hit_and_combo_cues() {
        let mut s = session();
        s.start(0.0);
        for i in 0..3 {
            let x = 100.0 + i as f32 * 100.0;
            let id = s.state.next_entity_id();
            s.state.gifts.push(FallingGift {
                id,
                pos: Vec2::new(x, 100.0),
                width: 40.0,
                height: 40.0,
                speed: 2.0,
                health: 1,
                points: 1,
                color: GiftColor::Green,
                state: GiftState::Falling,
            });
            let pid = s.state.next_entity_id();
            s.state
                .projectiles
                .push(Projectile::new(pid, Vec2::new(x + 20.0, 130.0)));
            s.advance(16.0 * (i + 1) as f64);
            s.state.projectiles.clear();
        }
        assert_eq!(s.state().score, 4);
        let effects = s.audio().sink().effects();
        assert_eq!(
            effects,
            vec![SoundEffect::Hit, SoundEffect::Hit, SoundEffect::Hit, SoundEffect::Combo]
        );
    }

    #[test]
    fn test_session_ends_and_cancels_everything() {
        let mut s = session();
        s.start(0.0);
        let t = run_until(&mut s, 0.0, 59_900.0, 100.0);
        assert_eq!(s.state().phase, SessionPhase::Playing);
        assert_eq!(s.state().time_left, 1);

        assert_eq!(s.advance(t + 100.0), FrameStatus::Stopped);
        assert_eq!(s.state().phase, SessionPhase::Over);
        assert_eq!(s.summary().final_score, Some(s.state().score));
        assert_eq!(s.active_tasks(), 0);
        assert_eq!(
            s.audio()
                .sink()
                .effects()
                .iter()
                .filter(|e| **e == SoundEffect::GameOver)
                .count(),
            1
        );

        // Nothing moves after the end
        let spawned = s.state().gifts_spawned;
        assert_eq!(s.advance(t + 5000.0), FrameStatus::Stopped);
        assert_eq!(s.state().gifts_spawned, spawned);
        assert_eq!(s.state().time_left, 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut s = session();
        s.start(0.0);
        run_until(&mut s, 0.0, 60_000.0, 100.0);
        assert_eq!(s.state().phase, SessionPhase::Over);

        s.start(70_000.0);
        assert_eq!(s.state().phase, SessionPhase::Playing);
        assert_eq!(s.state().score, 0);
        assert_eq!(s.state().time_left, SESSION_SECONDS);
        assert_eq!(s.state().gifts_spawned, 0);
        assert_eq!(s.active_tasks(), 3);
        assert_eq!(s.advance(70_016.0), FrameStatus::Running);
    }

    #[test]
    fn test_spawn_cap_cancels_spawner() {
        let mut s = session();
        s.start(0.0);
        s.state.gifts_spawned = MAX_GIFTS_PER_SESSION - 1;
        run_until(&mut s, 0.0, 800.0, 100.0);
        assert_eq!(s.state().gifts_spawned, MAX_GIFTS_PER_SESSION);
        assert_eq!(s.active_tasks(), 2);

        run_until(&mut s, 800.0, 5000.0, 100.0);
        assert_eq!(s.state().gifts_spawned, MAX_GIFTS_PER_SESSION);
        assert_eq!(s.state().phase, SessionPhase::Playing);
    }

    #[test]
    fn test_teardown_stops_session() {
        let mut s = session();
        s.start(0.0);
        s.teardown();
        assert_eq!(s.active_tasks(), 0);
        assert_eq!(s.advance(5000.0), FrameStatus::Stopped);
        assert_eq!(s.state().time_left, SESSION_SECONDS);
    }

    #[test]
    fn test_resize_keeps_avatar_on_screen() {
        let mut s = session();
        s.start(0.0);
        s.resize(300.0, 400.0);
        assert_eq!(s.state().avatar.pos.x, 240.0);
        assert_eq!(s.state().avatar.pos.y, 320.0);
    }
}
