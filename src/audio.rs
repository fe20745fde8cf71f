//! Audio service
//!
//! Sound cues are fire-and-forget. The service owns its sink and its mute
//! flag; a failing sink is logged and ignored so playback can never stall
//! the game. On the web the sink synthesizes cues with the Web Audio API,
//! no sound files needed.

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Projectile fired
    Shoot,
    /// Gift took a hit
    Hit,
    /// Combo reached a multiple of the bonus step
    Combo,
    /// Timer ran out
    GameOver,
}

/// Something that can turn a cue into sound
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;

    /// Unlock playback after a user gesture (browsers start suspended)
    fn resume(&mut self) {}
}

/// Mute flag and volumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

/// Owned audio service, injected into the session
#[derive(Debug)]
pub struct AudioService<S> {
    sink: S,
    config: AudioConfig,
}

impl<S: AudioSink> AudioService<S> {
    pub fn new(sink: S, config: AudioConfig) -> Self {
        let mut config = config;
        config.master_volume = config.master_volume.clamp(0.0, 1.0);
        config.sfx_volume = config.sfx_volume.clamp(0.0, 1.0);
        Self { sink, config }
    }

    pub fn config(&self) -> AudioConfig {
        self.config
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
    }

    /// Flip the mute flag, returning the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.config.muted = !self.config.muted;
        log::info!("Audio {}", if self.config.muted { "muted" } else { "unmuted" });
        self.config.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.config.muted {
            0.0
        } else {
            self.config.master_volume * self.config.sfx_volume
        }
    }

    /// Play a cue; failures are logged and dropped
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(e) = self.sink.play(effect, vol) {
            log::warn!("Failed to play {:?}: {}", effect, e);
        }
    }

    pub fn resume(&mut self) {
        self.sink.resume();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Sink for native builds: accepts everything, plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub played: Vec<(SoundEffect, f32)>,
    /// Fail every call, to exercise the error path
    pub fail: bool,
}

impl RecordingSink {
    pub fn effects(&self) -> Vec<SoundEffect> {
        self.played.iter().map(|(e, _)| *e).collect()
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        if self.fail {
            return Err(AudioError::ContextUnavailable);
        }
        self.played.push((effect, volume));
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::error::AudioError;

    /// Peak gain of a cue at full volume
    const CUE_GAIN: f32 = 0.3;

    fn node_err(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Node(format!("{e:?}"))
    }

    fn schedule_err(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Schedule(format!("{e:?}"))
    }

    /// Web Audio synthesizer
    pub struct WebAudioSink {
        ctx: Option<AudioContext>,
    }

    impl Default for WebAudioSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioSink {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx }
        }

        /// Oscillator routed through a gain node to the speakers
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Result<(OscillatorNode, GainNode), AudioError> {
            let osc = ctx.create_oscillator().map_err(node_err)?;
            let gain = ctx.create_gain().map_err(node_err)?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(node_err)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(node_err)?;

            Ok((osc, gain))
        }

        /// Single decaying tone, optionally sweeping to `end_freq`
        fn tone(
            ctx: &AudioContext,
            freq: f32,
            end_freq: Option<f32>,
            osc_type: OscillatorType,
            peak: f32,
            delay: f64,
            duration: f64,
        ) -> Result<(), AudioError> {
            let (osc, gain) = Self::create_osc(ctx, freq, osc_type)?;
            let t = ctx.current_time() + delay;

            gain.gain()
                .set_value_at_time(peak, t)
                .map_err(schedule_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .map_err(schedule_err)?;
            if let Some(end) = end_freq {
                osc.frequency()
                    .set_value_at_time(freq, t)
                    .map_err(schedule_err)?;
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + duration)
                    .map_err(schedule_err)?;
            }

            osc.start_with_when(t).map_err(schedule_err)?;
            osc.stop_with_when(t + duration + 0.05)
                .map_err(schedule_err)?;
            Ok(())
        }

        /// Shoot - short upward chirp
        fn play_shoot(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            Self::tone(ctx, 500.0, Some(1200.0), OscillatorType::Triangle, vol * 0.6, 0.0, 0.08)
        }

        /// Hit - bright tap over a soft thump
        fn play_hit(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            Self::tone(ctx, 900.0, None, OscillatorType::Square, vol * 0.3, 0.0, 0.06)?;
            Self::tone(ctx, 180.0, Some(80.0), OscillatorType::Sine, vol, 0.0, 0.12)
        }

        /// Combo - rising sleigh-bell arpeggio
        fn play_combo(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            for (i, freq) in [784.0, 988.0, 1175.0, 1568.0].iter().enumerate() {
                Self::tone(ctx, *freq, None, OscillatorType::Sine, vol * 0.8, i as f64 * 0.06, 0.18)?;
            }
            Ok(())
        }

        /// Game over - sad descending
        fn play_game_over(ctx: &AudioContext, vol: f32) -> Result<(), AudioError> {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                Self::tone(ctx, *freq, None, OscillatorType::Sine, vol, i as f64 * 0.2, 0.3)?;
            }
            Ok(())
        }
    }

    impl AudioSink for WebAudioSink {
        fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            let ctx = self.ctx.as_ref().ok_or(AudioError::ContextUnavailable)?;

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let vol = volume * CUE_GAIN;
            match effect {
                SoundEffect::Shoot => Self::play_shoot(ctx, vol),
                SoundEffect::Hit => Self::play_hit(ctx, vol),
                SoundEffect::Combo => Self::play_combo(ctx, vol),
                SoundEffect::GameOver => Self::play_game_over(ctx, vol),
            }
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }
}
