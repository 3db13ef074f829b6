//! Audio playback
//!
//! The simulation only asks for cues through `GameEvent::Play`/`Stop`.
//! `AudioManager` turns those intents into backend calls, applying volume
//! and keeping track of looped cues. Backend failures never leave this module.

use std::collections::HashSet;
use std::fmt;

use crate::settings::Settings;
use crate::sim::{Cue, GameEvent};

/// Why a backend could not play a cue
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No audio device or context
    Unavailable(String),
    /// The backend refused the request (autoplay policy, node creation, ...)
    Rejected { cue: Cue, reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "audio unavailable: {why}"),
            Self::Rejected { cue, reason } => write!(f, "could not play {cue:?}: {reason}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Something that can make noise
pub trait AudioBackend {
    /// Start `cue` at `volume`; `restart` rewinds a cue that is already sounding
    fn play(&mut self, cue: Cue, volume: f32, restart: bool) -> Result<(), AudioError>;
    fn stop(&mut self, cue: Cue) -> Result<(), AudioError>;
    /// Unlock playback after a user gesture
    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Backend that plays nothing (headless runs, tests, audio disabled)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&mut self, _cue: Cue, _volume: f32, _restart: bool) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Looped cues currently sounding
    looping: HashSet<Cue>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(SilentBackend))
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            looping: HashSet::new(),
        }
    }

    /// Pick up volume and mute from the player's settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio; muting silences running loops
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_all();
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Resume the backend (required after a user gesture in browsers)
    pub fn resume(&mut self) {
        if let Err(err) = self.backend.resume() {
            log::warn!("{err}");
        }
    }

    /// Apply an event if it is an audio intent
    pub fn handle(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Play { cue, restart } => self.play(cue, restart),
            GameEvent::Stop { cue } => self.stop(cue),
            _ => {}
        }
    }

    /// Play a cue; replaying a loop that is already running does nothing
    pub fn play(&mut self, cue: Cue, restart: bool) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if cue.is_looped() && self.looping.contains(&cue) {
            return;
        }

        match self.backend.play(cue, vol, restart) {
            Ok(()) => {
                if cue.is_looped() {
                    self.looping.insert(cue);
                }
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    pub fn stop(&mut self, cue: Cue) {
        self.looping.remove(&cue);
        if let Err(err) = self.backend.stop(cue) {
            log::warn!("{err}");
        }
    }

    /// Silence every running loop
    pub fn stop_all(&mut self) {
        let running: Vec<Cue> = self.looping.drain().collect();
        for cue in running {
            if let Err(err) = self.backend.stop(cue) {
                log::warn!("{err}");
            }
        }
    }

    pub fn is_looping(&self, cue: Cue) -> bool {
        self.looping.contains(&cue)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Procedurally generated sound effects - no external files needed
#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, AudioError};
    use crate::sim::Cue;

    /// Web Audio oscillator voices
    pub struct WebAudioBackend {
        ctx: Option<AudioContext>,
        /// Running bonus hum voice
        hum: Option<(OscillatorNode, GainNode)>,
    }

    impl Default for WebAudioBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioBackend {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, hum: None }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Shoot - short falling zap
        fn play_shoot(ctx: &AudioContext, vol: f32) -> Option<()> {
            let (osc, gain) = Self::create_osc(ctx, 900.0, OscillatorType::Square)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok()?;
            osc.frequency().set_value_at_time(900.0, t).ok()?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(200.0, t + 0.12)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + 0.15).ok()
        }

        /// Explosion - boom with a high crack
        fn play_explosion(ctx: &AudioContext, vol: f32) -> Option<()> {
            let (osc, gain) = Self::create_osc(ctx, 100.0, OscillatorType::Sawtooth)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok()?;
            osc.frequency().set_value_at_time(100.0, t).ok()?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok()?;
            osc.start().ok()?;
            osc.stop_with_when(t + 0.5).ok()?;

            let (osc2, gain2) = Self::create_osc(ctx, 1500.0, OscillatorType::Square)?;
            gain2.gain().set_value_at_time(vol * 0.2, t).ok()?;
            gain2
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok()?;
            osc2.start().ok()?;
            osc2.stop_with_when(t + 0.15).ok()
        }

        /// Invader killed - crunchy stepped chirp
        fn play_invader_killed(ctx: &AudioContext, vol: f32) -> Option<()> {
            let (osc, gain) = Self::create_osc(ctx, 600.0, OscillatorType::Sawtooth)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok()?;
            osc.frequency().set_value_at_time(600.0, t).ok()?;
            osc.frequency().set_value_at_time(300.0, t + 0.04).ok()?;
            osc.frequency().set_value_at_time(450.0, t + 0.08).ok()?;
            osc.frequency().set_value_at_time(150.0, t + 0.12).ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + 0.25).ok()
        }

        /// Formation footstep - one of four descending bass notes
        fn play_march(ctx: &AudioContext, vol: f32, step: u8) -> Option<()> {
            const NOTES: [f32; 4] = [110.0, 98.0, 87.0, 82.0];
            let freq = NOTES[(step.clamp(1, 4) - 1) as usize];
            let (osc, gain) = Self::create_osc(ctx, freq, OscillatorType::Square)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + 0.1).ok()
        }

        /// Bonus hum - warbling tone that runs until stopped
        fn start_hum(ctx: &AudioContext, vol: f32) -> Option<(OscillatorNode, GainNode)> {
            let (osc, gain) = Self::create_osc(ctx, 440.0, OscillatorType::Triangle)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok()?;
            osc.frequency().set_value_at_time(440.0, t).ok()?;
            osc.frequency()
                .linear_ramp_to_value_at_time(520.0, t + 0.25)
                .ok()?;
            osc.frequency()
                .linear_ramp_to_value_at_time(440.0, t + 0.5)
                .ok()?;
            osc.start().ok()?;
            Some((osc, gain))
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn play(&mut self, cue: Cue, vol: f32, restart: bool) -> Result<(), AudioError> {
            let Some(ctx) = &self.ctx else {
                return Err(AudioError::Unavailable("no AudioContext".into()));
            };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let played = match cue {
                Cue::Shoot => Self::play_shoot(ctx, vol),
                Cue::Explosion => Self::play_explosion(ctx, vol),
                Cue::InvaderKilled => Self::play_invader_killed(ctx, vol),
                Cue::March(step) => Self::play_march(ctx, vol, step),
                Cue::BonusHum => {
                    if restart || self.hum.is_none() {
                        if let Some((osc, _)) = self.hum.take() {
                            let _ = osc.stop();
                        }
                        self.hum = Self::start_hum(ctx, vol);
                    }
                    self.hum.as_ref().map(|_| ())
                }
            };

            played.ok_or_else(|| AudioError::Rejected {
                cue,
                reason: "Web Audio node setup failed".into(),
            })
        }

        fn stop(&mut self, cue: Cue) -> Result<(), AudioError> {
            if cue == Cue::BonusHum {
                if let Some((osc, _)) = self.hum.take() {
                    osc.stop().map_err(|e| AudioError::Rejected {
                        cue,
                        reason: format!("{e:?}"),
                    })?;
                }
            }
            Ok(())
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            if let Some(ctx) = &self.ctx {
                ctx.resume()
                    .map_err(|e| AudioError::Unavailable(format!("{e:?}")))?;
            }
            Ok(())
        }
    }
}
