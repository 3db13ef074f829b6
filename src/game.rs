//! Frame driver
//!
//! `Game` is what a host runs once per display refresh: it measures time,
//! turns latched keys into a tick input, advances the simulation, routes the
//! resulting events to audio and persistence, and draws.

use crate::audio::AudioManager;
use crate::highscores::HighScoreStore;
use crate::platform::{Action, FrameClock, InputState, PerformanceMonitor};
use crate::renderer::{Canvas, FrameInfo, draw_frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, Mode, tick};
use crate::tuning::Tuning;

/// A running game and its collaborators
pub struct Game {
    state: GameState,
    input: InputState,
    clock: FrameClock,
    perf: PerformanceMonitor,
    audio: AudioManager,
    settings: Settings,
    scores: Box<dyn HighScoreStore>,
    /// Stored best when the current run started
    high_score: u64,
    /// This run's result has been persisted
    recorded: bool,
    idle_mode: bool,
}

impl Game {
    /// New game with default tuning and settings and silent audio
    pub fn new(seed: u64, scores: Box<dyn HighScoreStore>) -> Self {
        Self::with_parts(
            GameState::new(seed),
            Settings::default(),
            AudioManager::default(),
            scores,
        )
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, scores: Box<dyn HighScoreStore>) -> Self {
        Self::with_parts(
            GameState::with_tuning(seed, tuning),
            Settings::default(),
            AudioManager::default(),
            scores,
        )
    }

    /// Assemble a game from prepared collaborators
    pub fn with_parts(
        mut state: GameState,
        settings: Settings,
        mut audio: AudioManager,
        mut scores: Box<dyn HighScoreStore>,
    ) -> Self {
        audio.apply_settings(&settings);
        let high_score = scores.read_high_score();
        // Initialization events (entering Playing) carry no side effects
        state.events.clear();
        log::info!("Game initialized with seed {} (best {})", state.seed, high_score);

        Self {
            state,
            input: InputState::new(),
            clock: FrameClock::new(),
            perf: PerformanceMonitor::new(),
            audio,
            settings,
            scores,
            high_score,
            recorded: false,
            idle_mode: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Forward a key press; returns whether the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.input.key_up(key)
    }

    /// Host lost focus: drop held keys and pause a running game
    pub fn focus_lost(&mut self) {
        self.input.clear();
        if self.state.mode.is_playing() {
            self.state.set_mode(Mode::Paused);
            self.route_events();
        }
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.idle_mode = idle;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Unlock audio after a user gesture
    pub fn resume_audio(&mut self) {
        self.audio.resume();
    }

    /// Best stored score as of the start of this run
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn fps(&self) -> u32 {
        self.perf.fps()
    }

    /// Run one display frame at host time `now_ms`
    ///
    /// Returns the events the simulation produced this frame.
    pub fn frame(&mut self, now_ms: f64, canvas: &mut dyn Canvas) -> Vec<GameEvent> {
        let elapsed_ms = self.clock.tick(now_ms);
        self.perf.frame(now_ms);

        if self.input.take(Action::DebugToggle) {
            self.settings.show_debug = !self.settings.show_debug;
            log::info!("Debug overlay: {}", self.settings.show_debug);
        }

        let input = self.input.tick_input(self.idle_mode);
        tick(&mut self.state, &input, elapsed_ms);
        let events = self.route_events();

        let info = FrameInfo {
            high_score: self.high_score,
            fps: self.perf.fps(),
            show_debug: self.settings.show_debug,
            blink: self.settings.effective_blink(),
        };
        draw_frame(&self.state, &info, canvas);

        events
    }

    /// End the run as won
    ///
    /// Level clears never finish the game on their own; hosts that want a
    /// final level call this.
    pub fn declare_victory(&mut self) {
        match self.state.mode.current() {
            Mode::Playing | Mode::Paused => {
                self.state.set_mode(Mode::GameWon);
                self.route_events();
            }
            mode => log::debug!("Victory ignored in {:?}", mode),
        }
    }

    /// Apply side effects of pending events and hand them back
    fn route_events(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            self.audio.handle(event);
            if let GameEvent::ModeChanged { from, to } = *event {
                self.on_mode_changed(from, to);
            }
        }
        events
    }

    fn on_mode_changed(&mut self, from: Mode, to: Mode) {
        match to {
            Mode::Paused => self.audio.stop_all(),
            Mode::Playing if from == Mode::Paused => self.clock.resync(),
            Mode::Playing if from.is_finished() => {
                self.clock.resync();
                self.recorded = false;
                self.high_score = self.scores.read_high_score();
            }
            Mode::GameOver | Mode::GameWon => {
                self.audio.stop_all();
                self.record_result();
            }
            _ => {}
        }
    }

    /// Persist the finished run once
    fn record_result(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let score = self.state.session.score;
        let best = self.scores.read_high_score();
        log::info!(
            "Run over: score {}, level {}, best {}",
            score,
            self.state.session.level,
            best
        );
        if score > best {
            self.scores.write_high_score(score);
        }
    }
}
