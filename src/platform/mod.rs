//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (frame clock, wall clock)
//! - Input events (key names to latched actions)
//! - Frame rate diagnostics
//! - Logger setup

pub mod input;
pub mod perf;

pub use input::{Action, InputState};
pub use perf::PerformanceMonitor;

/// Largest elapsed time fed to the simulation in one frame (ms)
///
/// Stops a backgrounded tab from making the formation jump on return.
pub const MAX_FRAME_MS: f64 = 250.0;

/// Turns host timestamps into per-frame elapsed time
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed ms since the previous call; the first call after a resync is 0
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        elapsed as f32
    }

    /// Forget the last timestamp (after a pause or restart)
    pub fn resync(&mut self) {
        self.last_ms = None;
    }
}

/// Wall-clock time as Unix ms
#[cfg(target_arch = "wasm32")]
pub fn now_epoch_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time as Unix ms
#[cfg(not(target_arch = "wasm32"))]
pub fn now_epoch_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Install the logger for this platform
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

/// Install the logger for this platform (`RUST_LOG` controls the level)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
