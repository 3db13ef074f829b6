//! Frame rate counter for the debug overlay

/// Counts frames per 1000 ms window
#[derive(Debug, Clone, Default)]
pub struct PerformanceMonitor {
    window_start_ms: Option<f64>,
    frames: u32,
    fps: u32,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`
    pub fn frame(&mut self, now_ms: f64) {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        if now_ms - start >= 1000.0 {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
        }
    }

    /// Frames counted in the last full window
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
