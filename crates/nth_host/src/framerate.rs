use std::time::{Duration, Instant};

/// Counts finished frames in roughly one-second windows.
///
/// The window only closes when a frame finishes after at least [FrameRate::WINDOW] has passed,
/// so under load the window stretches and the reported value lags a bit.
pub struct FrameRate {
    /// Frames finished in the current window
    frames: u32,
    /// When the current window started.
    window_start: Instant,
    /// The frame count of the last completed window.
    last_reported: Option<u32>,
}

impl FrameRate {
    pub const WINDOW: Duration = Duration::from_millis(1000);

    /// Creates a new frame rate, starting the first window at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            last_reported: None,
        }
    }

    /// Record a finished frame.
    ///
    /// # Returns
    /// * `Some(fps)` - If this frame closed a window, with the amount of frames counted in it.
    /// * `None` - Otherwise.
    pub fn frame_finished(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;

        if now.saturating_duration_since(self.window_start) >= Self::WINDOW {
            let fps = std::mem::take(&mut self.frames);
            self.window_start = now;
            self.last_reported = Some(fps);

            Some(fps)
        } else {
            None
        }
    }

    /// Start a new window without reporting, used when the loop was idle for a while.
    pub fn reset(&mut self, now: Instant) {
        self.frames = 0;
        self.window_start = now;
    }

    /// The frame count of the most recent completed window.
    pub fn fps(&self) -> Option<u32> {
        self.last_reported
    }
}
