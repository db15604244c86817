use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds (clamped).
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,

    /// Average frames per second over the last report window. Set on the tick
    /// that closes a window, `None` otherwise.
    pub fps: Option<f32>,
}

/// Produces `FrameTime` snapshots and a periodic FPS average.
///
/// Delta time is clamped so that stalls (debugger, minimized window) do not
/// produce pathological values.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,

    report_every: Duration,
    window_start: Instant,
    window_frames: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_report_interval(Duration::from_secs(1))
    }

    pub fn with_report_interval(report_every: Duration) -> Self {
        let now = Instant::now();
        Self {
            last: now,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            report_every,
            window_start: now,
            window_frames: 0,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        self.window_frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        let fps = if elapsed >= self.report_every {
            let fps = self.window_frames as f32 / elapsed.as_secs_f32();
            self.window_start = now;
            self.window_frames = 0;
            Some(fps)
        } else {
            None
        };

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
            fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_counts_from_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
    }

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        assert_eq!(clock.tick_at(start).dt, Duration::from_micros(100).as_secs_f32());
        let late = clock.tick_at(start + Duration::from_secs(10));
        assert_eq!(late.dt, 0.25);
    }

    #[test]
    fn fps_reported_once_per_window() {
        let mut clock = FrameClock::with_report_interval(Duration::from_secs(1));
        let start = clock.window_start;

        for i in 1..60 {
            let t = clock.tick_at(start + Duration::from_millis(i * 16));
            assert!(t.fps.is_none());
        }
        let report = clock.tick_at(start + Duration::from_secs(1));
        let fps = report.fps.expect("window closed");
        assert!((fps - 60.0).abs() < 0.01);

        assert!(clock.tick_at(start + Duration::from_millis(1010)).fps.is_none());
    }
}
