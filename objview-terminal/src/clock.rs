/// Frame pacing and FPS measurement for the render loop
use std::time::{Duration, Instant};

pub struct FrameClock {
    target: Option<Duration>,
    frame_start: Instant,
    window_start: Instant,
    window_frames: u32,
    frames: u64,
    fps: f32,
}

impl FrameClock {
    /// `target_fps == 0` leaves the loop uncapped
    pub fn new(target_fps: u32) -> Self {
        let now = Instant::now();
        Self {
            target: (target_fps > 0).then(|| Duration::from_secs(1) / target_fps),
            frame_start: now,
            window_start: now,
            window_frames: 0,
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn target(&self) -> Option<Duration> {
        self.target
    }

    /// Total frames completed
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the last full second
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Finish a frame: wait out the rest of the frame budget, update the
    /// FPS counter and return the total number of frames.
    pub fn end_frame(&mut self) -> u64 {
        if let Some(wait) = self.remaining(self.frame_start.elapsed()) {
            std::thread::sleep(wait);
        }

        self.frames += 1;
        self.window_frames += 1;

        let now = Instant::now();
        let window = now - self.window_start;
        if window >= Duration::from_secs(1) {
            self.fps = self.window_frames as f32 / window.as_secs_f32();
            self.window_frames = 0;
            self.window_start = now;
        }

        self.frames
    }

    /// Time left in the frame budget after `elapsed` of work
    fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.target
            .and_then(|target| target.checked_sub(elapsed))
            .filter(|wait| !wait.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncapped_never_waits() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.target(), None);
        assert_eq!(clock.remaining(Duration::ZERO), None);
    }

    #[test]
    fn test_capped_waits_out_budget() {
        let clock = FrameClock::new(50);
        assert_eq!(clock.target(), Some(Duration::from_millis(20)));
        assert_eq!(
            clock.remaining(Duration::from_millis(5)),
            Some(Duration::from_millis(15))
        );
        assert_eq!(clock.remaining(Duration::from_millis(30)), None);
    }

    #[test]
    fn test_frames_counted() {
        let mut clock = FrameClock::new(0);
        for _ in 0..3 {
            clock.begin_frame();
            clock.end_frame();
        }
        assert_eq!(clock.frames(), 3);
    }
}
