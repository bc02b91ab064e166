//! Frame clock: turns animation-frame timestamps into fixed ticks

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Fixed-timestep accumulator with an FPS estimate
#[derive(Debug, Clone)]
pub struct FrameClock {
    accumulator: f32,
    last_time: Option<f64>,
    /// Ring buffer of the last 60 frame timestamps (ms)
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_time: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Number of ticks to run for a frame at `time_ms`
    ///
    /// The first frame runs exactly one tick. Long gaps (tab switches) are
    /// capped so the game never fast-forwards more than `MAX_SUBSTEPS`.
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) if time_ms >= last => ((time_ms - last) / 1000.0) as f32,
            Some(_) => 0.0,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.track_fps(time_ms);

        self.accumulator += dt.min(MAX_FRAME_DT);
        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        ticks
    }

    /// Forget timing history (after pause or restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                self.fps = (60_000.0 / elapsed).round() as u32;
            }
        }
    }
}
