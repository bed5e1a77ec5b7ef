//! Fixed-timestep frame loop.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::Engine;

/// Configuration for the frame loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
        }
    }
}

#[derive(Debug)]
pub struct TickLoop {
    frame_id: u64,
    config: TickConfig,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self { frame_id: 0, config }
    }

    #[must_use]
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Drive `engine` until it asks to stop or the frame cap is reached.
    ///
    /// Every frame advances the world by the fixed frame duration. A frame
    /// that overruns its budget is logged and the next one starts at once.
    pub fn run(&mut self, engine: &mut Engine) {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1.0));
        let dt = frame_duration.as_secs_f32();

        info!(
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            "starting frame loop"
        );

        loop {
            let start = Instant::now();

            engine.run_frame(dt);
            self.frame_id += 1;

            if engine.should_exit() {
                info!(frames = self.frame_id, "engine requested shutdown");
                break;
            }
            if self.config.max_frames > 0 && self.frame_id >= self.config.max_frames {
                info!(frames = self.frame_id, "frame loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            } else {
                warn!(
                    frame_id = self.frame_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = frame_duration.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
    }
}
