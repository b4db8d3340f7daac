use std::time::Duration;

use simsync_kernel::MonotonicClock;

/// Supplies one timestamp per frame.
///
/// Real-time pacing sleeps until each frame is due and reads the monotonic
/// clock. Synthetic pacing never sleeps and returns `frame * interval`, so a
/// headless run is reproducible.
#[derive(Debug)]
pub enum FramePacer {
    Realtime {
        clock: MonotonicClock,
        interval: f64,
        frame: u64,
    },
    Synthetic {
        interval: f64,
        frame: u64,
    },
}

impl FramePacer {
    pub fn realtime(interval: f64) -> Self {
        Self::Realtime {
            clock: MonotonicClock::new(),
            interval,
            frame: 0,
        }
    }

    pub fn synthetic(interval: f64) -> Self {
        Self::Synthetic { interval, frame: 0 }
    }

    /// Timestamp, in seconds, for the next frame.
    pub fn next_frame(&mut self) -> f64 {
        match self {
            Self::Realtime {
                clock,
                interval,
                frame,
            } => {
                let due = *frame as f64 * *interval;
                *frame += 1;
                let now = clock.now_seconds();
                if due > now {
                    std::thread::sleep(Duration::from_secs_f64(due - now));
                }
                clock.now_seconds()
            }
            Self::Synthetic { interval, frame } => {
                let now = *frame as f64 * *interval;
                *frame += 1;
                now
            }
        }
    }
}
