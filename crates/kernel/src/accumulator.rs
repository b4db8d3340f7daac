//! Wall-clock to fixed-step conversion.
//!
//! Frames arrive at whatever rate the host manages; physics must advance in
//! constant steps. The accumulator carries the unsimulated remainder between
//! frames so total simulated time tracks wall time without drift.
//!
//! # Catch-up policy
//! After a long stall (suspended process, debugger, slow frame) the owed step
//! count can be large. [`CatchUpPolicy::Clamp`] caps the steps of one tick and
//! throws the rest of the owed time away: simulated time falls behind wall
//! time, but the loop never spirals into ever longer catch-up frames.
//! [`CatchUpPolicy::Unbounded`] always pays every owed step.

use crate::{ConfigurationError, LoopConfig};

/// What to do when a tick owes more steps than is reasonable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpPolicy {
    /// Run every owed step.
    Unbounded,
    /// Run at most `max_steps` and discard the remaining owed time.
    Clamp { max_steps: u32 },
}

/// A timestamp earlier than the previous frame's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockRegression {
    pub previous: f64,
    pub now: f64,
}

/// Result of one [`TimeAccumulator::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// Number of physics steps to run now.
    pub steps: u32,
    /// Size of each step in seconds.
    pub fixed_step: f64,
    /// Set when the clock went backwards; the frame was treated as zero-length.
    pub clock_regression: Option<ClockRegression>,
    /// Seconds of owed simulation dropped by the catch-up clamp.
    pub discarded: f64,
}

impl StepPlan {
    pub fn simulated_time(&self) -> f64 {
        f64::from(self.steps) * self.fixed_step
    }
}

/// Converts frame timestamps into whole fixed-size physics steps.
#[derive(Debug, Clone)]
pub struct TimeAccumulator {
    fixed_step: f64,
    policy: CatchUpPolicy,
    last_frame_time: Option<f64>,
    leftover: f64,
}

impl TimeAccumulator {
    pub fn new(fixed_step: f64, policy: CatchUpPolicy) -> Result<Self, ConfigurationError> {
        if !fixed_step.is_finite() || fixed_step <= 0.0 {
            return Err(ConfigurationError::InvalidFixedStep(fixed_step));
        }
        if policy == (CatchUpPolicy::Clamp { max_steps: 0 }) {
            return Err(ConfigurationError::InvalidMaxSteps);
        }
        Ok(Self {
            fixed_step,
            policy,
            last_frame_time: None,
            leftover: 0.0,
        })
    }

    pub fn from_config(config: &LoopConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.fixed_step, config.catch_up_policy())
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn policy(&self) -> CatchUpPolicy {
        self.policy
    }

    pub fn last_frame_time(&self) -> Option<f64> {
        self.last_frame_time
    }

    /// Unsimulated time carried to the next frame; always in `[0, fixed_step)`.
    pub fn leftover(&self) -> f64 {
        self.leftover
    }

    /// Forget all timing history; the next advance behaves like the first.
    pub fn reset(&mut self) {
        self.last_frame_time = None;
        self.leftover = 0.0;
    }

    /// Account for a frame at `now` (seconds) and report how many fixed steps to run.
    ///
    /// The first frame always runs exactly one step, whatever `now` is, so a
    /// large initial timestamp does not trigger a catch-up burst. A non-finite
    /// first timestamp still steps once but is not kept as the reference.
    ///
    /// A frame earlier than the previous one, or with a non-finite timestamp,
    /// counts as zero-length. A finite earlier timestamp becomes the new
    /// reference, so a clock that jumps back resumes stepping on the next frame.
    pub fn advance(&mut self, now: f64) -> StepPlan {
        let Some(previous) = self.last_frame_time else {
            if now.is_finite() {
                self.last_frame_time = Some(now);
            } else {
                tracing::warn!(now, "non-finite first frame timestamp; no reference recorded");
            }
            return StepPlan {
                steps: 1,
                fixed_step: self.fixed_step,
                clock_regression: None,
                discarded: 0.0,
            };
        };

        let mut dt = now - previous;
        let mut clock_regression = None;
        if !now.is_finite() || dt < 0.0 {
            tracing::warn!(previous, now, "frame clock went backwards; treating frame as zero-length");
            clock_regression = Some(ClockRegression { previous, now });
            dt = 0.0;
        }
        if now.is_finite() {
            self.last_frame_time = Some(now);
        }

        self.leftover += dt;
        let mut owed = (self.leftover / self.fixed_step).floor();
        self.leftover -= owed * self.fixed_step;
        // the division can round either way right at a step boundary
        if self.leftover >= self.fixed_step {
            owed += 1.0;
            self.leftover -= self.fixed_step;
        }
        if self.leftover < 0.0 {
            self.leftover = 0.0;
        }
        let mut steps = owed as u32;

        let mut discarded = 0.0;
        if let CatchUpPolicy::Clamp { max_steps } = self.policy {
            if owed > f64::from(max_steps) {
                discarded = (owed - f64::from(max_steps)) * self.fixed_step + self.leftover;
                tracing::debug!(owed, max_steps, discarded, "catch-up clamped");
                steps = max_steps;
                self.leftover = 0.0;
            }
        }

        StepPlan {
            steps,
            fixed_step: self.fixed_step,
            clock_regression,
            discarded,
        }
    }
}
