use serde::{Deserialize, Serialize};
use simsync_common::{BodyId, NodeId};

use crate::CatchUpPolicy;

/// Errors detected while setting up the loop, before ticking begins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("fixed step must be a positive finite number of seconds, got {0}")]
    InvalidFixedStep(f64),
    #[error("max steps per tick must be at least 1")]
    InvalidMaxSteps,
    #[error("physics body {0:?} does not exist")]
    UnknownBody(BodyId),
    #[error("render node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("physics body {0:?} already drives a render node")]
    BodyAlreadyPaired(BodyId),
    #[error("render node {0:?} is already driven by a physics body")]
    NodeAlreadyPaired(NodeId),
}

/// Timing configuration for the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Physics step size in seconds.
    pub fixed_step: f64,
    /// Most physics steps a single tick may run. `None` catches up on every
    /// owed step no matter how long the loop stalled.
    pub max_steps_per_tick: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_steps_per_tick: Some(5),
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return Err(ConfigurationError::InvalidFixedStep(self.fixed_step));
        }
        if self.max_steps_per_tick == Some(0) {
            return Err(ConfigurationError::InvalidMaxSteps);
        }
        Ok(())
    }

    pub fn catch_up_policy(&self) -> CatchUpPolicy {
        match self.max_steps_per_tick {
            Some(max_steps) => CatchUpPolicy::Clamp { max_steps },
            None => CatchUpPolicy::Unbounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_config_defaults() {
        let config = LoopConfig::default();
        assert_eq!(config.fixed_step, 1.0 / 60.0);
        assert_eq!(config.max_steps_per_tick, Some(5));
        assert!(config.validate().is_ok());
        assert_eq!(config.catch_up_policy(), CatchUpPolicy::Clamp { max_steps: 5 });
    }

    #[test]
    fn rejects_bad_fixed_step() {
        for step in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let config = LoopConfig {
                fixed_step: step,
                ..LoopConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigurationError::InvalidFixedStep(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_max_steps() {
        let config = LoopConfig {
            max_steps_per_tick: Some(0),
            ..LoopConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidMaxSteps));
    }

    #[test]
    fn unbounded_when_no_maximum() {
        let config = LoopConfig {
            max_steps_per_tick: None,
            ..LoopConfig::default()
        };
        assert_eq!(config.catch_up_policy(), CatchUpPolicy::Unbounded);
    }
}
