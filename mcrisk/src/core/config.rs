use serde::{Deserialize, Serialize};

use crate::{
    core::request::SimulationRequest,
    math::randomnumbers::NormalMethod,
    utils::errors::{Result, SimulationError},
};

/// Largest number of paths accepted per request by default.
pub const DEFAULT_MAX_SIMULATIONS: usize = 5_000;

/// Largest number of stored prices (`paths * (days + 1)`) per request by default.
pub const DEFAULT_MAX_TOTAL_STEPS: u64 = 5_000_000;

/// Default number of paths returned to the caller for plotting.
pub const DEFAULT_SAMPLE_CAP: usize = 100;

/// Engine configuration.
///
/// Every field has a default, so a partial JSON document is enough:
/// ```
/// use mcrisk::prelude::*;
///
/// let config = EngineConfig::from_json(r#"{ "seed": 7, "sample_cap": 20 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.sample_cap, 20);
/// assert_eq!(config.max_simulations, DEFAULT_MAX_SIMULATIONS);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run seed. `None` draws a fresh seed for every run.
    pub seed: Option<u64>,
    pub max_simulations: usize,
    pub max_total_steps: u64,
    pub sample_cap: usize,
    /// Size of a dedicated worker pool. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    pub normal_method: NormalMethod,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_simulations: DEFAULT_MAX_SIMULATIONS,
            max_total_steps: DEFAULT_MAX_TOTAL_STEPS,
            sample_cap: DEFAULT_SAMPLE_CAP,
            num_threads: None,
            normal_method: NormalMethod::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_simulations(mut self, max_simulations: usize) -> Self {
        self.max_simulations = max_simulations;
        self
    }

    pub fn with_max_total_steps(mut self, max_total_steps: u64) -> Self {
        self.max_total_steps = max_total_steps;
        self
    }

    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_normal_method(mut self, normal_method: NormalMethod) -> Self {
        self.normal_method = normal_method;
        self
    }

    /// Rejects requests larger than this deployment allows.
    pub fn check_limits(&self, request: &SimulationRequest) -> Result<()> {
        if request.num_simulations() > self.max_simulations {
            return Err(SimulationError::ResourceLimitExceeded {
                message: "num_simulations is above the configured maximum".to_string(),
                requested: request.num_simulations() as u64,
                limit: self.max_simulations as u64,
            });
        }
        if request.total_steps() > self.max_total_steps {
            return Err(SimulationError::ResourceLimitExceeded {
                message: "num_simulations * (num_days + 1) is above the configured maximum"
                    .to_string(),
                requested: request.total_steps(),
                limit: self.max_total_steps,
            });
        }
        Ok(())
    }
}
