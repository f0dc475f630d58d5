//! Monte Carlo price-path risk engine.
//!
//! Simulates zero-drift geometric Brownian motion paths from a validated
//! [`crate::core::request::SimulationRequest`], reduces them into per-day mean and
//! 5th/95th percentile bands, and reports the 95% value at risk of the
//! terminal price.
//!
//! ```
//! use mcrisk::prelude::*;
//!
//! let engine = MonteCarloEngine::new(EngineConfig::new().with_seed(42)).unwrap();
//! let result = engine.simulate(100.0, 0.2, 21, 500).unwrap();
//! assert_eq!(result.mean_path.len(), 22);
//! assert!(result.var_loss >= 0.0);
//! ```

pub mod core;
pub mod math;
pub mod models;
pub mod prelude;
pub mod risk;
pub mod time;
pub mod utils;
