use crate::utils::errors::{Result, SimulationError};

/// Validated simulation parameters.
///
/// Only constructible through [`SimulationRequest::new`], so any value of this
/// type already satisfies every field constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRequest {
    current_price: f64,
    volatility: f64,
    num_days: usize,
    num_simulations: usize,
}

impl SimulationRequest {
    /// Validates untrusted inputs. Integer fields are taken signed so that
    /// negative values coming off the wire are reported, not wrapped.
    pub fn new(
        current_price: f64,
        volatility: f64,
        num_days: i64,
        num_simulations: i64,
    ) -> Result<SimulationRequest> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(SimulationError::invalid(
                "current_price",
                format!("must be a finite number greater than 0, got {}", current_price),
            ));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(SimulationError::invalid(
                "volatility",
                format!("must be a finite number greater than or equal to 0, got {}", volatility),
            ));
        }
        if num_days < 1 {
            return Err(SimulationError::invalid(
                "num_days",
                format!("must be at least 1, got {}", num_days),
            ));
        }
        if num_simulations < 1 {
            return Err(SimulationError::invalid(
                "num_simulations",
                format!("must be at least 1, got {}", num_simulations),
            ));
        }
        let num_days = usize::try_from(num_days)
            .map_err(|_| SimulationError::invalid("num_days", "does not fit in memory"))?;
        let num_simulations = usize::try_from(num_simulations)
            .map_err(|_| SimulationError::invalid("num_simulations", "does not fit in memory"))?;

        Ok(SimulationRequest {
            current_price,
            volatility,
            num_days,
            num_simulations,
        })
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    /// Number of prices in every path, `num_days + 1`.
    pub fn path_len(&self) -> usize {
        self.num_days + 1
    }

    /// Total number of stored prices, `num_simulations * (num_days + 1)`,
    /// saturating at `u64::MAX`.
    pub fn total_steps(&self) -> u64 {
        (self.num_simulations as u64).saturating_mul(self.path_len() as u64)
    }
}
