use rayon::prelude::*;

use crate::{
    core::request::SimulationRequest,
    math::statistics::{mean, nearest_rank, Percentile},
    models::path::{Path, PathEnsemble},
};

/// Per-day reductions over an ensemble, each of length `num_days + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatistics {
    pub mean_path: Vec<f64>,
    pub lower_path: Vec<f64>,
    pub upper_path: Vec<f64>,
}

/// Terminal-day value at risk, in price units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAtRisk {
    /// Lower-percentile terminal price.
    pub var_price: f64,
    /// `max(0, current_price - var_price)`.
    pub var_loss: f64,
}

/// Outcome of one run. Statistics come from the full ensemble; `paths`
/// only holds the sample kept for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub current_price: f64,
    pub num_days: usize,
    pub num_simulations: usize,
    pub seed: u64,
    pub mean_path: Vec<f64>,
    pub p5_path: Vec<f64>,
    pub p95_path: Vec<f64>,
    pub var_loss: f64,
    pub var_price: f64,
    pub paths: Vec<Path>,
}

/// Reduces a completed ensemble into bands and VaR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAggregator {
    lower: Percentile,
    upper: Percentile,
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self {
            lower: Percentile::P5,
            upper: Percentile::P95,
        }
    }
}

impl RiskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean and nearest-rank percentile bands, computed independently for
    /// every day in parallel.
    ///
    /// `lower <= mean <= upper` is typical, not guaranteed: a heavy right
    /// tail (large volatility over a long horizon) can lift the mean above
    /// the upper band.
    pub fn daily_statistics(&self, ensemble: &PathEnsemble) -> DailyStatistics {
        let per_day: Vec<(f64, f64, f64)> = (0..ensemble.path_len())
            .into_par_iter()
            .map(|t| {
                let mut column: Vec<f64> = ensemble.prices_at(t).collect();
                column.sort_unstable_by(f64::total_cmp);
                let lower = nearest_rank(&column, self.lower);
                let upper = nearest_rank(&column, self.upper);
                // a degenerate day is reported exactly, free of summation error
                let avg = if column[0] == column[column.len() - 1] {
                    column[0]
                } else {
                    mean(&column)
                };
                (avg, lower, upper)
            })
            .collect();

        let mut stats = DailyStatistics {
            mean_path: Vec::with_capacity(per_day.len()),
            lower_path: Vec::with_capacity(per_day.len()),
            upper_path: Vec::with_capacity(per_day.len()),
        };
        for (avg, lower, upper) in per_day {
            stats.mean_path.push(avg);
            stats.lower_path.push(lower);
            stats.upper_path.push(upper);
        }
        stats
    }

    pub fn value_at_risk(&self, current_price: f64, var_price: f64) -> ValueAtRisk {
        ValueAtRisk {
            var_price,
            var_loss: (current_price - var_price).max(0.0),
        }
    }

    /// Builds the result from the full ensemble; `sample` is passed through
    /// untouched.
    pub fn aggregate(
        &self,
        request: &SimulationRequest,
        ensemble: &PathEnsemble,
        sample: Vec<Path>,
        seed: u64,
    ) -> SimulationResult {
        assert_eq!(
            ensemble.len(),
            request.num_simulations(),
            "ensemble size does not match the request"
        );
        assert_eq!(
            ensemble.path_len(),
            request.path_len(),
            "path length does not match the request"
        );

        let stats = self.daily_statistics(ensemble);
        let terminal = stats.lower_path[ensemble.num_days()];
        let var = self.value_at_risk(request.current_price(), terminal);

        SimulationResult {
            current_price: request.current_price(),
            num_days: request.num_days(),
            num_simulations: request.num_simulations(),
            seed,
            mean_path: stats.mean_path,
            p5_path: stats.lower_path,
            p95_path: stats.upper_path,
            var_loss: var.var_loss,
            var_price: var.var_price,
            paths: sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::Result;
    use approx::assert_relative_eq;

    fn linear_ensemble(n: usize) -> PathEnsemble {
        // path i: [100, 50 + i]
        PathEnsemble::new(
            (0..n)
                .map(|i| Path::new(vec![100.0, 50.0 + i as f64]))
                .collect(),
        )
    }

    #[test]
    fn test_daily_statistics() {
        let stats = RiskAggregator::new().daily_statistics(&linear_ensemble(100));
        assert_eq!(stats.mean_path, vec![100.0, 99.5]);
        assert_eq!(stats.lower_path, vec![100.0, 54.0]);
        assert_eq!(stats.upper_path, vec![100.0, 144.0]);
    }

    #[test]
    fn test_percentiles_ignore_path_order() {
        let mut paths: Vec<Path> = (0..20)
            .map(|i| Path::new(vec![1.0, (i as f64) * 3.0 % 19.0]))
            .collect();
        let forward = RiskAggregator::new().daily_statistics(&PathEnsemble::new(paths.clone()));
        paths.reverse();
        let backward = RiskAggregator::new().daily_statistics(&PathEnsemble::new(paths));
        assert_eq!(forward.lower_path, backward.lower_path);
        assert_eq!(forward.upper_path, backward.upper_path);
        assert_relative_eq!(forward.mean_path[1], backward.mean_path[1], epsilon = 1e-12);
    }

    #[test]
    fn test_value_at_risk_floor() {
        let aggregator = RiskAggregator::new();
        let loss = aggregator.value_at_risk(100.0, 80.0);
        assert_eq!(loss.var_loss, 20.0);
        let gain = aggregator.value_at_risk(100.0, 120.0);
        assert_eq!(gain.var_loss, 0.0);
        assert_eq!(gain.var_price, 120.0);
    }

    #[test]
    fn test_aggregate() -> Result<()> {
        let request = SimulationRequest::new(100.0, 0.2, 1, 100)?;
        let ensemble = linear_ensemble(100);
        let sample = ensemble.sample(10);
        let result = RiskAggregator::new().aggregate(&request, &ensemble, sample, 42);
        assert_eq!(result.var_price, 54.0);
        assert_eq!(result.var_loss, 46.0);
        assert_eq!(result.paths.len(), 10);
        assert_eq!(result.seed, 42);
        assert_eq!(result.num_simulations, 100);
        Ok(())
    }

    #[test]
    fn test_heavy_tail_mean_above_upper_band() {
        let mut paths = vec![Path::new(vec![1.0, 1.0]); 19];
        paths.push(Path::new(vec![1.0, 1000.0]));
        let stats = RiskAggregator::new().daily_statistics(&PathEnsemble::new(paths));
        assert_eq!(stats.lower_path[1], 1.0);
        assert_eq!(stats.upper_path[1], 1.0);
        assert_relative_eq!(stats.mean_path[1], 50.95, epsilon = 1e-12);
        assert!(stats.mean_path[1] > stats.upper_path[1]);
    }

    #[test]
    fn test_constant_day_mean_is_exact() {
        let ensemble = PathEnsemble::new(vec![Path::new(vec![0.1]); 7]);
        let stats = RiskAggregator::new().daily_statistics(&ensemble);
        assert_eq!(stats.mean_path, vec![0.1]);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_ensemble_panics() {
        let request = SimulationRequest::new(100.0, 0.2, 3, 100).unwrap();
        let ensemble = linear_ensemble(100);
        RiskAggregator::new().aggregate(&request, &ensemble, Vec::new(), 0);
    }
}
