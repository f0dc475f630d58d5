use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPool, ThreadPoolBuilder,
};
use tracing::{debug, info};

use crate::{
    core::{config::EngineConfig, request::SimulationRequest},
    math::randomnumbers::NormalStream,
    models::{
        gbm::GeometricBrownianMotion,
        path::{Path, PathEnsemble},
        pathgenerator::PathGenerator,
    },
    risk::aggregator::{RiskAggregator, SimulationResult},
    utils::errors::{Result, SimulationError},
};

/// Shared flag checked by a run between paths.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Entry point from a request to a [`SimulationResult`].
///
/// A run owns its ensemble from start to finish and keeps no state once it
/// returns, so one engine can serve any number of concurrent callers.
pub struct MonteCarloEngine<G: PathGenerator = GeometricBrownianMotion> {
    config: EngineConfig,
    generator: G,
    aggregator: RiskAggregator,
    pool: Option<Arc<ThreadPool>>,
}

impl MonteCarloEngine<GeometricBrownianMotion> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_generator(config, GeometricBrownianMotion::new())
    }
}

impl<G: PathGenerator> MonteCarloEngine<G> {
    pub fn with_generator(config: EngineConfig, generator: G) -> Result<Self> {
        let pool = match config.num_threads {
            Some(n) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("mcrisk-worker-{}", i))
                    .build()
                    .map_err(|e| SimulationError::WorkerPool(e.to_string()))?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self {
            config,
            generator,
            aggregator: RiskAggregator::new(),
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Validates raw inputs and runs. Nothing is simulated unless every
    /// field and the resource limits pass.
    pub fn simulate(
        &self,
        current_price: f64,
        volatility: f64,
        num_days: i64,
        num_simulations: i64,
    ) -> Result<SimulationResult> {
        let request = SimulationRequest::new(current_price, volatility, num_days, num_simulations)?;
        self.run(&request)
    }

    /// Runs with the configured seed, or a fresh one when none is set.
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.run_with_seed(request, seed)
    }

    pub fn run_with_seed(&self, request: &SimulationRequest, seed: u64) -> Result<SimulationResult> {
        self.run_cancellable(request, seed, &CancellationToken::new())
    }

    pub fn run_cancellable(
        &self,
        request: &SimulationRequest,
        seed: u64,
        token: &CancellationToken,
    ) -> Result<SimulationResult> {
        let start = Instant::now();
        let ensemble = self.generate_ensemble(request, seed, token)?;
        debug!(
            paths = ensemble.len(),
            path_len = ensemble.path_len(),
            "ensemble generated"
        );

        let sample = ensemble.sample(self.config.sample_cap);
        let result = self.install(|| self.aggregator.aggregate(request, &ensemble, sample, seed));
        info!(
            num_simulations = request.num_simulations(),
            num_days = request.num_days(),
            seed,
            var_price = result.var_price,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "simulation finished"
        );
        Ok(result)
    }

    /// Simulates every path, in parallel, each from its own stream.
    pub fn generate_ensemble(
        &self,
        request: &SimulationRequest,
        seed: u64,
        token: &CancellationToken,
    ) -> Result<PathEnsemble> {
        self.config.check_limits(request)?;
        let method = self.config.normal_method;

        let paths = self.install(|| {
            (0..request.num_simulations())
                .into_par_iter()
                .map(|i| {
                    if token.is_cancelled() {
                        return Err(SimulationError::Cancelled);
                    }
                    let mut source = NormalStream::for_simulation(method, seed, i);
                    Ok(self.generator.generate_path(request, &mut source))
                })
                .collect::<Result<Vec<Path>>>()
        })?;

        Ok(PathEnsemble::new(paths))
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
