use clap::Parser;
use edge_service::{serve, EdgeError};
use mcrisk::core::config::EngineConfig;
use tracing_subscriber::EnvFilter;

/// Serves `POST /api/simulate` over HTTP.
#[derive(Debug, Parser)]
#[command(name = "edge_service", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: String,

    /// Engine configuration as a JSON file; flags below override it.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Fixed run seed. Without it every request draws a fresh seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_simulations: Option<usize>,

    #[arg(long)]
    max_total_steps: Option<u64>,

    /// Number of paths returned in `simulaciones`.
    #[arg(long)]
    sample_cap: Option<usize>,

    /// Worker threads; defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig, EdgeError> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                EngineConfig::from_json(&json)
                    .map_err(|e| EdgeError::Config(format!("{}: {}", path.display(), e)))?
            }
            None => EngineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(n) = self.max_simulations {
            config = config.with_max_simulations(n);
        }
        if let Some(n) = self.max_total_steps {
            config = config.with_max_total_steps(n);
        }
        if let Some(n) = self.sample_cap {
            config = config.with_sample_cap(n);
        }
        if let Some(n) = self.threads {
            config = config.with_num_threads(n);
        }
        Ok(config)
    }
}

fn main() -> Result<(), EdgeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    tracing::info!(?config, "starting edge service");
    serve(&args.addr, config)
}
