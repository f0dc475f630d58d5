use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid parameter `{field}`: {message}")]
    InvalidParameter { field: &'static str, message: String },
    #[error("Resource limit exceeded: {message} (requested {requested}, limit {limit})")]
    ResourceLimitExceeded {
        message: String,
        requested: u64,
        limit: u64,
    },
    #[error("Simulation cancelled")]
    Cancelled,
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl SimulationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> SimulationError {
        SimulationError::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable tag for the error family.
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::InvalidParameter { .. } => "invalid_parameter",
            SimulationError::ResourceLimitExceeded { .. } => "resource_limit_exceeded",
            SimulationError::Cancelled => "cancelled",
            SimulationError::WorkerPool(_) => "worker_pool",
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            SimulationError::InvalidParameter { field, .. } => Some(*field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

impl From<SimulationError> for String {
    fn from(e: SimulationError) -> Self {
        e.to_string()
    }
}
