//! JSON bodies of `POST /api/simulate`, with the field names the browser
//! client sends and reads.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::{
    core::request::SimulationRequest,
    risk::aggregator::SimulationResult,
    utils::errors::{Result, SimulationError},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequestBody {
    pub prc_actual: f64,
    pub volat: f64,
    /// Kept as a raw JSON number so that counts beyond `i64` still reach
    /// the resource limits instead of failing to parse.
    pub num_dias: Number,
    pub num_sims: Number,
}

/// Reads a whole-number count, saturating at `i64::MAX`.
fn count(field: &'static str, value: &Number) -> Result<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    if value.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    match value.as_f64() {
        Some(x) if x.is_finite() && x.fract() == 0.0 => {
            if x >= i64::MAX as f64 {
                Ok(i64::MAX)
            } else if x <= i64::MIN as f64 {
                Ok(i64::MIN)
            } else {
                Ok(x as i64)
            }
        }
        _ => Err(SimulationError::invalid(
            field,
            format!("must be a whole number, got {}", value),
        )),
    }
}

impl TryFrom<SimulateRequestBody> for SimulationRequest {
    type Error = SimulationError;

    fn try_from(body: SimulateRequestBody) -> Result<Self> {
        SimulationRequest::new(
            body.prc_actual,
            body.volat,
            count("num_days", &body.num_dias)?,
            count("num_simulations", &body.num_sims)?,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateResponseBody {
    pub ruta_prom: Vec<f64>,
    pub ruta_p5: Vec<f64>,
    pub ruta_p95: Vec<f64>,
    pub simulaciones: Vec<Vec<f64>>,
    #[serde(rename = "Perdida_VaR")]
    pub perdida_var: f64,
    #[serde(rename = "Prc_VaR_P5")]
    pub prc_var_p5: f64,
    #[serde(rename = "Prc_Ini")]
    pub prc_ini: f64,
    #[serde(rename = "N_Sims")]
    pub n_sims: usize,
    #[serde(rename = "T_Dias")]
    pub t_dias: usize,
}

impl From<SimulationResult> for SimulateResponseBody {
    fn from(result: SimulationResult) -> Self {
        SimulateResponseBody {
            ruta_prom: result.mean_path,
            ruta_p5: result.p5_path,
            ruta_p95: result.p95_path,
            simulaciones: result.paths.into_iter().map(|p| p.into_prices()).collect(),
            perdida_var: round_cents(result.var_loss),
            prc_var_p5: round_cents(result.var_price),
            prc_ini: result.current_price,
            n_sims: result.num_simulations,
            t_dias: result.num_days,
        }
    }
}

/// Error payload. `detail` is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn malformed(detail: impl Into<String>) -> ErrorBody {
        ErrorBody {
            detail: detail.into(),
            kind: "malformed_request".to_string(),
            field: None,
        }
    }
}

impl From<&SimulationError> for ErrorBody {
    fn from(err: &SimulationError) -> Self {
        ErrorBody {
            detail: err.to_string(),
            kind: err.kind().to_string(),
            field: err.field().map(wire_field).map(str::to_string),
        }
    }
}

/// Maps a request field to the key the client used for it.
pub fn wire_field(field: &str) -> &str {
    match field {
        "current_price" => "prc_actual",
        "volatility" => "volat",
        "num_days" => "num_dias",
        "num_simulations" => "num_sims",
        other => other,
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
