use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::{simulate_battle, volleys_csv, BattleError, BattleInput, ReportError};
use crate::data::{ResearchLevels, UnitProfile};
use crate::parallel::{check_run_count, sweep_seeds, SweepError, DEFAULT_SWEEP_RUNS};
use crate::server::ServerState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub units: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitsResponse<'a> {
    pub units: Vec<&'a UnitProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepRequest {
    pub input: BattleInput,
    pub runs: Option<u32>,
}

#[derive(Debug)]
pub enum SimulateError {
    Parse(serde_json::Error),
    Validation(String),
    Internal(String),
}

impl fmt::Display for SimulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Validation(m) | Self::Internal(m) => write!(f, "{m}"),
        }
    }
}

impl std::error::Error for SimulateError {}

impl From<BattleError> for SimulateError {
    fn from(err: BattleError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ReportError> for SimulateError {
    fn from(err: ReportError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SweepError> for SimulateError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Battle(err) => err.into(),
            err @ SweepError::RunsOutOfRange(_) => Self::Validation(err.to_string()),
            SweepError::Pool(err) => Self::Internal(err.to_string()),
        }
    }
}

pub fn health_payload(state: &ServerState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&HealthResponse {
        status: "ok",
        engine: "broadside",
        units: state.registry.len(),
    })
}

pub fn units_payload(state: &ServerState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&UnitsResponse {
        units: state.registry.profiles().collect(),
    })
}

pub fn simulate_payload(state: &ServerState, body: &str) -> Result<String, SimulateError> {
    let input: BattleInput = serde_json::from_str(body).map_err(SimulateError::Parse)?;
    let result = simulate_battle(&input, &state.registry)?;
    serde_json::to_string_pretty(&result).map_err(SimulateError::Parse)
}

pub fn simulate_csv_payload(state: &ServerState, body: &str) -> Result<String, SimulateError> {
    let input: BattleInput = serde_json::from_str(body).map_err(SimulateError::Parse)?;
    let result = simulate_battle(&input, &state.registry)?;
    Ok(volleys_csv(&result)?)
}

pub fn sweep_payload(state: &ServerState, body: &str) -> Result<String, SimulateError> {
    let request: SweepRequest = serde_json::from_str(body).map_err(SimulateError::Parse)?;
    let runs = check_run_count(request.runs.unwrap_or(DEFAULT_SWEEP_RUNS))?;
    let summary = sweep_seeds(&request.input, runs, &state.registry, &state.pool)?;
    serde_json::to_string_pretty(&summary).map_err(SimulateError::Parse)
}

pub fn tech_payload(body: &str) -> Result<String, serde_json::Error> {
    let levels: ResearchLevels = serde_json::from_str(body)?;
    serde_json::to_string_pretty(&levels.to_tech_bonuses())
}
