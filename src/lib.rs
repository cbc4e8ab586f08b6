//! Deterministic fleet battle resolution for a tick-driven strategy simulation.
//!
//! [combat::simulate_battle] turns two fleets, their technology bonuses and a seed into a
//! reproducible round-by-round [combat::BattleResult]. The surrounding modules load unit catalogs,
//! resolve missions in batches and expose the engine over a CLI and a small HTTP API.

pub mod cli;
pub mod combat;
pub mod config;
pub mod data;
pub mod mission;
pub mod parallel;
pub mod server;
