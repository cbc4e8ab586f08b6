//! Battle report export for display and download: a per-side summary and a flat CSV volley log.

use serde::Serialize;
use thiserror::Error;

use crate::combat::engine::BattleResult;
use crate::combat::stack::Side;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV report: {0}")]
    Flush(#[from] std::io::Error),
    #[error("CSV report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Reported totals for one side's volleys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideTotals {
    pub volleys: usize,
    pub hits: u64,
    pub damage: u64,
    pub destroyed_units: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BattleSummary {
    pub rounds: usize,
    pub attacker: SideTotals,
    pub defender: SideTotals,
}

impl BattleSummary {
    pub fn from_result(result: &BattleResult) -> Self {
        let mut summary = Self {
            rounds: result.rounds.len(),
            ..Self::default()
        };
        for volley in result.rounds.iter().flat_map(|round| &round.volleys) {
            let totals = match volley.side {
                Side::Attacker => &mut summary.attacker,
                Side::Defender => &mut summary.defender,
            };
            totals.volleys += 1;
            totals.hits += u64::from(volley.hits);
            totals.damage += volley.damage;
            totals.destroyed_units += u64::from(volley.destroyed_units);
        }
        summary
    }
}

#[derive(Debug, Serialize)]
struct VolleyRow<'a> {
    round: u32,
    side: Side,
    from: &'a str,
    to: &'a str,
    hits: u32,
    damage: u64,
    destroyed: u32,
}

/// One CSV row per volley, in battle order, with a header row.
pub fn volleys_csv(result: &BattleResult) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for round in &result.rounds {
        for volley in &round.volleys {
            writer.serialize(VolleyRow {
                round: round.index,
                side: volley.side,
                from: &volley.from_type,
                to: &volley.to_type,
                hits: volley.hits,
                damage: volley.damage,
                destroyed: volley.destroyed_units,
            })?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ReportError::Flush(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::engine::{RemainingForces, Salvage, Winner};
    use crate::combat::round::{RoundLog, VolleyLog};

    fn volley(side: Side, hits: u32, damage: u64, destroyed: u32) -> VolleyLog {
        VolleyLog {
            side,
            from_type: "storm_frigate".to_string(),
            to_type: "scout_drone".to_string(),
            hits,
            damage,
            destroyed_units: destroyed,
        }
    }

    fn sample() -> BattleResult {
        BattleResult {
            winner: Winner::Attacker,
            rounds: vec![
                RoundLog {
                    index: 1,
                    volleys: vec![volley(Side::Attacker, 2, 40, 1), volley(Side::Defender, 0, 0, 0)],
                },
                RoundLog {
                    index: 2,
                    volleys: vec![volley(Side::Attacker, 3, 60, 2)],
                },
            ],
            remaining: RemainingForces::default(),
            salvage: Salvage::default(),
            mvp: None,
        }
    }

    #[test]
    fn summary_totals_per_side() {
        let summary = BattleSummary::from_result(&sample());
        assert_eq!(summary.rounds, 2);
        assert_eq!(
            summary.attacker,
            SideTotals {
                volleys: 2,
                hits: 5,
                damage: 100,
                destroyed_units: 3
            }
        );
        assert_eq!(summary.defender.volleys, 1);
        assert_eq!(summary.defender.damage, 0);
    }

    #[test]
    fn csv_has_header_and_one_row_per_volley() {
        let csv = volleys_csv(&sample()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "round,side,from,to,hits,damage,destroyed");
        assert_eq!(lines[1], "1,attacker,storm_frigate,scout_drone,2,40,1");
        assert_eq!(lines[3], "2,attacker,storm_frigate,scout_drone,3,60,2");
    }
}
