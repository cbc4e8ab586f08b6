pub mod absorption;
pub mod damage;
pub mod engine;
pub mod report;
pub mod rng;
pub mod round;
pub mod stack;

pub use absorption::absorb;
pub use damage::{
    channel_damage, volley_damage, DamageProfile, LocationMods, BALLISTIC_MITIGATION_CAP,
};
pub use engine::{
    simulate_battle, BattleContext, BattleError, BattleInput, BattleResult, Fleet, FleetStack,
    Mvp, RemainingForces, Salvage, Winner, DEFAULT_ROUND_LIMIT, MIN_SCALING_BONUS,
};
pub use report::{volleys_csv, BattleSummary, ReportError, SideTotals};
pub use rng::{BattleSeed, Rng};
pub use round::{
    hit_chance, initiative_order, resolve_round, select_target, side_alive, BattleLedger,
    RoundLog, VolleyLog, MAX_HIT_CHANCE, MIN_HIT_CHANCE, SALVAGE_RATE,
};
pub use stack::{Side, StackState, EVASION_CAP};
