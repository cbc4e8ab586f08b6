//! Seeded PRNG for battle resolution. Park-Miller style multiplicative LCG over the prime 2^31-1.
//! Deterministic: the same seed produces the same sequence on every platform. Not cryptographically secure.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const LCG_MODULUS: u64 = 2_147_483_647;
pub const LCG_MULTIPLIER: u64 = 48_271;
const STRING_FOLD_FACTOR: u64 = 31;

/// Battle seed as supplied by callers: either an integer or an arbitrary string
/// (mission identifiers are typically used as string seeds).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BattleSeed {
    Number(i64),
    Text(String),
}

impl BattleSeed {
    /// Initial generator state. Never zero.
    pub fn initial_state(&self) -> u64 {
        let state = match self {
            Self::Number(value) => value.unsigned_abs() % LCG_MODULUS,
            Self::Text(text) => text.encode_utf16().fold(0u64, |acc, unit| {
                (acc * STRING_FOLD_FACTOR + u64::from(unit)) % LCG_MODULUS
            }),
        };
        if state == 0 {
            1
        } else {
            state
        }
    }
}

impl From<i64> for BattleSeed {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for BattleSeed {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BattleSeed {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for BattleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: &BattleSeed) -> Self {
        Self {
            state: seed.initial_state(),
        }
    }

    /// Advances the state and returns a value in (0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_deterministic() {
        let seed = BattleSeed::from("mission-42");
        let mut a = Rng::new(&seed);
        let mut b = Rng::new(&seed);
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn lcg_different_seeds_differ() {
        let mut a = Rng::new(&BattleSeed::Number(1));
        let mut b = Rng::new(&BattleSeed::Number(2));
        assert_ne!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn first_value_for_seed_one_is_multiplier_over_modulus() {
        let mut rng = Rng::new(&BattleSeed::Number(1));
        assert_eq!(rng.next_f64(), 48_271.0 / 2_147_483_647.0);
    }

    #[test]
    fn string_seed_folds_character_codes() {
        // 'a' = 97, 'b' = 98 -> 97 * 31 + 98
        assert_eq!(BattleSeed::from("ab").initial_state(), 97 * 31 + 98);
    }

    #[test]
    fn zero_states_are_forced_to_one() {
        assert_eq!(BattleSeed::Number(0).initial_state(), 1);
        assert_eq!(BattleSeed::Number(2_147_483_647).initial_state(), 1);
        assert_eq!(BattleSeed::from("").initial_state(), 1);
    }

    #[test]
    fn negative_numeric_seed_uses_absolute_value() {
        assert_eq!(
            BattleSeed::Number(-12345).initial_state(),
            BattleSeed::Number(12345).initial_state()
        );
        assert!(BattleSeed::Number(i64::MIN).initial_state() < LCG_MODULUS);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut rng = Rng::new(&BattleSeed::from("range"));
        for _ in 0..10_000 {
            let value = rng.next_f64();
            assert!(value > 0.0 && value < 1.0, "out of range: {value}");
        }
    }

    #[test]
    fn seed_deserializes_from_number_or_string() {
        let number: BattleSeed = serde_json::from_str("17").unwrap();
        let text: BattleSeed = serde_json::from_str("\"mirror\"").unwrap();
        assert_eq!(number, BattleSeed::Number(17));
        assert_eq!(text, BattleSeed::Text("mirror".to_string()));
    }
}
