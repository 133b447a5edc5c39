//! Weight generation strategies for ABox import.
//!
//! Grounded on `godl-import/import.go`'s `constantGenerator`,
//! `randomGenerator`, `decreasingGenerator`, `increasingGenerator` and
//! `nanGenerator`, selected by the `import -w N` CLI flag.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// N=0: every assertion gets weight 1.0.
    #[default]
    Constant,
    /// N=1: uniform random weight in [0, 1).
    Random,
    /// N=2: weight decreasing as more assertions are imported.
    Decreasing,
    /// N=3: weight increasing as more assertions are imported.
    Increasing,
    /// N=4: every assertion gets weight NaN (never cut by repair).
    Nan,
}

impl WeightMode {
    pub fn from_flag(n: u8) -> Self {
        match n {
            1 => WeightMode::Random,
            2 => WeightMode::Decreasing,
            3 => WeightMode::Increasing,
            4 => WeightMode::Nan,
            _ => WeightMode::Constant,
        }
    }
}

/// Produces weights for the n-th (1-based) assertion imported from a file.
pub struct WeightGenerator {
    mode: WeightMode,
}

impl WeightGenerator {
    pub fn new(mode: WeightMode) -> Self {
        WeightGenerator { mode }
    }

    pub fn next(&self, n: u32) -> f64 {
        match self.mode {
            WeightMode::Constant => 1.0,
            WeightMode::Random => rand::thread_rng().gen_range(0.0..1.0),
            WeightMode::Decreasing => 1.0 / (((n as f64 - 1.0) + std::f64::consts::E).ln()),
            WeightMode::Increasing => {
                1.0 - 1.0 / (((n as f64 - 1.0) + std::f64::consts::E + 1e-11).ln())
            }
            WeightMode::Nan => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_always_one() {
        let g = WeightGenerator::new(WeightMode::Constant);
        assert_eq!(g.next(1), 1.0);
        assert_eq!(g.next(50), 1.0);
    }

    #[test]
    fn nan_never_compares_le_or_gt() {
        let g = WeightGenerator::new(WeightMode::Nan);
        let w = g.next(1);
        assert!(w.is_nan());
        assert!(!(w <= 0.3));
        assert!(!(w > 0.0));
    }

    #[test]
    fn decreasing_then_increasing_move_opposite_directions() {
        let dec = WeightGenerator::new(WeightMode::Decreasing);
        let inc = WeightGenerator::new(WeightMode::Increasing);
        assert!(dec.next(10) < dec.next(2));
        assert!(inc.next(10) > inc.next(2));
    }
}
