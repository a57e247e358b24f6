use crate::State;

/// A threshold of this value disables its level.
pub const DISABLED: u8 = 100;

/// Warning and critical levels, both percentages in 0..=100.
///
/// A value strictly above a level raises it, and a level of exactly 100 never fires, so the
/// defaults mean "never alert". Inverted levels (warning above critical) are taken as given.
///
/// ```rust
/// # use check_snmp_status::{State, Thresholds};
/// let thresholds = Thresholds::new(80, 95);
/// assert_eq!(thresholds.evaluate(80), State::Ok);
/// assert_eq!(thresholds.evaluate(81), State::Warning);
/// assert_eq!(thresholds.evaluate(96), State::Critical);
/// assert_eq!(Thresholds::default().evaluate(100), State::Ok);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: u8,
    pub critical: u8,
}

impl Thresholds {
    pub fn new(warning: u8, critical: u8) -> Self {
        Thresholds { warning, critical }
    }

    pub fn evaluate(&self, value: i64) -> State {
        if self.critical < DISABLED && value > i64::from(self.critical) {
            State::Critical
        } else if self.warning < DISABLED && value > i64::from(self.warning) {
            State::Warning
        } else {
            State::Ok
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::new(DISABLED, DISABLED)
    }
}

/// Rounds to the nearest integer, ties to even.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// `round_half_even(used / total * 100)` in f64. `total` must not be zero.
///
/// The ratio is scaled after the division, so `23 / 40` lands just below 57.5 and gives 57.
pub fn percent(used: i64, total: i64) -> i64 {
    round_half_even(used as f64 / total as f64 * 100.0)
}
