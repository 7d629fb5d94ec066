//! Difficulty-weighted scoring.
//!
//! Hard questions pay more when answered correctly, and easy questions cost
//! more when missed. A miss on a HIGH question carries no penalty.

use serde::{Deserialize, Serialize};

use crate::model::{Outcome, Tier};

/// Maximum points a question of this tier contributes to the possible score.
pub fn possible_points(tier: Tier) -> u32 {
    u32::from(tier.level()) + 1
}

/// Score change for one answer.
pub fn score_delta(tier: Tier, outcome: Outcome) -> i64 {
    let d = i64::from(tier.level());
    match (outcome, tier) {
        (Outcome::Correct, _) => d * 2 + 1,
        (Outcome::Incorrect, Tier::Low) => -2,
        (Outcome::Incorrect, Tier::Medium) => -1,
        (Outcome::Incorrect, Tier::High) => 0,
    }
}

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: i64,
    pub possible_score: u32,
    pub correct_count: u32,
    pub answered: u32,
}

impl Scoreboard {
    /// Apply one answer and return the score change.
    pub fn apply(&mut self, tier: Tier, outcome: Outcome) -> i64 {
        let delta = score_delta(tier, outcome);
        self.possible_score += possible_points(tier);
        self.score += delta;
        self.answered += 1;
        if outcome.is_correct() {
            self.correct_count += 1;
        }
        delta
    }

    /// Fraction of answers that were correct.
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            f64::from(self.correct_count) / f64::from(self.answered)
        }
    }
}
