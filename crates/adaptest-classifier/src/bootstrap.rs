//! Built-in training examples so a predictor exists before any history.

use adaptest_core::features::{encode, TrainingExample};
use adaptest_core::model::Outcome;
use adaptest_core::model::Tier::{self, High, Low, Medium};

/// `(correct, difficulty, time_taken, label)`.
///
/// The first six are fast (4s) answers for every correctness and tier
/// combination; the rest cover slower and mixed-speed answers. A missed HIGH
/// question points back to MEDIUM rather than all the way down.
const BOOTSTRAP_ANSWERS: [(bool, Tier, f64, Tier); 12] = [
    (true, Low, 4.0, Medium),
    (true, Medium, 4.0, High),
    (true, High, 4.0, High),
    (false, Low, 4.0, Low),
    (false, Medium, 4.0, Low),
    (false, High, 4.0, Medium),
    (true, Low, 5.0, Medium),
    (false, Low, 10.0, Low),
    (true, Medium, 7.5, High),
    (false, Medium, 12.0, Low),
    (true, High, 3.0, High),
    (false, High, 15.0, Medium),
];

/// Twelve hand-labelled answers, encoded with the live feature codec.
pub fn bootstrap_examples() -> Vec<TrainingExample> {
    BOOTSTRAP_ANSWERS
        .iter()
        .filter_map(|&(correct, difficulty, time_taken, label)| {
            let features = encode(Outcome::from(correct), difficulty, time_taken).ok()?;
            Some(TrainingExample { features, label })
        })
        .collect()
}
