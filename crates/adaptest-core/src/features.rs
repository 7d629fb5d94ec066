//! Answer feature encoding and training-label derivation.
//!
//! A feature vector is `[weighted_correctness, difficulty_level, ln(time_taken + 1)]`.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::model::{AnswerRecord, Outcome, Tier};

/// Number of features produced per answer.
pub const FEATURE_COUNT: usize = 3;

/// Answers faster than this (seconds) earn full credit.
pub const FAST_ANSWER_SECS: f64 = 6.0;

/// Answers at or beyond this (seconds) earn the lowest credit.
pub const SLOW_ANSWER_SECS: f64 = 10.0;

/// A single encoded answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn weighted_correctness(&self) -> f64 {
        self.0[0]
    }

    pub fn difficulty(&self) -> f64 {
        self.0[1]
    }

    pub fn log_time(&self) -> f64 {
        self.0[2]
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Speed-weighted credit for a single answer.
///
/// Incorrect answers earn 0. Correct answers earn 10 below 6s, 7 below 10s,
/// and 5 otherwise.
pub fn weighted_correctness(is_correct: bool, time_taken: f64) -> u8 {
    if !is_correct {
        return 0;
    }
    if time_taken < FAST_ANSWER_SECS {
        10
    } else if time_taken < SLOW_ANSWER_SECS {
        7
    } else {
        5
    }
}

/// Encode a raw answer event.
pub fn encode(outcome: Outcome, difficulty: Tier, time_taken: f64) -> Result<FeatureVector, CodecError> {
    if !time_taken.is_finite() || time_taken < 0.0 {
        return Err(CodecError::InvalidTime(time_taken));
    }
    Ok(FeatureVector([
        f64::from(weighted_correctness(outcome.is_correct(), time_taken)),
        f64::from(difficulty.level()),
        (time_taken + 1.0).ln(),
    ]))
}

/// Encode a logged answer.
pub fn encode_record(record: &AnswerRecord) -> Result<FeatureVector, CodecError> {
    encode(record.result, record.difficulty, record.time_taken)
}

/// Training label for a historical answer.
///
/// Uses actual performance only; `predicted_difficulty` is ignored.
pub fn derive_label(outcome: Outcome, difficulty: Tier) -> Tier {
    match outcome {
        Outcome::Correct if difficulty >= Tier::Medium => Tier::High,
        Outcome::Correct => Tier::Medium,
        Outcome::Incorrect => Tier::Low,
    }
}

/// A labelled example for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: Tier,
}

impl TrainingExample {
    /// Build an example from a logged answer using [`derive_label`].
    pub fn from_record(record: &AnswerRecord) -> Result<Self, CodecError> {
        Ok(Self {
            features: encode_record(record)?,
            label: derive_label(record.result, record.difficulty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;

    #[test]
    fn incorrect_is_always_zero() {
        for t in [0.0, 0.5, 5.99, 6.0, 9.99, 10.0, 300.0] {
            assert_eq!(weighted_correctness(false, t), 0, "t={t}");
        }
    }

    #[test]
    fn correct_speed_buckets() {
        assert_eq!(weighted_correctness(true, 3.0), 10);
        assert_eq!(weighted_correctness(true, 7.0), 7);
        assert_eq!(weighted_correctness(true, 11.0), 5);
    }

    #[test]
    fn bucket_boundaries_belong_to_slower_tier() {
        assert_eq!(weighted_correctness(true, 5.999), 10);
        assert_eq!(weighted_correctness(true, 6.0), 7);
        assert_eq!(weighted_correctness(true, 9.999), 7);
        assert_eq!(weighted_correctness(true, 10.0), 5);
    }

    #[test]
    fn encode_layout() {
        let v = encode(Outcome::Correct, Tier::High, 4.0).unwrap();
        assert_eq!(v.weighted_correctness(), 10.0);
        assert_eq!(v.difficulty(), 2.0);
        assert!((v.log_time() - 5f64.ln()).abs() < 1e-12);
        assert!(v.is_finite());
    }

    #[test]
    fn encode_rejects_bad_time() {
        assert_eq!(
            encode(Outcome::Correct, Tier::Low, -1.0),
            Err(CodecError::InvalidTime(-1.0))
        );
        assert!(encode(Outcome::Correct, Tier::Low, f64::NAN).is_err());
        assert!(encode(Outcome::Correct, Tier::Low, f64::INFINITY).is_err());
    }

    #[test]
    fn log_time_is_monotonic() {
        let a = encode(Outcome::Incorrect, Tier::Low, 1.0).unwrap();
        let b = encode(Outcome::Incorrect, Tier::Low, 50.0).unwrap();
        assert!(a.log_time() < b.log_time());
        assert_eq!(encode(Outcome::Incorrect, Tier::Low, 0.0).unwrap().log_time(), 0.0);
    }

    #[test]
    fn label_policy() {
        assert_eq!(derive_label(Outcome::Correct, Tier::High), Tier::High);
        assert_eq!(derive_label(Outcome::Correct, Tier::Medium), Tier::High);
        assert_eq!(derive_label(Outcome::Correct, Tier::Low), Tier::Medium);
        for tier in Tier::ALL {
            assert_eq!(derive_label(Outcome::Incorrect, tier), Tier::Low);
        }
    }

    #[test]
    fn example_from_record() {
        let record = AnswerRecord {
            question_id: 3,
            selected_answer: AnswerValue::from("x"),
            result: Outcome::Correct,
            difficulty: Tier::Low,
            time_taken: 8.0,
            predicted_difficulty: Tier::High,
        };
        let ex = TrainingExample::from_record(&record).unwrap();
        assert_eq!(ex.label, Tier::Medium);
        assert_eq!(ex.features.weighted_correctness(), 7.0);
        assert_eq!(ex.features.difficulty(), 0.0);
    }
}
