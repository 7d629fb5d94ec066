//! Core data model types for adaptest.
//!
//! These are the fundamental types that the entire adaptest system uses
//! to represent questions, difficulty tiers, and answer records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a question, and the predictor's output class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    /// All tiers in ascending difficulty order.
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Medium, Tier::High];

    /// The tier used to select the very first question of a session.
    pub const SEED: Tier = Tier::Medium;

    /// Numeric level: LOW=0, MEDIUM=1, HIGH=2.
    pub fn level(self) -> u8 {
        match self {
            Tier::Low => 0,
            Tier::Medium => 1,
            Tier::High => 2,
        }
    }

    /// Inverse of [`Tier::level`].
    pub fn from_level(level: u8) -> Option<Tier> {
        match level {
            0 => Some(Tier::Low),
            1 => Some(Tier::Medium),
            2 => Some(Tier::High),
            _ => None,
        }
    }

    /// Lowercase tier name as used in question banks and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Tier::Low),
            "medium" | "med" => Ok(Tier::Medium),
            "high" => Ok(Tier::High),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

/// A candidate answer value. Question banks mix numeric and text answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl PartialEq for AnswerValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnswerValue::Integer(a), AnswerValue::Integer(b)) => a == b,
            (AnswerValue::Number(a), AnswerValue::Number(b)) => a == b,
            (AnswerValue::Integer(a), AnswerValue::Number(b))
            | (AnswerValue::Number(b), AnswerValue::Integer(a)) => (*a as f64) == *b,
            (AnswerValue::Text(a), AnswerValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Integer(n) => write!(f, "{n}"),
            AnswerValue::Number(n) => write!(f, "{n}"),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        AnswerValue::Integer(n)
    }
}

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its tier.
    pub id: u32,
    /// Difficulty tier.
    pub difficulty: Tier,
    /// The question text.
    pub prompt: String,
    /// The correct value.
    pub correct_answer: AnswerValue,
    /// Candidate answers, including the correct one.
    pub choices: Vec<AnswerValue>,
}

impl Question {
    /// Returns `true` if `answer` matches the correct answer.
    pub fn is_correct(&self, answer: &AnswerValue) -> bool {
        self.correct_answer == *answer
    }
}

/// Whether an answer was right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Incorrect,
    Correct,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

impl From<bool> for Outcome {
    fn from(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Log entry for one answered question. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Identifier of the answered question.
    #[serde(alias = "id")]
    pub question_id: u32,
    /// The value the test-taker picked.
    pub selected_answer: AnswerValue,
    /// Correctness of the pick.
    pub result: Outcome,
    /// Difficulty copied from the question.
    pub difficulty: Tier,
    /// Seconds between display and answer.
    pub time_taken: f64,
    /// Tier the predictor chose before this question was served.
    pub predicted_difficulty: Tier,
}

/// A loaded question bank, split by tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub low: Vec<Question>,
    #[serde(default)]
    pub medium: Vec<Question>,
    #[serde(default)]
    pub high: Vec<Question>,
}

impl QuestionBank {
    /// Questions for one tier.
    pub fn tier(&self, tier: Tier) -> &[Question] {
        match tier {
            Tier::Low => &self.low,
            Tier::Medium => &self.medium,
            Tier::High => &self.high,
        }
    }

    /// Total number of questions across all tiers.
    pub fn len(&self) -> usize {
        self.low.len() + self.medium.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_display_and_parse() {
        assert_eq!(Tier::Low.to_string(), "low");
        assert_eq!(Tier::High.to_string(), "high");
        assert_eq!("MEDIUM".parse::<Tier>().unwrap(), Tier::Medium);
        assert_eq!(" high ".parse::<Tier>().unwrap(), Tier::High);
        assert!("extreme".parse::<Tier>().is_err());
    }

    #[test]
    fn tier_levels_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_level(tier.level()), Some(tier));
        }
        assert_eq!(Tier::from_level(3), None);
        assert!(Tier::Low < Tier::Medium && Tier::Medium < Tier::High);
    }

    #[test]
    fn answer_value_equality() {
        assert_eq!(AnswerValue::Integer(4), AnswerValue::Number(4.0));
        assert_eq!(AnswerValue::from("Paris"), AnswerValue::from("Paris"));
        assert_ne!(AnswerValue::from("4"), AnswerValue::Integer(4));
        assert_ne!(AnswerValue::Integer(4), AnswerValue::Integer(5));
    }

    #[test]
    fn answer_value_untagged_json() {
        let values: Vec<AnswerValue> = serde_json::from_str(r#"[12, 2.5, "nine"]"#).unwrap();
        assert_eq!(values[0], AnswerValue::Integer(12));
        assert_eq!(values[1], AnswerValue::Number(2.5));
        assert_eq!(values[2], AnswerValue::from("nine"));
        assert_eq!(values[2].to_string(), "nine");
    }

    #[test]
    fn answer_record_accepts_legacy_id_field() {
        let json = r#"{
            "id": 7,
            "selected_answer": 12,
            "result": "correct",
            "difficulty": "high",
            "time_taken": 3.5,
            "predicted_difficulty": "medium"
        }"#;
        let record: AnswerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.question_id, 7);
        assert_eq!(record.result, Outcome::Correct);
        assert_eq!(record.difficulty, Tier::High);
    }

    #[test]
    fn bank_tier_access() {
        let q = Question {
            id: 1,
            difficulty: Tier::Low,
            prompt: "1 + 1?".into(),
            correct_answer: AnswerValue::Integer(2),
            choices: vec![1.into(), 2.into(), 3.into(), 4.into()],
        };
        let bank = QuestionBank {
            low: vec![q.clone()],
            ..Default::default()
        };
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.tier(Tier::Low)[0], q);
        assert!(bank.tier(Tier::High).is_empty());
        assert!(q.is_correct(&AnswerValue::Number(2.0)));
    }
}
