//! Session log and summary types with JSON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerRecord, Outcome, Tier};
use crate::scoring::Scoreboard;
use crate::selection::EndReason;

/// Ordered answer log for one session.
///
/// Serialized as a bare JSON array so that saved sessions double as
/// historical training input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLog {
    pub records: Vec<AnswerRecord>,
}

impl SessionLog {
    pub fn new(records: Vec<AnswerRecord>) -> Self {
        Self { records }
    }

    /// Save the log as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session log")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session log to {}", path.display()))?;
        Ok(())
    }

    /// Load a log saved with [`SessionLog::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session log from {}", path.display()))?;
        let log: SessionLog =
            serde_json::from_str(&content).context("failed to parse session log JSON")?;
        Ok(log)
    }

    /// Number of correct answers.
    pub fn correct_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.result == Outcome::Correct)
            .count()
    }

    /// Re-score the log from scratch.
    pub fn scoreboard(&self) -> Scoreboard {
        let mut board = Scoreboard::default();
        for r in &self.records {
            board.apply(r.difficulty, r.result);
        }
        board
    }

    /// Answered and correct counts per tier, for tiers that were served.
    pub fn tier_breakdown(&self) -> BTreeMap<Tier, TierTally> {
        let mut tally: BTreeMap<Tier, TierTally> = BTreeMap::new();
        for r in &self.records {
            let entry = tally.entry(r.difficulty).or_default();
            entry.answered += 1;
            if r.result.is_correct() {
                entry.correct += 1;
            }
        }
        tally
    }
}

/// Per-tier counts in a session log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTally {
    pub answered: u32,
    pub correct: u32,
}

/// Where a test-taker's log is stored: `<data_dir>/<name>_answers.json`.
pub fn session_log_path(data_dir: &Path, test_taker: &str) -> PathBuf {
    let name: String = test_taker
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    data_dir.join(format!("{name}_answers.json"))
}

/// Read-only end-of-session artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier.
    pub id: Uuid,
    /// Test-taker name as entered.
    pub test_taker: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub score: i64,
    pub possible_score: u32,
    pub correct_count: u32,
    pub answered: u32,
    /// Bank size when the session started.
    pub total_questions: usize,
    pub end_reason: EndReason,
    /// Tier the predictor settled on, if it did.
    pub determined: Option<Tier>,
    /// Name of the predictor used.
    pub predictor: String,
}

impl SessionSummary {
    /// One-line result, e.g. `"3 / 5 correct, score 7 / 11"`.
    pub fn headline(&self) -> String {
        format!(
            "{} / {} correct, score {} / {}",
            self.correct_count, self.answered, self.score, self.possible_score
        )
    }

    /// Score as a fraction of the possible score, clamped at zero.
    pub fn score_ratio(&self) -> f64 {
        if self.possible_score == 0 {
            0.0
        } else {
            (self.score.max(0) as f64) / f64::from(self.possible_score)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;

    fn record(id: u32, result: Outcome) -> AnswerRecord {
        AnswerRecord {
            question_id: id,
            selected_answer: AnswerValue::Integer(4),
            result,
            difficulty: Tier::Medium,
            time_taken: 2.5,
            predicted_difficulty: Tier::Medium,
        }
    }

    #[test]
    fn log_is_a_bare_array() {
        let log = SessionLog::new(vec![record(1, Outcome::Correct)]);
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["question_id"], 1);
        assert_eq!(json[0]["result"], "correct");
    }

    #[test]
    fn json_roundtrip() {
        let log = SessionLog::new(vec![record(1, Outcome::Correct), record(2, Outcome::Incorrect)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.json");

        log.save_json(&path).unwrap();
        let loaded = SessionLog::load_json(&path).unwrap();

        assert_eq!(loaded, log);
        assert_eq!(loaded.correct_count(), 1);
    }

    #[test]
    fn replayed_scoreboard_and_breakdown() {
        let mut high = record(3, Outcome::Incorrect);
        high.difficulty = Tier::High;
        let log = SessionLog::new(vec![record(1, Outcome::Correct), record(2, Outcome::Incorrect), high]);

        let board = log.scoreboard();
        assert_eq!(board.score, 3 - 1);
        assert_eq!(board.possible_score, 2 + 2 + 3);
        assert_eq!(board.correct_count, 1);

        let tally = log.tier_breakdown();
        assert_eq!(tally[&Tier::Medium], TierTally { answered: 2, correct: 1 });
        assert_eq!(tally[&Tier::High].correct, 0);
        assert!(!tally.contains_key(&Tier::Low));
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(SessionLog::load_json(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn log_path_is_lowercased_name() {
        let path = session_log_path(Path::new("data"), "Alice");
        assert_eq!(path, PathBuf::from("data/alice_answers.json"));
        let path = session_log_path(Path::new("data"), "../Bob Smith");
        assert_eq!(path, PathBuf::from("data/___bob_smith_answers.json"));
    }

    #[test]
    fn summary_headline() {
        let summary = SessionSummary {
            id: Uuid::nil(),
            test_taker: "alice".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            score: 7,
            possible_score: 11,
            correct_count: 3,
            answered: 5,
            total_questions: 9,
            end_reason: EndReason::BankExhausted,
            determined: Some(Tier::High),
            predictor: "rule_table".into(),
        };
        assert_eq!(summary.headline(), "3 / 5 correct, score 7 / 11");
        assert!((summary.score_ratio() - 7.0 / 11.0).abs() < 1e-12);
    }
}
