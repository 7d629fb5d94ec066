//! Lenient loader for historical session logs.
//!
//! Every `*.json` file in the data directory is read as an array of answer
//! records. Entries with a missing or unusable `result`, `difficulty` or
//! `time_taken` are skipped with a warning; files that cannot be read or
//! parsed are skipped with an error. Neither aborts training.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use adaptest_core::features::{derive_label, encode, TrainingExample};
use adaptest_core::model::{Outcome, Tier};

/// Training examples recovered from a history directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedHistory {
    pub examples: Vec<TrainingExample>,
    /// Files that contributed (even if every entry was skipped).
    pub files_read: usize,
    /// Files that could not be read or parsed.
    pub files_skipped: usize,
    /// Individual entries dropped as malformed.
    pub entries_skipped: usize,
}

fn parse_result(value: Option<&Value>) -> Result<Outcome, String> {
    match value {
        None | Some(Value::Null) => Err("missing result".into()),
        Some(Value::Bool(b)) => Ok(Outcome::from(*b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Ok(Outcome::Correct),
            Some(0) => Ok(Outcome::Incorrect),
            _ => Err(format!("invalid result: {n}")),
        },
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "correct" => Ok(Outcome::Correct),
            "incorrect" => Ok(Outcome::Incorrect),
            other => Err(format!("invalid result: {other}")),
        },
        Some(other) => Err(format!("invalid result: {other}")),
    }
}

fn parse_difficulty(value: Option<&Value>) -> Result<Tier, String> {
    match value {
        None | Some(Value::Null) => Err("missing difficulty".into()),
        Some(Value::String(s)) => s.parse(),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .and_then(Tier::from_level)
            .ok_or_else(|| format!("invalid difficulty level: {n}")),
        Some(other) => Err(format!("invalid difficulty: {other}")),
    }
}

fn parse_time(value: Option<&Value>) -> Result<f64, String> {
    match value {
        None | Some(Value::Null) => Err("missing time_taken".into()),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("invalid time_taken: {n}")),
        Some(other) => Err(format!("invalid time_taken: {other}")),
    }
}

/// Turn one raw log entry into a training example.
pub fn parse_entry(entry: &Value) -> Result<TrainingExample, String> {
    let outcome = parse_result(entry.get("result"))?;
    let difficulty = parse_difficulty(entry.get("difficulty"))?;
    let time_taken = parse_time(entry.get("time_taken"))?;
    let features = encode(outcome, difficulty, time_taken).map_err(|e| e.to_string())?;
    Ok(TrainingExample {
        features,
        label: derive_label(outcome, difficulty),
    })
}

fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Array(entries) => Ok(entries),
        _ => anyhow::bail!("{} does not contain a list of answers", path.display()),
    }
}

/// Load training examples from every `*.json` file in `dir`.
///
/// A missing directory yields an empty history. Files are processed in
/// path order.
pub fn load_history_dir(dir: &Path) -> Result<LoadedHistory> {
    let mut history = LoadedHistory::default();
    if !dir.exists() {
        tracing::debug!("no history directory at {}", dir.display());
        return Ok(history);
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("skipping {}: {e:#}", path.display());
                history.files_skipped += 1;
                continue;
            }
        };
        history.files_read += 1;

        for (i, entry) in entries.iter().enumerate() {
            match parse_entry(entry) {
                Ok(example) => history.examples.push(example),
                Err(reason) => {
                    tracing::warn!("{}: skipping entry {i}: {reason}", path.display());
                    history.entries_skipped += 1;
                }
            }
        }
    }

    tracing::info!(
        "loaded {} historical examples from {} files ({} entries skipped)",
        history.examples.len(),
        history.files_read,
        history.entries_skipped
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_all_result_and_difficulty_forms() {
        let entries = [
            json!({"result": "correct", "difficulty": "high", "time_taken": 3.0}),
            json!({"result": 1, "difficulty": 2, "time_taken": 3.0}),
            json!({"result": true, "difficulty": "HIGH", "time_taken": 3}),
        ];
        for entry in &entries {
            let ex = parse_entry(entry).unwrap();
            assert_eq!(ex.label, Tier::High);
            assert_eq!(ex.features.weighted_correctness(), 10.0);
            assert_eq!(ex.features.difficulty(), 2.0);
        }

        let ex = parse_entry(&json!({"result": 0, "difficulty": 0, "time_taken": 9.5})).unwrap();
        assert_eq!(ex.label, Tier::Low);
    }

    #[test]
    fn rejects_malformed_entries() {
        let bad = [
            json!({"difficulty": "low", "time_taken": 1.0}),
            json!({"result": "maybe", "difficulty": "low", "time_taken": 1.0}),
            json!({"result": 2, "difficulty": "low", "time_taken": 1.0}),
            json!({"result": "correct", "difficulty": "extreme", "time_taken": 1.0}),
            json!({"result": "correct", "difficulty": 5, "time_taken": 1.0}),
            json!({"result": "correct", "difficulty": "low"}),
            json!({"result": "correct", "difficulty": "low", "time_taken": "fast"}),
            json!({"result": "correct", "difficulty": "low", "time_taken": -1.0}),
        ];
        for entry in &bad {
            assert!(parse_entry(entry).is_err(), "{entry} should be rejected");
        }
    }

    #[test]
    fn loads_directory_skipping_bad_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("alice_answers.json"),
            json!([
                {"question_id": 1, "selected_answer": 4, "result": "correct", "difficulty": "low",
                 "time_taken": 2.0, "predicted_difficulty": "medium"},
                {"id": 2, "result": "incorrect", "difficulty": "medium", "time_taken": 8.0},
                {"id": 3, "result": "correct", "difficulty": "medium"}
            ])
            .to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken_answers.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("object.json"), r#"{"low": []}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let history = load_history_dir(dir.path()).unwrap();
        assert_eq!(history.examples.len(), 2);
        assert_eq!(history.files_read, 1);
        assert_eq!(history.files_skipped, 2);
        assert_eq!(history.entries_skipped, 1);
        assert_eq!(history.examples[0].label, Tier::Medium);
        assert_eq!(history.examples[1].label, Tier::Low);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_history_dir(&dir.path().join("nope")).unwrap();
        assert!(history.examples.is_empty());
        assert_eq!(history.files_read, 0);
    }
}
