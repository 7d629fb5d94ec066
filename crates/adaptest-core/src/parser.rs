//! Question bank parser.
//!
//! Loads question banks from JSON or TOML files and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerValue, Question, QuestionBank, Tier};

/// Minimum number of choices a question must offer.
pub const MIN_CHOICES: usize = 4;

/// On-disk encoding of a question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    /// Pick the format from a file extension. Anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => BankFormat::Toml,
            _ => BankFormat::Json,
        }
    }
}

/// Intermediate structure for a single question entry.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u32,
    #[serde(default)]
    difficulty: Option<String>,
    question: String,
    answer: AnswerValue,
    #[serde(rename = "answer choices", alias = "answer_choices", alias = "choices")]
    answer_choices: Vec<AnswerValue>,
}

/// Parse a question bank file, choosing JSON or TOML by extension.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, BankFormat::from_path(path), path)
}

/// Parse a question bank from a string (useful for testing).
pub fn parse_question_bank_str(
    content: &str,
    format: BankFormat,
    source_path: &Path,
) -> Result<QuestionBank> {
    let raw: BTreeMap<String, Vec<RawQuestion>> = match format {
        BankFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        BankFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };

    let mut bank = QuestionBank::default();
    for (key, questions) in raw {
        let tier: Tier = key
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{}: {}", source_path.display(), e))?;

        let converted = questions
            .into_iter()
            .map(|q| {
                let difficulty = match q.difficulty {
                    Some(d) => d.parse().map_err(|e: String| {
                        anyhow::anyhow!("question {} in '{}': {}", q.id, key, e)
                    })?,
                    None => tier,
                };
                Ok(Question {
                    id: q.id,
                    difficulty,
                    prompt: q.question,
                    correct_answer: q.answer,
                    choices: q.answer_choices,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match tier {
            Tier::Low => bank.low.extend(converted),
            Tier::Medium => bank.medium.extend(converted),
            Tier::High => bank.high.extend(converted),
        }
    }

    tracing::debug!(
        "loaded question bank {}: {} low, {} medium, {} high",
        source_path.display(),
        bank.low.len(),
        bank.medium.len(),
        bank.high.len()
    );

    Ok(bank)
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The tier the issue was found in.
    pub tier: Tier,
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common issues.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for tier in Tier::ALL {
        let questions = bank.tier(tier);

        if questions.is_empty() {
            warnings.push(ValidationWarning {
                tier,
                question_id: None,
                message: format!("no {tier} questions"),
            });
        }

        let mut seen_ids = HashSet::new();
        for q in questions {
            let mut warn = |message: String| {
                warnings.push(ValidationWarning {
                    tier,
                    question_id: Some(q.id),
                    message,
                })
            };

            if !seen_ids.insert(q.id) {
                warn(format!("duplicate question ID: {}", q.id));
            }
            if q.difficulty != tier {
                warn(format!("difficulty '{}' listed under '{tier}'", q.difficulty));
            }
            if q.prompt.trim().is_empty() {
                warn("question text is empty".into());
            }
            if q.choices.len() < MIN_CHOICES {
                warn(format!(
                    "only {} answer choices, at least {MIN_CHOICES} required",
                    q.choices.len()
                ));
            }
            if !q.choices.iter().any(|c| q.is_correct(c)) {
                warn(format!("answer '{}' is not among the choices", q.correct_answer));
            }
        }
    }

    warnings
}
