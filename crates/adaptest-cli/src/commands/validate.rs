//! The `adaptest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptest_core::model::Tier;
use adaptest_core::parser::{parse_question_bank, validate_question_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = parse_question_bank(&bank_path)?;

    println!(
        "Question bank: {} ({} questions: {} low, {} medium, {} high)",
        bank_path.display(),
        bank.len(),
        bank.tier(Tier::Low).len(),
        bank.tier(Tier::Medium).len(),
        bank.tier(Tier::High).len()
    );

    let warnings = validate_question_bank(&bank);
    for w in &warnings {
        let prefix = match w.question_id {
            Some(id) => format!("  [{} #{id}]", w.tier),
            None => format!("  [{}]", w.tier),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
