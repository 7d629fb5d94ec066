//! The `adaptest summary` command.

use std::path::PathBuf;

use anyhow::Result;

use adaptest_core::report::SessionLog;
use adaptest_report::html::write_html_report;

/// Name implied by a `<name>_answers.json` file.
fn name_from_path(path: &std::path::Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_suffix("_answers").unwrap_or(&stem).to_string()
}

pub fn execute(log_path: PathBuf, name: Option<String>, html: Option<PathBuf>) -> Result<()> {
    let log = SessionLog::load_json(&log_path)?;
    let name = name.unwrap_or_else(|| name_from_path(&log_path));
    let board = log.scoreboard();

    println!("Session log: {} ({name})", log_path.display());
    print_breakdown(&log);
    println!(
        "{} / {} correct, score {} / {}",
        board.correct_count, board.answered, board.score, board.possible_score
    );

    if let Some(path) = html {
        write_html_report(&name, &log, None, &path)?;
        println!("HTML report: {}", path.display());
    }

    Ok(())
}

fn print_breakdown(log: &SessionLog) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Tier", "Answered", "Correct", "Accuracy"]);
    for (tier, t) in log.tier_breakdown() {
        let accuracy = f64::from(t.correct) / f64::from(t.answered.max(1));
        table.add_row(vec![
            Cell::new(tier.as_str()),
            Cell::new(t.answered),
            Cell::new(t.correct),
            Cell::new(format!("{:.1}%", accuracy * 100.0)),
        ]);
    }

    println!("{table}");
}
