//! The `adaptest run` command.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::BufReader;

use adaptest_classifier::config::load_config_from;
use adaptest_classifier::create_predictor;
use adaptest_core::engine::{run_session, AssessmentEngine, EngineConfig};
use adaptest_core::parser::{parse_question_bank, validate_question_bank};
use adaptest_core::report::{session_log_path, SessionSummary};
use adaptest_core::selection::EndReason;
use adaptest_report::classification::write_classification_report;
use adaptest_report::html::write_html_report;

use crate::presenter::TerminalPresenter;

pub struct RunArgs {
    pub bank: Option<PathBuf>,
    pub name: Option<String>,
    pub model: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub choices: usize,
    pub save_always: bool,
    pub html: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    anyhow::ensure!(args.choices >= 2, "choices must be at least 2");

    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let bank_path = args.bank.unwrap_or_else(|| config.question_bank.clone());

    // Setup failures surface before any question is shown.
    let bank = parse_question_bank(&bank_path)?;
    for w in validate_question_bank(&bank) {
        let id = w.question_id.map(|id| format!(" #{id}")).unwrap_or_default();
        tracing::warn!("{}{id}: {}", w.tier, w.message);
    }

    let prepared = create_predictor(&config, args.model.as_deref())?;
    if let Some(training) = &prepared.training {
        match &training.evaluation {
            Some(eval) => {
                write_classification_report(&eval.metrics, &config.report_path)?;
                eprintln!(
                    "Predictor accuracy: {:.2} on {} held-out answers (report: {})",
                    eval.metrics.accuracy,
                    eval.test_samples,
                    config.report_path.display()
                );
            }
            None => eprintln!(
                "Not enough data to evaluate the predictor ({} examples); trained on all of them.",
                training.examples
            ),
        }
    }

    let mut presenter = TerminalPresenter::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    let name = match args.name {
        Some(name) => name,
        None => match presenter.prompt("Enter your name: ").await? {
            Some(name) => name,
            None => anyhow::bail!("no test-taker name given"),
        },
    };
    anyhow::ensure!(!name.trim().is_empty(), "test-taker name must not be empty");

    let engine_config = EngineConfig {
        choices_shown: args.choices,
        stability_window: config.stability_window,
        seed: args.seed,
    };
    let mut engine = AssessmentEngine::new(&bank, prepared.predictor, name.clone(), engine_config);

    println!(
        "Welcome, {name}. {} questions are available; answer with the choice number.",
        bank.len()
    );
    let summary = match run_session(&mut engine, &mut presenter).await {
        Ok(summary) => summary,
        Err(e) => {
            // The presenter has already shown the partial result.
            if args.save_always && !engine.state().records().is_empty() {
                let path = session_log_path(&config.data_dir, &name);
                engine.log().save_json(&path)?;
                eprintln!("Answers given before the failure saved to: {}", path.display());
            }
            return Err(e);
        }
    };

    if summary.end_reason == EndReason::Aborted {
        println!("Session aborted; nothing was saved.");
        return Ok(());
    }

    print_summary(&summary);

    let log = engine.log();
    if summary.determined.is_some() || args.save_always {
        let path = session_log_path(&config.data_dir, &name);
        log.save_json(&path)?;
        println!("Answers saved to: {}", path.display());
    } else {
        println!("Ability not determined; answers were not saved (use --save-always to keep them).");
    }

    if let Some(path) = args.html {
        write_html_report(&name, &log, Some(&summary), &path)?;
        println!("HTML report: {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Correct", "Score", "Ability", "Ended", "Predictor"]);
    table.add_row(vec![
        Cell::new(format!("{} / {}", summary.correct_count, summary.answered)),
        Cell::new(format!("{} / {}", summary.score, summary.possible_score)),
        Cell::new(summary.determined.map_or("undetermined", |t| t.as_str())),
        Cell::new(summary.end_reason.to_string()),
        Cell::new(&summary.predictor),
    ]);

    println!("\n{table}");
}
