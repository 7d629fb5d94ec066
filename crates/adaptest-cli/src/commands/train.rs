//! The `adaptest train` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use adaptest_classifier::config::load_config_from;
use adaptest_classifier::training::{collect_examples, train, Evaluation};
use adaptest_report::classification::{format_classification_report, write_classification_report};

pub fn execute(
    output: PathBuf,
    data_dir: Option<PathBuf>,
    report: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    let report_path = report.unwrap_or_else(|| config.report_path.clone());

    let collected = collect_examples(Some(&config.data_dir), config.use_bootstrap)?;
    println!(
        "Training on {} examples ({} built-in, {} from {} file(s) in {}; {} entries skipped)",
        collected.examples.len(),
        collected.bootstrap,
        collected.from_history(),
        collected.history.files_read,
        config.data_dir.display(),
        collected.history.entries_skipped
    );

    let outcome = train(&collected.examples, &config.training_options()).context("training failed")?;

    match &outcome.evaluation {
        Some(eval) => {
            print_evaluation(eval);
            write_classification_report(&eval.metrics, &report_path)?;
            println!("Classification report: {}", report_path.display());
        }
        None => println!(
            "Not enough data for a held-out evaluation (need at least {}).",
            config.min_eval_samples
        ),
    }

    outcome.model.save_json(&output)?;
    println!(
        "Model saved to: {} (depth {}, {} leaves)",
        output.display(),
        outcome.model.depth(),
        outcome.model.leaf_count()
    );

    Ok(())
}

fn print_evaluation(eval: &Evaluation) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Tier", "Precision", "Recall", "F1", "Support"]);
    for (tier, m) in &eval.metrics.per_class {
        table.add_row(vec![
            Cell::new(tier.as_str()),
            Cell::new(format!("{:.2}", m.precision)),
            Cell::new(format!("{:.2}", m.recall)),
            Cell::new(format!("{:.2}", m.f1)),
            Cell::new(m.support),
        ]);
    }

    println!("\n{table}");
    println!(
        "Accuracy: {:.2} ({} train / {} test)\n",
        eval.metrics.accuracy, eval.train_samples, eval.test_samples
    );
    tracing::debug!("\n{}", format_classification_report(&eval.metrics));
}
