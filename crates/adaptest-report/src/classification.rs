//! Plain-text classification report.
//!
//! Column layout follows the familiar `precision / recall / f1-score /
//! support` table, followed by accuracy and macro and weighted averages.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use adaptest_core::statistics::{AveragedMetrics, ClassificationMetrics};

fn row(out: &mut String, label: &str, precision: f64, recall: f64, f1: f64, support: usize) {
    let _ = writeln!(
        out,
        "{label:>12} {precision:>9.2} {recall:>9.2} {f1:>9.2} {support:>9}"
    );
}

fn avg_row(out: &mut String, label: &str, avg: &AveragedMetrics) {
    row(out, label, avg.precision, avg.recall, avg.f1, avg.support);
}

/// Render metrics as a text table.
pub fn format_classification_report(metrics: &ClassificationMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12} {:>9} {:>9} {:>9} {:>9}\n",
        "", "precision", "recall", "f1-score", "support"
    );

    for (tier, m) in &metrics.per_class {
        row(&mut out, tier.as_str(), m.precision, m.recall, m.f1, m.support);
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
        "accuracy", "", "", metrics.accuracy, metrics.samples
    );
    avg_row(&mut out, "macro avg", &metrics.macro_avg);
    avg_row(&mut out, "weighted avg", &metrics.weighted_avg);
    out
}

/// Write the report, preceded by a timestamped header, to `path`.
pub fn write_classification_report(metrics: &ClassificationMetrics, path: &Path) -> Result<()> {
    let mut content = format!(
        "Classification report ({} held-out samples, {})\n\n",
        metrics.samples,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    content.push_str(&format_classification_report(metrics));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write classification report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptest_core::model::Tier::*;

    fn metrics() -> ClassificationMetrics {
        ClassificationMetrics::compute(&[Low, Low, High, High], &[Low, High, High, High])
    }

    #[test]
    fn table_layout() {
        let text = format_classification_report(&metrics());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("precision"));
        assert!(lines[0].ends_with("support"));
        assert!(text.contains("         low      1.00      0.50      0.67         2"));
        assert!(text.contains("        high      0.67      1.00      0.80         2"));
        assert!(!text.contains("medium"));
        assert!(text.contains("    accuracy                          0.75         4"));
        assert!(text.contains("   macro avg"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("training_predictions.log");
        write_classification_report(&metrics(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Classification report (4 held-out samples"));
        assert!(content.contains("f1-score"));
    }
}
