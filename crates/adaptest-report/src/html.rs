//! HTML session results page.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use adaptest_core::model::Tier;
use adaptest_core::report::{SessionLog, SessionSummary, TierTally};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate a results page for one test-taker's session log.
///
/// The score is replayed from the log. When a [`SessionSummary`] is
/// available its end reason and determined tier are shown as well.
pub fn generate_html(test_taker: &str, log: &SessionLog, summary: Option<&SessionSummary>) -> String {
    let board = log.scoreboard();
    let generated: DateTime<Utc> = summary.map_or_else(Utc::now, |s| s.finished_at);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>adaptest results: {}</title>\n",
        html_escape(test_taker)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Test results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Test-taker: <strong>{}</strong> | {} questions | {}</p>\n",
        html_escape(test_taker),
        log.records.len(),
        generated.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Correct</th><td>{} / {}</td></tr>\n",
        board.correct_count, board.answered
    ));
    html.push_str(&format!(
        "<tr><th>Score</th><td>{} / {}</td></tr>\n",
        board.score, board.possible_score
    ));
    if let Some(s) = summary {
        let determined = s.determined.map_or("undetermined", Tier::as_str);
        html.push_str(&format!("<tr><th>Ability</th><td>{determined}</td></tr>\n"));
        html.push_str(&format!(
            "<tr><th>Ended</th><td>{}</td></tr>\n",
            html_escape(&s.end_reason.to_string())
        ));
        html.push_str(&format!(
            "<tr><th>Predictor</th><td>{}</td></tr>\n",
            html_escape(&s.predictor)
        ));
    }
    html.push_str("</tbody></table>\n");

    let tally = log.tier_breakdown();
    if !tally.is_empty() {
        html.push_str(&generate_bar_chart(&tally));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Difficulty</th><th>Predicted</th><th>Answer</th><th>Result</th><th>Time (s)</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (i, r) in log.records.iter().enumerate() {
        let class = if r.result.is_correct() { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{}</td><td>{:.2}</td></tr>\n",
            i + 1,
            r.question_id,
            r.difficulty,
            r.predicted_difficulty,
            html_escape(&r.selected_answer.to_string()),
            r.result,
            r.time_taken
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(&serde_json::to_string_pretty(log).unwrap_or_default()));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write a results page to a file.
pub fn write_html_report(
    test_taker: &str,
    log: &SessionLog,
    summary: Option<&SessionSummary>,
    path: &Path,
) -> Result<()> {
    let html = generate_html(test_taker, log, summary);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of per-tier accuracy.
fn generate_bar_chart(tally: &std::collections::BTreeMap<Tier, TierTally>) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = tally.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 100,
        total_height
    );

    for (i, (tier, t)) in tally.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = if t.answered == 0 {
            0.0
        } else {
            f64::from(t.correct) / f64::from(t.answered)
        };
        let width = (rate * max_width as f64) as usize;

        let color = match tier {
            Tier::Low => "#60a5fa",
            Tier::Medium => "#eab308",
            Tier::High => "#22c55e",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            tier
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{} / {}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            t.correct,
            t.answered
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
table.summary { width: auto; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
