//! The `adaptest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("adaptest.toml").exists() {
        println!("adaptest.toml already exists, skipping.");
    } else {
        std::fs::write("adaptest.toml", SAMPLE_CONFIG)?;
        println!("Created adaptest.toml");
    }

    std::fs::create_dir_all("question-banks")?;
    let example_path = std::path::Path::new("question-banks/example.json");
    if example_path.exists() {
        println!("question-banks/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created question-banks/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Add questions to question-banks/example.json");
    println!("  2. Run: adaptest validate --bank question-banks/example.json");
    println!("  3. Run: adaptest run --bank question-banks/example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptest configuration

question_bank = "question-banks/example.json"
data_dir = "${HOME}/.local/share/adaptest"
report_path = "training_predictions.log"

# Held-out evaluation runs once at least this many examples exist.
min_eval_samples = 5
test_size = 0.2
split_seed = 42

# Equal consecutive predictions needed before a session is saved.
stability_window = 3
use_bootstrap = true

[predictor]
type = "decision_tree"
min_samples_split = 2
"#;

const EXAMPLE_BANK: &str = r#"{
  "low": [
    {"id": 1, "difficulty": "low", "question": "What is 2 + 2?", "answer": 4, "answer choices": [3, 4, 5, 6]},
    {"id": 2, "difficulty": "low", "question": "How many days are in a week?", "answer": 7, "answer choices": [5, 6, 7, 8]}
  ],
  "medium": [
    {"id": 1, "difficulty": "medium", "question": "What is 12 * 12?", "answer": 144, "answer choices": [124, 132, 144, 156]},
    {"id": 2, "difficulty": "medium", "question": "What is the capital of Australia?", "answer": "Canberra",
     "answer choices": ["Sydney", "Melbourne", "Canberra", "Perth"]}
  ],
  "high": [
    {"id": 1, "difficulty": "high", "question": "What is 17 * 23?", "answer": 391, "answer choices": [381, 391, 401, 371]},
    {"id": 2, "difficulty": "high", "question": "What is 7 factorial?", "answer": 5040, "answer choices": [720, 4320, 5040, 40320]}
  ]
}
"#;
