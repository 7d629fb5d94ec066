//! Configuration and predictor factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptest_core::traits::DifficultyPredictor;

use crate::rules::RuleTablePredictor;
use crate::training::{collect_examples, train, TrainingOptions, TrainingOutcome};
use crate::tree::{DecisionTree, TreeParams};

/// Which predictor to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictorConfig {
    DecisionTree {
        #[serde(default)]
        max_depth: Option<usize>,
        #[serde(default = "default_min_samples_split")]
        min_samples_split: usize,
    },
    RuleTable {
        #[serde(default)]
        slow_step_down: bool,
    },
}

fn default_min_samples_split() -> usize {
    2
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig::DecisionTree {
            max_depth: None,
            min_samples_split: default_min_samples_split(),
        }
    }
}

/// Top-level adaptest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptestConfig {
    /// Question bank file (`.json` or `.toml`).
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
    /// Where session logs are written and history is read from.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Classification report written after a held-out evaluation.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    /// Pre-trained model to load instead of training.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_min_eval_samples")]
    pub min_eval_samples: usize,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    /// Consecutive equal predictions that count as a determined ability.
    #[serde(default = "default_stability_window")]
    pub stability_window: usize,
    /// Include the built-in examples in training.
    #[serde(default = "default_true")]
    pub use_bootstrap: bool,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

fn default_question_bank() -> PathBuf {
    PathBuf::from("question-banks/general.json")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_report_path() -> PathBuf {
    PathBuf::from("training_predictions.log")
}
fn default_min_eval_samples() -> usize {
    5
}
fn default_test_size() -> f64 {
    0.2
}
fn default_split_seed() -> u64 {
    42
}
fn default_stability_window() -> usize {
    3
}
fn default_true() -> bool {
    true
}

impl Default for AdaptestConfig {
    fn default() -> Self {
        Self {
            question_bank: default_question_bank(),
            data_dir: default_data_dir(),
            report_path: default_report_path(),
            model_path: None,
            min_eval_samples: default_min_eval_samples(),
            test_size: default_test_size(),
            split_seed: default_split_seed(),
            stability_window: default_stability_window(),
            use_bootstrap: true,
            predictor: PredictorConfig::default(),
        }
    }
}

impl AdaptestConfig {
    /// Tree parameters, or the defaults when a rule table is configured.
    pub fn tree_params(&self) -> TreeParams {
        match self.predictor {
            PredictorConfig::DecisionTree {
                max_depth,
                min_samples_split,
            } => TreeParams {
                max_depth,
                min_samples_split,
            },
            PredictorConfig::RuleTable { .. } => TreeParams::default(),
        }
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            min_eval_samples: self.min_eval_samples,
            test_size: self.test_size,
            split_seed: self.split_seed,
            params: self.tree_params(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + len]).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptest.toml` in the current directory
/// 2. `~/.config/adaptest/config.toml`
///
/// `ADAPTEST_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<AdaptestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptestConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("adaptest.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AdaptestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AdaptestConfig::default(),
    };

    if let Ok(dir) = std::env::var("ADAPTEST_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    config.question_bank = resolve_path(&config.question_bank);
    config.data_dir = resolve_path(&config.data_dir);
    config.report_path = resolve_path(&config.report_path);
    config.model_path = config.model_path.as_deref().map(resolve_path);

    anyhow::ensure!(
        config.test_size > 0.0 && config.test_size < 1.0,
        "test_size must be between 0 and 1 (exclusive), got {}",
        config.test_size
    );
    anyhow::ensure!(config.stability_window > 0, "stability_window must be at least 1");

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptest"))
}

/// A ready predictor and, if one was trained, how.
pub struct PreparedPredictor {
    pub predictor: Arc<dyn DifficultyPredictor>,
    pub training: Option<TrainingOutcome>,
}

/// Build the configured predictor.
///
/// For a decision tree, `model` (or `config.model_path`) is loaded if given;
/// otherwise a tree is trained from the bootstrap set and the history in
/// `config.data_dir`.
pub fn create_predictor(config: &AdaptestConfig, model: Option<&Path>) -> Result<PreparedPredictor> {
    match &config.predictor {
        PredictorConfig::RuleTable { slow_step_down } => Ok(PreparedPredictor {
            predictor: Arc::new(RuleTablePredictor::new().with_slow_step_down(*slow_step_down)),
            training: None,
        }),
        PredictorConfig::DecisionTree { .. } => {
            if let Some(path) = model.or(config.model_path.as_deref()) {
                let tree = DecisionTree::load_json(path)?;
                tracing::info!("loaded decision tree from {}", path.display());
                return Ok(PreparedPredictor {
                    predictor: Arc::new(tree),
                    training: None,
                });
            }

            let collected = collect_examples(Some(&config.data_dir), config.use_bootstrap)?;
            let outcome = train(&collected.examples, &config.training_options())
                .context("failed to train difficulty predictor")?;
            Ok(PreparedPredictor {
                predictor: Arc::new(outcome.model.clone()),
                training: Some(outcome),
            })
        }
    }
}
