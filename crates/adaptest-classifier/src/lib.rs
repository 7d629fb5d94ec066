//! adaptest-classifier — Difficulty predictors and their training.
//!
//! Implements the `DifficultyPredictor` trait with a CART decision tree and a
//! fixed rule table, and provides the bootstrap dataset, historical-log
//! loader, training driver, and configuration needed to build one.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod history;
pub mod mock;
pub mod rules;
pub mod training;
pub mod tree;

pub use config::{create_predictor, load_config, AdaptestConfig, PredictorConfig, PreparedPredictor};
pub use error::TrainingError;
pub use tree::{DecisionTree, TreeParams};
