//! Training error types.

use thiserror::Error;

use adaptest_core::error::PredictorError;

/// Errors that can occur while fitting a predictor.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Nothing to learn from (bootstrap disabled and no usable history).
    #[error("no training examples available")]
    NoExamples,

    /// An example carried NaN or infinite features.
    #[error("training example {0} has non-finite features")]
    NonFiniteFeatures(usize),

    /// The held-out fraction must lie strictly between 0 and 1.
    #[error("test size must be between 0 and 1 (exclusive), got {0}")]
    InvalidTestSize(f64),

    /// The model failed while scoring the held-out set.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] PredictorError),
}
