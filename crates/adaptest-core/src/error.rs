//! Engine error types.
//!
//! Defined in `adaptest-core` so the session driver can tell a setup
//! failure (predictor) apart from a caller mistake without string matching.

use thiserror::Error;

use crate::model::Tier;

/// A draw was attempted on a tier with no questions left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no questions left in the {0} pool")]
pub struct EmptyPoolError(pub Tier);

/// Errors raised by a difficulty predictor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    /// The model has no fitted structure.
    #[error("predictor has not been trained")]
    NotTrained,

    /// The feature vector contained a NaN or infinite value.
    #[error("invalid feature vector: {0}")]
    InvalidFeatures(String),

    /// A scripted predictor ran out of answers.
    #[error("scripted predictor exhausted after {0} calls")]
    Exhausted(usize),
}

/// Raw answer data that cannot be turned into features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("time_taken must be finite and non-negative, got {0}")]
    InvalidTime(f64),
}

/// Errors that can occur while driving a quiz session.
#[derive(Debug, Error)]
pub enum QuizError {
    /// An answer was reported while no question is on screen.
    #[error("no question is currently being shown")]
    NoActiveQuestion,

    /// The reported choice index is outside the displayed choices.
    #[error("choice {index} is out of range, {available} choices shown")]
    InvalidChoice { index: usize, available: usize },

    /// The session has already reached a terminal state.
    #[error("session already finished")]
    SessionFinished,

    /// The answer could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The predictor failed. Treated as a setup failure: the session stops.
    #[error("predictor failed: {0}")]
    Predictor(#[from] PredictorError),
}

impl QuizError {
    /// Returns `true` if the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, QuizError::Predictor(_) | QuizError::SessionFinished)
    }
}
