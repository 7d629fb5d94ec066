//! Core trait definitions for difficulty predictors and presenters.
//!
//! Predictors are implemented by the `adaptest-classifier` crate; the
//! terminal presenter lives in `adaptest-cli`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;
use crate::features::FeatureVector;
use crate::model::Tier;
use crate::report::SessionSummary;
use crate::session::{AnswerFeedback, PresentedQuestion};

// ---------------------------------------------------------------------------
// Difficulty predictor trait
// ---------------------------------------------------------------------------

/// Maps the feature vector of the latest answer to the next tier to serve.
///
/// Implementations must be pure for the duration of a session: no
/// retraining and no observable state change between calls.
pub trait DifficultyPredictor: Send + Sync {
    /// Human-readable predictor name (e.g. "decision_tree").
    fn name(&self) -> &str;

    /// Predict the next tier.
    fn predict(&self, features: &FeatureVector) -> Result<Tier, PredictorError>;
}

// ---------------------------------------------------------------------------
// Presenter trait
// ---------------------------------------------------------------------------

/// What the presentation layer reports back for a displayed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenterEvent {
    /// The test-taker picked the displayed choice at this index.
    Selected(usize),
    /// The test-taker quit. The unfinished session is discarded.
    Abort,
}

/// Trait for anything that can show questions and collect choices.
///
/// The presenter never judges correctness; it only reports an index.
#[async_trait]
pub trait Presenter: Send {
    /// Display a question and wait for the test-taker's choice.
    async fn ask(&mut self, question: &PresentedQuestion) -> anyhow::Result<PresenterEvent>;

    /// Show the result of the last answer.
    fn on_answer(&mut self, feedback: &AnswerFeedback);

    /// A reported index was rejected; the same question stays on screen.
    fn on_invalid_choice(&mut self, _index: usize, _available: usize) {}

    /// The session reached a terminal state.
    fn on_finish(&mut self, summary: &SessionSummary);
}
