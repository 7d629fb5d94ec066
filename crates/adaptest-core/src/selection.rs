//! Next-question selection policy.
//!
//! The first question cascades MEDIUM → LOW → HIGH. Every later question is
//! drawn only from the predicted tier; an empty predicted tier ends the
//! session instead of falling back to another tier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Question, Tier};
use crate::pool::QuestionPools;

/// Tier order tried for the very first question.
pub const INITIAL_TIER_ORDER: [Tier; 3] = [Tier::Medium, Tier::Low, Tier::High];

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tier", rename_all = "snake_case")]
pub enum EndReason {
    /// The bank had no questions at all.
    EmptyBank,
    /// Every pool was drained.
    BankExhausted,
    /// The predictor chose a tier with nothing left.
    PredictedTierExhausted(Tier),
    /// The predictor failed mid-session.
    PredictorFailed,
    /// The presenter could not show a question or read the answer.
    PresenterFailed,
    /// The test-taker quit.
    Aborted,
    /// Snapshot of a session that has not ended yet.
    InProgress,
}

impl EndReason {
    /// Sessions that ended normally have their records reported and may be saved.
    pub fn is_completed(self) -> bool {
        !matches!(
            self,
            EndReason::Aborted | EndReason::PredictorFailed | EndReason::PresenterFailed | EndReason::InProgress
        )
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::EmptyBank => write!(f, "question bank is empty"),
            EndReason::BankExhausted => write!(f, "all questions answered"),
            EndReason::PredictedTierExhausted(t) => {
                write!(f, "no {t} questions left for the predicted level")
            }
            EndReason::PredictorFailed => write!(f, "predictor failed"),
            EndReason::PresenterFailed => write!(f, "presentation failed"),
            EndReason::Aborted => write!(f, "aborted"),
            EndReason::InProgress => write!(f, "in progress"),
        }
    }
}

/// Pick the first question of a session.
///
/// Returns `None` only when every pool is empty.
pub fn select_initial(pools: &mut QuestionPools) -> Option<Question> {
    INITIAL_TIER_ORDER
        .iter()
        .find(|&&tier| !pools.is_empty(tier))
        .and_then(|&tier| pools.take_next(tier).ok())
}

/// Pick a question from the predicted tier, or `None` if it is empty.
pub fn select_next(pools: &mut QuestionPools, predicted: Tier) -> Option<Question> {
    if pools.is_empty(predicted) {
        return None;
    }
    pools.take_next(predicted).ok()
}
