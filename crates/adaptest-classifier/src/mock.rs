//! Scripted predictor for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use adaptest_core::error::PredictorError;
use adaptest_core::features::FeatureVector;
use adaptest_core::model::Tier;
use adaptest_core::traits::DifficultyPredictor;

/// A predictor that returns a fixed sequence of tiers.
///
/// Fails with [`PredictorError::Exhausted`] once the script runs out, unless
/// built with [`ScriptedPredictor::repeating`].
pub struct ScriptedPredictor {
    script: Mutex<VecDeque<Tier>>,
    repeat: Option<Tier>,
    call_count: AtomicUsize,
    last_features: Mutex<Option<FeatureVector>>,
}

impl ScriptedPredictor {
    /// Create a predictor that answers with `tiers` in order.
    pub fn new(tiers: impl IntoIterator<Item = Tier>) -> Self {
        Self {
            script: Mutex::new(tiers.into_iter().collect()),
            repeat: None,
            call_count: AtomicUsize::new(0),
            last_features: Mutex::new(None),
        }
    }

    /// Create a predictor that always answers `tier`.
    pub fn repeating(tier: Tier) -> Self {
        Self {
            repeat: Some(tier),
            ..Self::new(std::iter::empty())
        }
    }

    /// Number of calls made to this predictor.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Features passed on the most recent call.
    pub fn last_features(&self) -> Option<FeatureVector> {
        *self.last_features.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DifficultyPredictor for ScriptedPredictor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Tier, PredictorError> {
        let calls = self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_features.lock().unwrap_or_else(|e| e.into_inner()) = Some(*features);

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.or(self.repeat).ok_or(PredictorError::Exhausted(calls))
    }
}
