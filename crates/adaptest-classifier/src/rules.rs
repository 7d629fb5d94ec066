//! Fixed rule-table predictor.

use adaptest_core::error::PredictorError;
use adaptest_core::features::FeatureVector;
use adaptest_core::model::Tier;
use adaptest_core::traits::DifficultyPredictor;

/// Applies the training-label policy directly to live features.
///
/// A correct answer on MEDIUM or HIGH moves to HIGH, a correct LOW answer
/// moves to MEDIUM, and any miss drops to LOW. With `slow_step_down` set, a
/// correct answer in the slowest band is treated one tier lower.
#[derive(Debug, Clone, Default)]
pub struct RuleTablePredictor {
    slow_step_down: bool,
}

impl RuleTablePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_step_down(mut self, enabled: bool) -> Self {
        self.slow_step_down = enabled;
        self
    }
}

impl DifficultyPredictor for RuleTablePredictor {
    fn name(&self) -> &str {
        "rule_table"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Tier, PredictorError> {
        if !features.is_finite() {
            return Err(PredictorError::InvalidFeatures(format!("{:?}", features.0)));
        }
        let level = features.difficulty();
        let difficulty = Tier::from_level(level as u8)
            .filter(|_| level >= 0.0 && level.fract() == 0.0)
            .ok_or_else(|| PredictorError::InvalidFeatures(format!("difficulty level {level}")))?;

        let wc = features.weighted_correctness();
        if wc <= 0.0 {
            return Ok(Tier::Low);
        }

        let tier = if difficulty >= Tier::Medium {
            Tier::High
        } else {
            Tier::Medium
        };
        if self.slow_step_down && wc <= 5.0 {
            return Ok(Tier::from_level(tier.level() - 1).unwrap_or(Tier::Low));
        }
        Ok(tier)
    }
}
