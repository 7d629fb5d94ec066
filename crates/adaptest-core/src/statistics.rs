//! Classification metrics for held-out predictor evaluation.
//!
//! Per-class precision, recall, F1 and support, plus accuracy and macro /
//! support-weighted averages. Classes with no predictions get a precision
//! of 0 rather than NaN.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Tier;

/// Metrics for a single class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

/// Averaged metrics across classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Full evaluation of a set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Metrics for every class present in either the truth or predictions.
    pub per_class: BTreeMap<Tier, ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    /// Total evaluated samples.
    pub samples: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Fraction of predictions equal to the truth.
pub fn accuracy(truth: &[Tier], predicted: &[Tier]) -> f64 {
    let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    ratio(hits, truth.len().min(predicted.len()))
}

impl ClassificationMetrics {
    /// Compute metrics from paired truth/prediction slices.
    ///
    /// Extra elements in the longer slice are ignored.
    pub fn compute(truth: &[Tier], predicted: &[Tier]) -> Self {
        let pairs: Vec<(Tier, Tier)> = truth.iter().copied().zip(predicted.iter().copied()).collect();
        let samples = pairs.len();

        let mut per_class = BTreeMap::new();
        for tier in Tier::ALL {
            let tp = pairs.iter().filter(|&&(t, p)| t == tier && p == tier).count();
            let actual = pairs.iter().filter(|&&(t, _)| t == tier).count();
            let guessed = pairs.iter().filter(|&&(_, p)| p == tier).count();
            if actual == 0 && guessed == 0 {
                continue;
            }
            let precision = ratio(tp, guessed);
            let recall = ratio(tp, actual);
            per_class.insert(
                tier,
                ClassMetrics {
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: actual,
                },
            );
        }

        let classes = per_class.len().max(1) as f64;
        let macro_avg = AveragedMetrics {
            precision: per_class.values().map(|m| m.precision).sum::<f64>() / classes,
            recall: per_class.values().map(|m| m.recall).sum::<f64>() / classes,
            f1: per_class.values().map(|m| m.f1).sum::<f64>() / classes,
            support: samples,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| -> f64 {
            if samples == 0 {
                return 0.0;
            }
            per_class
                .values()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / samples as f64
        };
        let weighted_avg = AveragedMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: samples,
        };

        let acc = ratio(pairs.iter().filter(|(t, p)| t == p).count(), samples);

        Self {
            per_class,
            accuracy: acc,
            macro_avg,
            weighted_avg,
            samples,
        }
    }
}
