//! Training driver: gather examples, evaluate on a held-out split, refit.

use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use adaptest_core::features::TrainingExample;
use adaptest_core::model::Tier;
use adaptest_core::statistics::ClassificationMetrics;

use crate::bootstrap::bootstrap_examples;
use crate::error::TrainingError;
use crate::history::{load_history_dir, LoadedHistory};
use crate::tree::{DecisionTree, TreeParams};

/// Knobs for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Below this many examples the held-out evaluation is skipped.
    pub min_eval_samples: usize,
    /// Fraction of examples held out for evaluation.
    pub test_size: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
    pub params: TreeParams,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            min_eval_samples: 5,
            test_size: 0.2,
            split_seed: 42,
            params: TreeParams::default(),
        }
    }
}

/// Held-out evaluation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub train_samples: usize,
    pub test_samples: usize,
    pub metrics: ClassificationMetrics,
}

/// A fitted model plus how it was produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Tree fitted on every example.
    pub model: DecisionTree,
    pub examples: usize,
    /// `None` when there were too few examples to hold any out.
    pub evaluation: Option<Evaluation>,
}

/// Shuffle with a fixed seed and hold out `ceil(test_size * n)` examples.
///
/// Both halves are non-empty whenever `examples.len() >= 2`.
pub fn train_test_split(
    examples: &[TrainingExample],
    test_size: f64,
    seed: u64,
) -> (Vec<TrainingExample>, Vec<TrainingExample>) {
    let n = examples.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let held_out = if n < 2 {
        n
    } else {
        (((n as f64) * test_size).ceil() as usize).clamp(1, n - 1)
    };

    let test = order[..held_out].iter().map(|&i| examples[i]).collect();
    let train = order[held_out..].iter().map(|&i| examples[i]).collect();
    (train, test)
}

/// Training examples and where they came from.
#[derive(Debug, Clone, Default)]
pub struct CollectedExamples {
    /// Bootstrap examples first, then history in file order.
    pub examples: Vec<TrainingExample>,
    /// How many of `examples` are built-in.
    pub bootstrap: usize,
    /// History counters; `examples` is moved out and left empty.
    pub history: LoadedHistory,
}

impl CollectedExamples {
    pub fn from_history(&self) -> usize {
        self.examples.len() - self.bootstrap
    }
}

/// Bootstrap examples (if enabled) followed by history from `history_dir`.
pub fn collect_examples(history_dir: Option<&Path>, use_bootstrap: bool) -> Result<CollectedExamples> {
    let mut examples = if use_bootstrap {
        bootstrap_examples()
    } else {
        Vec::new()
    };
    let bootstrap = examples.len();

    let mut history = match history_dir {
        Some(dir) => load_history_dir(dir)?,
        None => LoadedHistory::default(),
    };
    examples.append(&mut history.examples);

    Ok(CollectedExamples {
        examples,
        bootstrap,
        history,
    })
}

/// Fit a decision tree, evaluating on a held-out split first when there is
/// enough data. The returned model is always fitted on the full set.
pub fn train(examples: &[TrainingExample], options: &TrainingOptions) -> Result<TrainingOutcome, TrainingError> {
    if examples.is_empty() {
        return Err(TrainingError::NoExamples);
    }
    if !(options.test_size > 0.0 && options.test_size < 1.0) {
        return Err(TrainingError::InvalidTestSize(options.test_size));
    }

    let evaluation = if examples.len() >= options.min_eval_samples.max(2) {
        let (train_set, test_set) = train_test_split(examples, options.test_size, options.split_seed);
        let mut held_out = DecisionTree::new(options.params);
        held_out.fit(&train_set)?;

        let truth: Vec<Tier> = test_set.iter().map(|e| e.label).collect();
        let features: Vec<_> = test_set.iter().map(|e| e.features).collect();
        let predicted = held_out.predict_all(&features)?;
        let metrics = ClassificationMetrics::compute(&truth, &predicted);

        tracing::info!(
            "held-out accuracy: {:.3} ({} train / {} test)",
            metrics.accuracy,
            train_set.len(),
            test_set.len()
        );
        Some(Evaluation {
            train_samples: train_set.len(),
            test_samples: test_set.len(),
            metrics,
        })
    } else {
        tracing::info!(
            "not enough data for a held-out evaluation ({} < {}); fitting on all examples",
            examples.len(),
            options.min_eval_samples
        );
        None
    };

    let mut model = DecisionTree::new(options.params);
    model.fit(examples)?;

    Ok(TrainingOutcome {
        model,
        examples: examples.len(),
        evaluation,
    })
}
