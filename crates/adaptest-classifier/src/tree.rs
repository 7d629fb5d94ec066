//! CART decision tree over answer features.
//!
//! Splits minimise weighted Gini impurity. Thresholds sit midway between
//! adjacent distinct feature values and a sample goes left when its value is
//! `<=` the threshold. Ties between candidate splits keep the first one found
//! (lowest feature index, then lowest threshold), and ties between classes at
//! a leaf resolve to the lowest tier, so fitting is deterministic.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptest_core::error::PredictorError;
use adaptest_core::features::{FeatureVector, TrainingExample, FEATURE_COUNT};
use adaptest_core::model::Tier;
use adaptest_core::traits::DifficultyPredictor;

use crate::error::TrainingError;

const CLASSES: usize = 3;

/// Per-class weights, indexed by tier level.
pub type ClassWeights = [f64; CLASSES];

/// Growth limits for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples than this become leaves.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
}

fn default_min_samples_split() -> usize {
    2
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: default_min_samples_split(),
        }
    }
}

/// A node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        tier: Tier,
        /// Weighted class totals of the training samples that reached this leaf.
        distribution: ClassWeights,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.leaves() + right.leaves(),
        }
    }
}

/// Decision tree classifier with balanced class weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    params: TreeParams,
    class_weights: ClassWeights,
    root: Option<Node>,
}

fn class_index(tier: Tier) -> usize {
    usize::from(tier.level())
}

/// Balanced class weights: `n_samples / (n_classes * n_class)`.
///
/// Classes absent from `labels` get weight 0 and do not count toward
/// `n_classes`.
pub fn balanced_class_weights(labels: impl IntoIterator<Item = Tier>) -> ClassWeights {
    let mut counts = [0usize; CLASSES];
    for tier in labels {
        counts[class_index(tier)] += 1;
    }
    let n: usize = counts.iter().sum();
    let present = counts.iter().filter(|&&c| c > 0).count();

    let mut weights = [0.0; CLASSES];
    for (w, &count) in weights.iter_mut().zip(&counts) {
        if count > 0 {
            *w = n as f64 / (present as f64 * count as f64);
        }
    }
    weights
}

fn gini(dist: &ClassWeights) -> f64 {
    let total: f64 = dist.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - dist.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

fn majority(dist: &ClassWeights) -> Tier {
    let mut best = 0;
    for class in 1..CLASSES {
        if dist[class] > dist[best] {
            best = class;
        }
    }
    Tier::ALL[best]
}

struct Builder<'a> {
    features: Vec<[f64; FEATURE_COUNT]>,
    labels: Vec<usize>,
    weights: Vec<f64>,
    params: &'a TreeParams,
}

impl Builder<'_> {
    fn distribution(&self, idx: &[usize]) -> ClassWeights {
        let mut dist = [0.0; CLASSES];
        for &i in idx {
            dist[self.labels[i]] += self.weights[i];
        }
        dist
    }

    fn build(&self, idx: Vec<usize>, depth: usize) -> Node {
        let dist = self.distribution(&idx);
        let leaf = Node::Leaf {
            tier: majority(&dist),
            distribution: dist,
        };

        let pure = dist.iter().filter(|&&w| w > 0.0).count() <= 1;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || idx.len() < self.params.min_samples_split.max(2) {
            return leaf;
        }

        let Some((feature, threshold)) = self.best_split(&idx, &dist) else {
            return leaf;
        };
        let (left, right): (Vec<usize>, Vec<usize>) = idx
            .iter()
            .partition(|&&i| self.features[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    fn best_split(&self, idx: &[usize], parent: &ClassWeights) -> Option<(usize, f64)> {
        let total: f64 = parent.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut best: Option<(f64, usize, f64)> = None;

        for feature in 0..FEATURE_COUNT {
            let mut sorted = idx.to_vec();
            sorted.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left = [0.0; CLASSES];
            for pair in sorted.windows(2) {
                let (i, j) = (pair[0], pair[1]);
                left[self.labels[i]] += self.weights[i];

                let here = self.features[i][feature];
                let next = self.features[j][feature];
                if next <= here {
                    continue;
                }

                let mut right = *parent;
                for (r, l) in right.iter_mut().zip(&left) {
                    *r = (*r - l).max(0.0);
                }
                let left_total: f64 = left.iter().sum();
                let right_total = (total - left_total).max(0.0);
                let impurity = (left_total * gini(&left) + right_total * gini(&right)) / total;

                let mut threshold = (here + next) / 2.0;
                if threshold >= next {
                    threshold = here;
                }

                let better = match best {
                    None => true,
                    Some((score, ..)) => impurity < score - 1e-12,
                };
                if better {
                    best = Some((impurity, feature, threshold));
                }
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }
}

impl DecisionTree {
    /// An unfitted tree.
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            class_weights: [0.0; CLASSES],
            root: None,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Class weights computed by the last fit.
    pub fn class_weights(&self) -> ClassWeights {
        self.class_weights
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaves)
    }

    /// Fit the tree, replacing any previous structure.
    pub fn fit(&mut self, examples: &[TrainingExample]) -> Result<(), TrainingError> {
        if examples.is_empty() {
            return Err(TrainingError::NoExamples);
        }
        if let Some(bad) = examples.iter().position(|e| !e.features.is_finite()) {
            return Err(TrainingError::NonFiniteFeatures(bad));
        }

        let class_weights = balanced_class_weights(examples.iter().map(|e| e.label));
        let builder = Builder {
            features: examples.iter().map(|e| e.features.0).collect(),
            labels: examples.iter().map(|e| class_index(e.label)).collect(),
            weights: examples
                .iter()
                .map(|e| class_weights[class_index(e.label)])
                .collect(),
            params: &self.params,
        };
        let root = builder.build((0..examples.len()).collect(), 0);

        self.class_weights = class_weights;
        self.root = Some(root);
        tracing::debug!(
            "fitted decision tree on {} examples: depth {}, {} leaves",
            examples.len(),
            self.depth(),
            self.leaf_count()
        );
        Ok(())
    }

    /// Predict every vector in order.
    pub fn predict_all(&self, features: &[FeatureVector]) -> Result<Vec<Tier>, PredictorError> {
        features.iter().map(|f| self.predict(f)).collect()
    }

    /// Save the fitted tree as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize decision tree")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write model to {}", path.display()))?;
        Ok(())
    }

    /// Load a tree saved with [`DecisionTree::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model from {}", path.display()))?;
        let tree: DecisionTree = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse model JSON: {}", path.display()))?;
        anyhow::ensure!(tree.is_fitted(), "model file {} holds an unfitted tree", path.display());
        Ok(tree)
    }
}

impl DifficultyPredictor for DecisionTree {
    fn name(&self) -> &str {
        "decision_tree"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Tier, PredictorError> {
        let mut node = self.root.as_ref().ok_or(PredictorError::NotTrained)?;
        if !features.is_finite() {
            return Err(PredictorError::InvalidFeatures(format!("{:?}", features.0)));
        }
        loop {
            match node {
                Node::Leaf { tier, .. } => return Ok(*tier),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.0.get(*feature).copied().ok_or_else(|| {
                        PredictorError::InvalidFeatures(format!("no feature at index {feature}"))
                    })?;
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_examples;

    fn example(values: [f64; 3], label: Tier) -> TrainingExample {
        TrainingExample {
            features: FeatureVector(values),
            label,
        }
    }

    #[test]
    fn unfitted_tree_refuses_to_predict() {
        let tree = DecisionTree::new(TreeParams::default());
        let err = tree.predict(&FeatureVector([10.0, 1.0, 1.0])).unwrap_err();
        assert_eq!(err, PredictorError::NotTrained);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn empty_training_set() {
        let mut tree = DecisionTree::new(TreeParams::default());
        assert!(matches!(tree.fit(&[]), Err(TrainingError::NoExamples)));
    }

    #[test]
    fn non_finite_features_rejected() {
        let mut tree = DecisionTree::new(TreeParams::default());
        let data = [example([1.0, 0.0, 1.0], Tier::Low), example([f64::NAN, 0.0, 1.0], Tier::High)];
        assert!(matches!(tree.fit(&data), Err(TrainingError::NonFiniteFeatures(1))));
    }

    #[test]
    fn balanced_weights() {
        let w = balanced_class_weights([Tier::Low, Tier::Low, Tier::Low, Tier::High]);
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(w[1], 0.0);
        assert!((w[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn learns_bootstrap_set_exactly() {
        let data = bootstrap_examples();
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&data).unwrap();

        for ex in &data {
            assert_eq!(tree.predict(&ex.features).unwrap(), ex.label, "{:?}", ex.features);
        }
        assert!(tree.depth() >= 1);
    }

    #[test]
    fn single_feature_threshold() {
        let data = [
            example([0.0, 0.0, 1.0], Tier::Low),
            example([0.0, 1.0, 1.0], Tier::Low),
            example([10.0, 0.0, 1.0], Tier::High),
            example([10.0, 2.0, 1.0], Tier::High),
        ];
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&data).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&FeatureVector([4.0, 1.0, 0.5])).unwrap(), Tier::Low);
        assert_eq!(tree.predict(&FeatureVector([6.0, 1.0, 0.5])).unwrap(), Tier::High);
    }

    #[test]
    fn depth_limit_gives_single_leaf() {
        let params = TreeParams {
            max_depth: Some(0),
            ..Default::default()
        };
        let mut tree = DecisionTree::new(params);
        tree.fit(&bootstrap_examples()).unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.leaf_count(), 1);
        // Balanced weights equalise class totals; the tie goes to the lowest tier.
        assert_eq!(tree.predict(&FeatureVector([10.0, 2.0, 1.0])).unwrap(), Tier::Low);
    }

    #[test]
    fn min_samples_split_stops_growth() {
        let params = TreeParams {
            max_depth: None,
            min_samples_split: 100,
        };
        let mut tree = DecisionTree::new(params);
        tree.fit(&bootstrap_examples()).unwrap();
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn invalid_features_at_predict() {
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&bootstrap_examples()).unwrap();
        let err = tree.predict(&FeatureVector([f64::INFINITY, 1.0, 1.0])).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidFeatures(_)));
    }

    #[test]
    fn fitting_is_deterministic() {
        let data = bootstrap_examples();
        let mut a = DecisionTree::new(TreeParams::default());
        let mut b = DecisionTree::new(TreeParams::default());
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn save_and_load() {
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(&bootstrap_examples()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("tree.json");
        tree.save_json(&path).unwrap();

        let loaded = DecisionTree::load_json(&path).unwrap();
        assert_eq!(loaded, tree);
        assert_eq!(loaded.name(), "decision_tree");
    }

    #[test]
    fn load_rejects_unfitted_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        DecisionTree::new(TreeParams::default()).save_json(&path).unwrap();
        assert!(DecisionTree::load_json(&path).is_err());
    }
}
