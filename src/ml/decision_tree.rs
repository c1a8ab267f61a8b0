//! CART decision tree for regression and multi-class classification

use super::SampleView;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// What the tree predicts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Task {
    /// Leaf value = mean target, split criterion = variance reduction
    Regression,
    /// Leaf value = majority class index, split criterion = Gini impurity
    Classification { n_classes: usize },
}

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth (None = grow until pure or min-sample limits)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each child
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for feature-subset order
    pub seed: u64,
    pub task: Task,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
            task: Task::Regression,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature_idx: Option<usize>,
    pub threshold: Option<f64>,
    /// Mean target (regression) or majority class index (classification)
    pub value: f64,
    /// Class distribution at this node (classification only)
    pub class_probs: Option<Vec<f64>>,
    pub n_samples: usize,
    pub left: Option<Box<TreeNode>>,
    pub right: Option<Box<TreeNode>>,
    pub impurity: f64,
}

impl TreeNode {
    fn leaf(value: f64, n_samples: usize, impurity: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            class_probs: None,
            n_samples,
            left: None,
            right: None,
            impurity,
        }
    }

    fn leaf_classification(class_probs: Vec<f64>, n_samples: usize, impurity: f64) -> Self {
        let value = argmax(&class_probs) as f64;
        Self {
            feature_idx: None,
            threshold: None,
            value,
            class_probs: Some(class_probs),
            n_samples,
            left: None,
            right: None,
            impurity,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Index of the largest value; ties resolve to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Train on all rows of the view
    pub fn fit(&mut self, samples: SampleView<'_>) {
        let indices: Vec<usize> = (0..samples.n_samples()).collect();
        self.fit_on(samples, &indices);
    }

    /// Train on the rows selected by `indices` (repeats allowed, so a
    /// bootstrap sample is just a resampled index list)
    pub fn fit_on(&mut self, samples: SampleView<'_>, indices: &[usize]) {
        self.n_features = samples.n_features();
        self.feature_importances = vec![0.0; self.n_features];

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(samples, indices, 0, &mut rng));

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build_tree(
        &mut self,
        samples: SampleView<'_>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let targets: Vec<f64> = indices.iter().map(|&i| samples.targets[i]).collect();
        let impurity = self.impurity(&targets);

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < self.config.min_samples_split || impurity < 1e-12 {
            return self.create_leaf(&targets, impurity);
        }

        match self.find_best_split(samples, indices, rng) {
            Some((feature_idx, threshold, left_indices, right_indices, importance)) => {
                if left_indices.len() < self.config.min_samples_leaf
                    || right_indices.len() < self.config.min_samples_leaf
                {
                    return self.create_leaf(&targets, impurity);
                }

                self.feature_importances[feature_idx] += importance;

                let left = self.build_tree(samples, &left_indices, depth + 1, rng);
                let right = self.build_tree(samples, &right_indices, depth + 1, rng);

                TreeNode {
                    feature_idx: Some(feature_idx),
                    threshold: Some(threshold),
                    value: mean(&targets),
                    class_probs: None,
                    n_samples: n,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                    impurity,
                }
            }
            None => self.create_leaf(&targets, impurity),
        }
    }

    fn create_leaf(&self, targets: &[f64], impurity: f64) -> TreeNode {
        match self.config.task {
            Task::Regression => TreeNode::leaf(mean(targets), targets.len(), impurity),
            Task::Classification { n_classes } => {
                let probs = class_distribution(targets, n_classes);
                TreeNode::leaf_classification(probs, targets.len(), impurity)
            }
        }
    }

    fn impurity(&self, targets: &[f64]) -> f64 {
        match self.config.task {
            Task::Regression => variance(targets),
            Task::Classification { n_classes } => gini(targets, n_classes),
        }
    }

    fn find_best_split(
        &self,
        samples: SampleView<'_>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>, f64)> {
        let n_features = self.n_features;
        let max_features = self.config.max_features.unwrap_or(n_features).max(1);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let targets: Vec<f64> = indices.iter().map(|&i| samples.targets[i]).collect();
        let parent_impurity = self.impurity(&targets);

        let mut best_gain = 0.0;
        let mut best_split: Option<(usize, f64, Vec<usize>, Vec<usize>, f64)> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| samples.features[i][feature_idx])
                .collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| samples.features[i][feature_idx] <= threshold);

                if left_idx.is_empty() || right_idx.is_empty() {
                    continue;
                }

                let left_targets: Vec<f64> =
                    left_idx.iter().map(|&i| samples.targets[i]).collect();
                let right_targets: Vec<f64> =
                    right_idx.iter().map(|&i| samples.targets[i]).collect();

                let n_left = left_idx.len() as f64;
                let n_right = right_idx.len() as f64;
                let weighted = (n_left * self.impurity(&left_targets)
                    + n_right * self.impurity(&right_targets))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    let importance = gain * indices.len() as f64;
                    best_split = Some((feature_idx, threshold, left_idx, right_idx, importance));
                }
            }
        }

        best_split
    }

    /// Predict for a single row
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        match &self.root {
            Some(node) => Self::traverse(node, row).value,
            None => 0.0,
        }
    }

    /// Class distribution for a single row (classification only)
    pub fn predict_dist_one(&self, row: &[f64]) -> Vec<f64> {
        let n_classes = match self.config.task {
            Task::Classification { n_classes } => n_classes,
            Task::Regression => return Vec::new(),
        };
        match &self.root {
            Some(node) => Self::traverse(node, row)
                .class_probs
                .clone()
                .unwrap_or_else(|| vec![1.0 / n_classes as f64; n_classes]),
            None => vec![1.0 / n_classes as f64; n_classes],
        }
    }

    fn traverse<'t>(node: &'t TreeNode, row: &[f64]) -> &'t TreeNode {
        if node.is_leaf() {
            return node;
        }
        let feature_idx = node.feature_idx.expect("split node has feature");
        let threshold = node.threshold.expect("split node has threshold");
        let child = if row[feature_idx] <= threshold {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
        match child {
            Some(child) => Self::traverse(child, row),
            None => node,
        }
    }

    /// Predict for many rows
    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features.iter().map(|row| self.predict_one(row)).collect()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Gini impurity over class-index targets: 1 - Σ p_k²
fn gini(targets: &[f64], n_classes: usize) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let dist = class_distribution(targets, n_classes);
    1.0 - dist.iter().map(|p| p * p).sum::<f64>()
}

fn class_distribution(targets: &[f64], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes.max(1)];
    for &t in targets {
        let class = t as usize;
        if class < counts.len() {
            counts[class] += 1;
        }
    }
    let total = targets.len().max(1) as f64;
    counts.iter().map(|&c| c as f64 / total).collect()
}
