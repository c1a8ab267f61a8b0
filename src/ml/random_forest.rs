//! Random forest built from bootstrap-bagged decision trees

use super::decision_tree::{DecisionTree, Task, TreeConfig};
use super::SampleView;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unbounded)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Base random seed; tree i trains with seed + i
    pub seed: u64,
    pub task: Task,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
            task: Task::Regression,
        }
    }
}

/// Random forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the forest; `feature_names` are kept for importance reporting
    pub fn fit(&mut self, samples: SampleView<'_>, feature_names: &[String]) {
        self.feature_names = feature_names.to_vec();
        let n_samples = samples.n_samples();
        let n_features = samples.n_features();

        // Each tree derives its own RNG from the base seed, so the parallel
        // build is reproducible regardless of scheduling order.
        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = self.config.seed.wrapping_add(i as u64);
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: self.config.max_features,
                    seed: tree_seed,
                    task: self.config.task,
                };

                let mut tree = DecisionTree::new(tree_config);
                if self.config.bootstrap {
                    let indices = bootstrap_indices(n_samples, tree_seed);
                    tree.fit_on(samples, &indices);
                } else {
                    tree.fit(samples);
                }
                tree
            })
            .collect();

        self.trees = trees;

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Predict for a single row: mean of tree outputs (regression) or the
    /// class with the largest averaged distribution (classification)
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        match self.config.task {
            Task::Regression => {
                self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>()
                    / self.trees.len() as f64
            }
            Task::Classification { .. } => {
                let dist = self.predict_dist_one(row);
                let mut best = 0;
                for (i, &p) in dist.iter().enumerate().skip(1) {
                    if p > dist[best] {
                        best = i;
                    }
                }
                best as f64
            }
        }
    }

    /// Averaged class distribution for a single row (classification only)
    pub fn predict_dist_one(&self, row: &[f64]) -> Vec<f64> {
        let n_classes = match self.config.task {
            Task::Classification { n_classes } => n_classes,
            Task::Regression => return Vec::new(),
        };
        if self.trees.is_empty() {
            return vec![1.0 / n_classes as f64; n_classes];
        }

        let mut dist = vec![0.0; n_classes];
        for tree in &self.trees {
            for (k, p) in tree.predict_dist_one(row).iter().enumerate() {
                dist[k] += p;
            }
        }
        for p in &mut dist {
            *p /= self.trees.len() as f64;
        }
        dist
    }

    /// Predict for many rows
    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<f64> {
        features
            .par_iter()
            .map(|row| self.predict_one(row))
            .collect()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Feature names with importances, sorted descending
    pub fn feature_importance_ranking(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn task(&self) -> Task {
        self.config.task
    }
}

/// Sample `n` row indices with replacement
fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    fn regression_samples() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![i as f64 / 20.0, ((i * 7) % 13) as f64])
            .collect();
        let targets: Vec<f64> = features.iter().map(|row| 3.0 * row[0] + 5.0).collect();
        (features, targets)
    }

    #[test]
    fn test_forest_regression_recovers_signal() {
        let (features, targets) = regression_samples();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 20,
            ..Default::default()
        });
        forest.fit(SampleView::new(&features, &targets), &names(2));

        assert_eq!(forest.n_trees(), 20);

        let predictions = forest.predict(&features);
        let mse: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / targets.len() as f64;
        assert!(mse < 1.0, "mse={}", mse);

        // The informative feature should dominate the noise feature
        let ranking = forest.feature_importance_ranking();
        assert_eq!(ranking[0].0, "f0");
    }

    #[test]
    fn test_forest_classification_votes() {
        let features: Vec<Vec<f64>> = (0..120).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..120).map(|i| (i / 40) as f64).collect();

        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 30,
            task: Task::Classification { n_classes: 3 },
            ..Default::default()
        });
        forest.fit(SampleView::new(&features, &targets), &names(1));

        assert_eq!(forest.predict_one(&[10.0]), 0.0);
        assert_eq!(forest.predict_one(&[60.0]), 1.0);
        assert_eq!(forest.predict_one(&[110.0]), 2.0);

        let dist = forest.predict_dist_one(&[10.0]);
        assert_eq!(dist.len(), 3);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (features, targets) = regression_samples();
        let view = SampleView::new(&features, &targets);

        let mut a = RandomForest::new(ForestConfig {
            n_trees: 10,
            ..Default::default()
        });
        let mut b = RandomForest::new(ForestConfig {
            n_trees: 10,
            ..Default::default()
        });
        a.fit(view, &names(2));
        b.fit(view, &names(2));

        assert_eq!(a.predict(&features), b.predict(&features));
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_importances_sum_to_one() {
        let (features, targets) = regression_samples();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 10,
            ..Default::default()
        });
        forest.fit(SampleView::new(&features, &targets), &names(2));

        let sum: f64 = forest.feature_importances().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bootstrap_indices_in_range() {
        let indices = bootstrap_indices(50, 42);
        assert_eq!(indices.len(), 50);
        assert!(indices.iter().all(|&i| i < 50));
        assert_eq!(indices, bootstrap_indices(50, 42));
    }
}
