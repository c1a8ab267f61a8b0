//! Tree-ensemble models and evaluation metrics

pub mod decision_tree;
pub mod metrics;
pub mod random_forest;

pub use decision_tree::{DecisionTree, Task, TreeConfig};
pub use metrics::{classification_report, ClassificationReport, Metrics};
pub use random_forest::{ForestConfig, RandomForest};

/// Borrowed view over aligned feature rows and one target column.
///
/// Regression targets are raw values; classification targets are class
/// indices stored as `f64`.
#[derive(Clone, Copy)]
pub struct SampleView<'a> {
    pub features: &'a [Vec<f64>],
    pub targets: &'a [f64],
}

impl<'a> SampleView<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64]) -> Self {
        assert_eq!(
            features.len(),
            targets.len(),
            "features and targets must be row-aligned"
        );
        Self { features, targets }
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map(|row| row.len()).unwrap_or(0)
    }
}
