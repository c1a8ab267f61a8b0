//! Training pipeline
//!
//! Splits a prepared dataset, fits the price regressor and the deal
//! classifier, evaluates both on the held-out rows, and ranks feature
//! importances.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::ListingDataset;
use crate::ml::{
    classification_report, ClassificationReport, ForestConfig, Metrics, RandomForest, SampleView,
    Task,
};
use crate::predictor::DealPredictor;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Held-out fraction
    pub test_ratio: f64,
    /// Trees per forest
    pub n_trees: usize,
    /// Seed shared by the split and both forests
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            n_trees: 100,
            seed: 42,
        }
    }
}

/// Held-out regression metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionEval {
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Everything the pipeline reports after one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub regression: RegressionEval,
    pub classification: ClassificationReport,
    /// (feature name, importance), descending
    pub importance: Vec<(String, f64)>,
}

/// Run the full pipeline on a prepared dataset
pub fn train(
    dataset: &ListingDataset,
    config: &TrainingConfig,
) -> Result<(DealPredictor, TrainingReport)> {
    if dataset.n_samples() == 0 {
        bail!("dataset is empty");
    }
    if !(0.0..1.0).contains(&config.test_ratio) {
        bail!("test ratio must be in [0, 1), got {}", config.test_ratio);
    }

    let split = dataset.random_split(config.test_ratio, config.seed);
    info!(
        "split {} listings into {} train / {} test",
        dataset.n_samples(),
        split.train.n_samples(),
        split.test.n_samples()
    );
    if split.train.n_samples() == 0 {
        bail!("training split is empty; lower the test ratio");
    }

    let mut regressor = RandomForest::new(ForestConfig {
        n_trees: config.n_trees,
        seed: config.seed,
        task: Task::Regression,
        ..Default::default()
    });
    regressor.fit(
        SampleView::new(&split.train.features, &split.train.prices),
        &dataset.feature_names,
    );

    let price_predictions = regressor.predict(&split.test.features);
    let regression = RegressionEval {
        mse: Metrics::mse(&split.test.prices, &price_predictions),
        rmse: Metrics::rmse(&split.test.prices, &price_predictions),
        r2: Metrics::r2_score(&split.test.prices, &price_predictions),
    };
    info!(
        "regressor: mse={:.2} r2={:.2} over {} held-out rows",
        regression.mse,
        regression.r2,
        split.test.n_samples()
    );

    let train_deals = split.train.deals_as_f64();
    let mut classifier = RandomForest::new(ForestConfig {
        n_trees: config.n_trees,
        seed: config.seed,
        task: Task::Classification {
            n_classes: dataset.deal_labels.len(),
        },
        ..Default::default()
    });
    classifier.fit(
        SampleView::new(&split.train.features, &train_deals),
        &dataset.feature_names,
    );

    let deal_predictions: Vec<usize> = split
        .test
        .features
        .iter()
        .map(|row| classifier.predict_one(row) as usize)
        .collect();
    let classification =
        classification_report(&split.test.deals, &deal_predictions, &dataset.deal_labels);
    info!("classifier: accuracy={:.2}", classification.accuracy);

    let importance = regressor.feature_importance_ranking();

    let report = TrainingReport {
        train_rows: split.train.n_samples(),
        test_rows: split.test.n_samples(),
        regression,
        classification,
        importance: importance.clone(),
    };

    let predictor = DealPredictor::new(
        regressor,
        classifier,
        dataset.feature_names.clone(),
        dataset.deal_labels.clone(),
        dataset.medians,
    );

    Ok((predictor, report))
}
