//! Trained predictor for single-device estimates

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

use crate::data::{encode_condition, ColumnMedians};
use crate::ml::RandomForest;
use crate::models::{ClassProbability, DeviceInput, EstimateResponse};

/// Price regressor and deal classifier bundled with the preprocessing
/// state they were trained under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealPredictor {
    regressor: RandomForest,
    classifier: RandomForest,
    feature_names: Vec<String>,
    deal_labels: Vec<String>,
    medians: ColumnMedians,
}

impl DealPredictor {
    pub fn new(
        regressor: RandomForest,
        classifier: RandomForest,
        feature_names: Vec<String>,
        deal_labels: Vec<String>,
        medians: ColumnMedians,
    ) -> Self {
        Self {
            regressor,
            classifier,
            feature_names,
            deal_labels,
            medians,
        }
    }

    /// Load a predictor saved with [`DealPredictor::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open model file {:?}", path))?;
        let predictor: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse model file {:?}", path))?;
        info!(
            "loaded predictor with {} + {} trees from {:?}",
            predictor.regressor.n_trees(),
            predictor.classifier.n_trees(),
            path
        );
        Ok(predictor)
    }

    /// Save the predictor as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create model directory {:?}", parent))?;
            }
        }
        let file =
            File::create(path).with_context(|| format!("failed to create model file {:?}", path))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("failed to write model file {:?}", path))?;
        info!("saved predictor to {:?}", path);
        Ok(())
    }

    /// Estimate price and deal class for one device.
    ///
    /// A condition outside the known labels is imputed with the
    /// training-time condition median, matching what preprocessing does
    /// to such values.
    pub fn estimate(&self, input: &DeviceInput) -> EstimateResponse {
        let row = self.feature_vector(input);

        let estimated_price = self.regressor.predict_one(&row);
        let dist = self.classifier.predict_dist_one(&row);
        let class_idx = self.classifier.predict_one(&row) as usize;

        let deal_class = self
            .deal_labels
            .get(class_idx)
            .cloned()
            .unwrap_or_default();
        let class_probabilities = self
            .deal_labels
            .iter()
            .zip(dist.iter())
            .map(|(label, &probability)| ClassProbability {
                label: label.clone(),
                probability,
            })
            .collect();

        EstimateResponse {
            estimated_price,
            deal_class,
            class_probabilities,
        }
    }

    fn feature_vector(&self, input: &DeviceInput) -> Vec<f64> {
        let condition =
            encode_condition(Some(input.condition.as_str())).unwrap_or(self.medians.condition);
        vec![input.location, input.tech_specs, input.brand, condition]
    }

    pub fn deal_labels(&self) -> &[String] {
        &self.deal_labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{SyntheticConfig, SyntheticGenerator};
    use crate::data::prepare_dataset;
    use crate::trainer::{train, TrainingConfig};

    fn trained_predictor() -> DealPredictor {
        let listings = SyntheticGenerator::new(SyntheticConfig {
            rows: 120,
            seed: 3,
            missing_rate: 0.0,
        })
        .generate();
        let dataset = prepare_dataset(&listings).unwrap();
        let (predictor, _) = train(
            &dataset,
            &TrainingConfig {
                n_trees: 15,
                ..Default::default()
            },
        )
        .unwrap();
        predictor
    }

    fn sample_input() -> DeviceInput {
        DeviceInput {
            location: 4.0,
            tech_specs: 55.0,
            brand: 3.0,
            condition: "good".to_string(),
        }
    }

    #[test]
    fn test_estimate_shape() {
        let predictor = trained_predictor();
        let estimate = predictor.estimate(&sample_input());

        assert!(estimate.estimated_price.is_finite());
        assert!(predictor
            .deal_labels()
            .contains(&estimate.deal_class));
        assert_eq!(estimate.class_probabilities.len(), 2);

        let total: f64 = estimate
            .class_probabilities
            .iter()
            .map(|c| c.probability)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_condition_is_imputed() {
        let predictor = trained_predictor();

        let mut worn = sample_input();
        worn.condition = "well-loved".to_string();
        let estimate = predictor.estimate(&worn);
        assert!(estimate.estimated_price.is_finite());

        // Imputation makes "unknown" behave exactly like the stored median
        let row = predictor.feature_vector(&worn);
        assert_eq!(row[3], predictor.medians.condition);
    }

    #[test]
    fn test_save_load_round_trip() {
        let predictor = trained_predictor();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        predictor.save(&path).unwrap();
        let reloaded = DealPredictor::load(&path).unwrap();

        let input = sample_input();
        let before = predictor.estimate(&input);
        let after = reloaded.estimate(&input);
        assert_eq!(before.estimated_price, after.estimated_price);
        assert_eq!(before.deal_class, after.deal_class);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(DealPredictor::load("no/such/model.json").is_err());
    }
}
