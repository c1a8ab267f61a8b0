//! Model-ready dataset with joint train/test splitting

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::preprocess::ColumnMedians;

/// Feature matrix plus the two row-aligned targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDataset {
    /// Rows of [location, tech_specs, brand, condition]
    pub features: Vec<Vec<f64>>,
    /// Regression target
    pub prices: Vec<f64>,
    /// Classification target as indices into `deal_labels`
    pub deals: Vec<usize>,
    pub feature_names: Vec<String>,
    /// Sorted, deduplicated label table
    pub deal_labels: Vec<String>,
    /// Full-table medians used during imputation
    pub medians: ColumnMedians,
}

/// Train/test split result
pub struct SplitListings {
    pub train: ListingDataset,
    pub test: ListingDataset,
}

impl ListingDataset {
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows selected by index, all three arrays in the same order
    pub fn subset(&self, indices: &[usize]) -> ListingDataset {
        ListingDataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            prices: indices.iter().map(|&i| self.prices[i]).collect(),
            deals: indices.iter().map(|&i| self.deals[i]).collect(),
            feature_names: self.feature_names.clone(),
            deal_labels: self.deal_labels.clone(),
            medians: self.medians,
        }
    }

    /// Seeded shuffle split.
    ///
    /// One permutation is drawn and applied to the features and both
    /// targets together, so row correspondence survives the shuffle.
    /// The test set takes `ceil(test_ratio * n)` rows.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> SplitListings {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = ((n as f64) * test_ratio).ceil() as usize;
        let (test_indices, train_indices) = indices.split_at(test_size.min(n));

        SplitListings {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        }
    }

    /// Classification target as f64 class indices for tree fitting
    pub fn deals_as_f64(&self) -> Vec<f64> {
        self.deals.iter().map(|&d| d as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset(n: usize) -> ListingDataset {
        // Each row carries its original index so alignment is checkable
        ListingDataset {
            features: (0..n).map(|i| vec![i as f64; 4]).collect(),
            prices: (0..n).map(|i| 1000.0 + i as f64).collect(),
            deals: (0..n).map(|i| i % 2).collect(),
            feature_names: vec![
                "location".to_string(),
                "tech_specs".to_string(),
                "brand".to_string(),
                "condition".to_string(),
            ],
            deal_labels: vec!["bad_deal".to_string(), "good_deal".to_string()],
            medians: ColumnMedians {
                location: 0.0,
                tech_specs: 0.0,
                brand: 0.0,
                condition: 0.5,
                price: 0.0,
            },
        }
    }

    #[test]
    fn test_split_sizes() {
        let dataset = sample_dataset(10);
        let split = dataset.random_split(0.2, 42);
        assert_eq!(split.test.n_samples(), 2);
        assert_eq!(split.train.n_samples(), 8);

        // ceil rounding on awkward sizes
        let dataset = sample_dataset(11);
        let split = dataset.random_split(0.2, 42);
        assert_eq!(split.test.n_samples(), 3);
        assert_eq!(split.train.n_samples(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let dataset = sample_dataset(25);
        let split = dataset.random_split(0.2, 42);

        let mut seen: Vec<usize> = split
            .train
            .features
            .iter()
            .chain(split.test.features.iter())
            .map(|row| row[0] as usize)
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_preserves_row_alignment() {
        let dataset = sample_dataset(40);
        let split = dataset.random_split(0.25, 7);

        for part in [&split.train, &split.test] {
            for i in 0..part.n_samples() {
                let original = part.features[i][0] as usize;
                assert_eq!(part.prices[i], 1000.0 + original as f64);
                assert_eq!(part.deals[i], original % 2);
            }
        }
    }

    #[test]
    fn test_split_is_seeded() {
        let dataset = sample_dataset(30);

        let a = dataset.random_split(0.2, 42);
        let b = dataset.random_split(0.2, 42);
        assert_eq!(a.test.features, b.test.features);
        assert_eq!(a.train.prices, b.train.prices);

        let c = dataset.random_split(0.2, 43);
        assert_ne!(a.test.features, c.test.features);
    }

    #[test]
    fn test_deals_as_f64() {
        let dataset = sample_dataset(4);
        assert_eq!(dataset.deals_as_f64(), vec![0.0, 1.0, 0.0, 1.0]);
    }
}
