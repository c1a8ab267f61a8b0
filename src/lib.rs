//! Pricecast - used-device price estimation and deal classification
//!
//! This library provides:
//! - CSV loading and preprocessing of device listings
//! - A seeded joint train/test split over the feature matrix and both targets
//! - Random-forest price regression and deal classification with held-out
//!   evaluation and feature importances
//! - A serializable predictor for single-device estimates
//!
//! # Example
//!
//! ```no_run
//! use pricecast::data::{load_listings, prepare_dataset};
//! use pricecast::trainer::{train, TrainingConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let listings = load_listings("data/ED_dataset.csv")?;
//! let dataset = prepare_dataset(&listings)?;
//! let (predictor, report) = train(&dataset, &TrainingConfig::default())?;
//! println!("R-squared: {:.2}", report.regression.r2);
//! predictor.save("models/pricecast.json")?;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod ml;
pub mod models;
pub mod predictor;
pub mod trainer;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;

// Re-export commonly used types
pub use data::{load_listings, prepare_dataset, ListingDataset, RawListing};
pub use ml::{ClassificationReport, ForestConfig, RandomForest};
pub use predictor::DealPredictor;
pub use trainer::{train, TrainingConfig, TrainingReport};
