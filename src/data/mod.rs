//! Data loading, preprocessing, and splitting modules

pub mod dataset;
pub mod listings;
pub mod preprocess;
pub mod synthetic;

// Re-export commonly used types
pub use dataset::{ListingDataset, SplitListings};
pub use listings::{load_listings, RawListing, FEATURE_COLUMNS, REQUIRED_COLUMNS};
pub use preprocess::{encode_condition, prepare_dataset, ColumnMedians};
pub use synthetic::{SyntheticConfig, SyntheticGenerator};
