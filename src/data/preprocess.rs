//! Listing preprocessing
//!
//! Ordinal-encodes the condition label and fills missing numeric cells with
//! per-column medians before anything is split or fitted.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::dataset::ListingDataset;
use super::listings::{RawListing, FEATURE_COLUMNS};

/// Ordinal code for a condition label; unrecognized values become missing
pub fn encode_condition(raw: Option<&str>) -> Option<f64> {
    match raw {
        Some("fair") => Some(0.0),
        Some("good") => Some(1.0),
        _ => None,
    }
}

/// Median of a sample; even counts average the two middle values
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Per-column medians, computed once over the whole table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnMedians {
    pub location: f64,
    pub tech_specs: f64,
    pub brand: f64,
    pub condition: f64,
    pub price: f64,
}

/// Build a model-ready dataset from raw listings.
///
/// Medians are computed over the entire table, train and test rows alike,
/// and then used to fill every missing cell, including the encoded
/// condition column and the price target.
pub fn prepare_dataset(rows: &[RawListing]) -> Result<ListingDataset> {
    if rows.is_empty() {
        bail!("no listings to prepare");
    }

    let conditions: Vec<Option<f64>> = rows
        .iter()
        .map(|r| encode_condition(r.condition.as_deref()))
        .collect();

    let medians = ColumnMedians {
        location: column_median(rows.iter().map(|r| r.location), "location")?,
        tech_specs: column_median(rows.iter().map(|r| r.tech_specs), "tech_specs")?,
        brand: column_median(rows.iter().map(|r| r.brand), "brand")?,
        condition: column_median(conditions.iter().copied(), "condition")?,
        price: column_median(rows.iter().map(|r| r.price), "price")?,
    };

    let features: Vec<Vec<f64>> = rows
        .iter()
        .zip(conditions.iter())
        .map(|(row, condition)| {
            vec![
                row.location.unwrap_or(medians.location),
                row.tech_specs.unwrap_or(medians.tech_specs),
                row.brand.unwrap_or(medians.brand),
                condition.unwrap_or(medians.condition),
            ]
        })
        .collect();

    let prices: Vec<f64> = rows
        .iter()
        .map(|r| r.price.unwrap_or(medians.price))
        .collect();

    let mut deal_labels: Vec<String> = rows
        .iter()
        .map(|r| r.deal_classification.clone())
        .collect();
    deal_labels.sort();
    deal_labels.dedup();

    let label_index: HashMap<&str, usize> = deal_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();
    let deals: Vec<usize> = rows
        .iter()
        .map(|r| label_index[r.deal_classification.as_str()])
        .collect();

    Ok(ListingDataset {
        features,
        prices,
        deals,
        feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        deal_labels,
        medians,
    })
}

fn column_median(cells: impl Iterator<Item = Option<f64>>, name: &str) -> Result<f64> {
    let present: Vec<f64> = cells.flatten().collect();
    match median(&present) {
        Some(m) => Ok(m),
        None => bail!("column '{}' has no usable values", name),
    }
}
