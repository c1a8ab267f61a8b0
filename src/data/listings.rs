//! CSV loading for device listings

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Feature columns fed to the models, in matrix order
pub const FEATURE_COLUMNS: [&str; 4] = ["location", "tech_specs", "brand", "condition"];

/// Columns a listings file must provide; extra columns are ignored
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "location",
    "tech_specs",
    "brand",
    "condition",
    "price",
    "deal_classification",
];

/// One listing row as read from disk, before preprocessing
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub location: Option<f64>,
    pub tech_specs: Option<f64>,
    pub brand: Option<f64>,
    pub condition: Option<String>,
    pub price: Option<f64>,
    pub deal_classification: String,
}

/// Load listings from a CSV file
pub fn load_listings<P: AsRef<Path>>(path: P) -> Result<Vec<RawListing>> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open listings file {:?}", path))?
        .finish()
        .with_context(|| format!("failed to parse listings file {:?}", path))?;

    listings_from_dataframe(&df)
}

/// Convert a loaded frame into typed listing rows
pub fn listings_from_dataframe(df: &DataFrame) -> Result<Vec<RawListing>> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            bail!("listings file is missing required column '{}'", name);
        }
    }

    let location = numeric_column(df, "location")?;
    let tech_specs = numeric_column(df, "tech_specs")?;
    let brand = numeric_column(df, "brand")?;
    let price = numeric_column(df, "price")?;
    let condition = text_column(df, "condition")?;
    let deal = text_column(df, "deal_classification")?;

    let mut listings = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let deal_classification = match deal.get(i) {
            Some(label) => label.to_string(),
            None => bail!("row {}: missing deal_classification label", i),
        };

        listings.push(RawListing {
            location: location.get(i),
            tech_specs: tech_specs.get(i),
            brand: brand.get(i),
            condition: condition.get(i).map(|s| s.to_string()),
            price: price.get(i),
            deal_classification,
        });
    }

    Ok(listings)
}

/// Numeric column as f64, accepting integer input. Text input is rejected
/// rather than silently treated as missing.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df.column(name)?;
    if matches!(column.dtype(), DataType::String) {
        bail!("column '{}' must be numeric, found text values", name);
    }
    let column = column
        .cast(&DataType::Float64)
        .with_context(|| format!("column '{}' cannot be read as numeric", name))?;
    Ok(column.f64()?.clone())
}

fn text_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        file.write_all(content.as_bytes()).expect("write temp csv");
        file
    }

    #[test]
    fn test_load_listings_typed_rows() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price,deal_classification\n\
             1,55.5,3,good,720,good_deal\n\
             2,40,1,fair,310,bad_deal\n",
        );

        let listings = load_listings(file.path()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].location, Some(1.0));
        assert_eq!(listings[0].tech_specs, Some(55.5));
        assert_eq!(listings[0].condition.as_deref(), Some("good"));
        assert_eq!(listings[1].deal_classification, "bad_deal");
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price,deal_classification\n\
             ,55.5,3,good,720,good_deal\n\
             2,,1,,310,bad_deal\n",
        );

        let listings = load_listings(file.path()).unwrap();
        assert_eq!(listings[0].location, None);
        assert_eq!(listings[1].tech_specs, None);
        assert_eq!(listings[1].condition, None);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price,deal_classification,listed_at\n\
             1,55.5,3,good,720,good_deal,2024-05-01\n",
        );

        let listings = load_listings(file.path()).unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[test]
    fn test_missing_column_is_error() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price\n\
             1,55.5,3,good,720\n",
        );

        let err = load_listings(file.path()).unwrap_err();
        assert!(err.to_string().contains("deal_classification"));
    }

    #[test]
    fn test_text_in_numeric_column_is_error() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price,deal_classification\n\
             downtown,55.5,3,good,720,good_deal\n",
        );

        let err = load_listings(file.path()).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_missing_deal_label_is_error() {
        let file = write_fixture(
            "location,tech_specs,brand,condition,price,deal_classification\n\
             1,55.5,3,good,720,\n",
        );

        assert!(load_listings(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_listings("does/not/exist.csv").is_err());
    }
}
