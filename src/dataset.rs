//! Dataset sources. Every load is a full reload; nothing is cached between calls.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::record::SalesRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset load task for {source_label} did not complete: {source}")]
    Task {
        source_label: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

pub trait DatasetSource: Send + Sync + 'static {
    fn load(&self) -> Result<Vec<SalesRecord>, DatasetError>;

    /// Short label used in logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct JsonFileDataset {
    path: PathBuf,
}

impl JsonFileDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for JsonFileDataset {
    fn load(&self) -> Result<Vec<SalesRecord>, DatasetError> {
        let bytes = fs::read(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<SalesRecord> =
            serde_json::from_slice(&bytes).map_err(|source| DatasetError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            component = "dataset",
            event = "dataset.loaded",
            path = %self.path.display(),
            records = records.len()
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[derive(Clone)]
pub struct InMemoryDataset {
    inner: Arc<RwLock<Vec<SalesRecord>>>,
}

impl InMemoryDataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_dataset())
    }

    pub fn replace_records(&self, records: Vec<SalesRecord>) {
        let mut guard = self
            .inner
            .write()
            .expect("in-memory dataset lock should not be poisoned");
        *guard = records;
    }
}

impl DatasetSource for InMemoryDataset {
    fn load(&self) -> Result<Vec<SalesRecord>, DatasetError> {
        Ok(self
            .inner
            .read()
            .expect("in-memory dataset lock should not be poisoned")
            .clone())
    }

    fn describe(&self) -> String {
        "in_memory".to_string()
    }
}

// (order, customer, segment, region, category, sub-category, sales, profit, qty, year, discount)
type DemoRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    i64,
    i32,
    &'static str,
);

#[rustfmt::skip]
const DEMO_ROWS: [DemoRow; 20] = [
    ("CA-2014-152156", "Claire Gute", "Consumer", "South", "Furniture", "Bookcases", 261.96, 41.9136, 2, 2014, "No Discount"),
    ("CA-2014-152157", "Claire Gute", "Consumer", "South", "Furniture", "Chairs", 731.94, 219.582, 3, 2014, "No Discount"),
    ("CA-2014-138688", "Darrin Van Huff", "Corporate", "West", "Office Supplies", "Labels", 14.62, 6.8714, 2, 2014, "No Discount"),
    ("US-2014-108966", "Sean O'Donnell", "Consumer", "South", "Furniture", "Tables", 957.5775, -383.031, 5, 2014, "Big Discount"),
    ("US-2015-108967", "Sean O'Donnell", "Consumer", "South", "Office Supplies", "Storage", 22.368, 2.5164, 2, 2015, "Low Discount"),
    ("CA-2015-115812", "Brosina Hoffman", "Consumer", "West", "Furniture", "Furnishings", 48.86, 14.1694, 7, 2015, "No Discount"),
    ("CA-2015-115813", "Brosina Hoffman", "Consumer", "West", "Technology", "Phones", 907.152, 90.7152, 6, 2015, "Low Discount"),
    ("CA-2015-114412", "Andrew Allen", "Consumer", "South", "Office Supplies", "Paper", 15.552, 5.4432, 3, 2015, "Low Discount"),
    ("CA-2016-161389", "Irene Maddox", "Consumer", "West", "Office Supplies", "Binders", 407.976, 132.5922, 3, 2016, "Low Discount"),
    ("US-2016-118983", "Harold Pawlan", "Home Office", "Central", "Office Supplies", "Appliances", 68.81, -123.858, 5, 2016, "Big Discount"),
    ("US-2016-118984", "Harold Pawlan", "Home Office", "Central", "Office Supplies", "Binders", 2.544, -3.816, 3, 2016, "Big Discount"),
    ("CA-2016-105893", "Pete Kriz", "Consumer", "Central", "Furniture", "Furnishings", 665.88, 13.3176, 6, 2016, "No Discount"),
    ("CA-2016-167164", "Alejandro Grove", "Consumer", "West", "Office Supplies", "Storage", 55.5, 9.99, 2, 2016, "No Discount"),
    ("CA-2017-143336", "Zuschuss Donatelli", "Consumer", "West", "Technology", "Accessories", 8.56, 2.4824, 2, 2017, "No Discount"),
    ("CA-2017-137330", "Ken Black", "Corporate", "Central", "Technology", "Phones", 1097.544, 123.4737, 7, 2017, "Moderate Discount"),
    ("CA-2017-156909", "Sandra Flanagan", "Consumer", "East", "Furniture", "Chairs", 71.372, -1.0196, 2, 2017, "Moderate Discount"),
    ("CA-2017-106320", "Emily Burns", "Consumer", "East", "Technology", "Machines", 1044.63, 240.2649, 3, 2017, "No Discount"),
    ("CA-2017-121755", "Eric Hoffmann", "Home Office", "East", "Technology", "Copiers", 1199.976, 374.9925, 3, 2017, "Moderate Discount"),
    ("CA-2017-121756", "Eric Hoffmann", "Home Office", "East", "Office Supplies", "Art", 7.28, 1.9656, 4, 2017, "No Discount"),
    ("US-2017-150630", "Tracy Blumstein", "Corporate", "East", "Furniture", "Tables", 1706.184, 85.3092, 9, 2017, "Moderate Discount"),
];

/// Built-in dataset covering every region, segment, category and discount type.
pub fn demo_dataset() -> Vec<SalesRecord> {
    DEMO_ROWS
        .iter()
        .map(|row| {
            let (order_id, customer, segment, region, category, sub_category) =
                (row.0, row.1, row.2, row.3, row.4, row.5);
            SalesRecord {
                order_id: order_id.to_string(),
                customer_name: customer.to_string(),
                segment: segment.to_string(),
                region: region.to_string(),
                country: "United States".to_string(),
                category: category.to_string(),
                sub_category: sub_category.to_string(),
                sales: row.6,
                profit: row.7,
                quantity: row.8,
                year: row.9,
                discount_type: row.10.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_dataset_covers_every_region_and_discount_type() {
        let records = demo_dataset();
        let regions: HashSet<_> = records.iter().map(|r| r.region.as_str()).collect();
        let discounts: HashSet<_> = records.iter().map(|r| r.discount_type.as_str()).collect();
        let segments: HashSet<_> = records.iter().map(|r| r.segment.as_str()).collect();

        assert_eq!(regions.len(), 4);
        assert_eq!(discounts.len(), 4);
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn in_memory_source_reflects_replaced_records() {
        let source = InMemoryDataset::demo();
        assert_eq!(source.load().expect("load").len(), 20);

        source.replace_records(Vec::new());
        assert!(source.load().expect("load").is_empty());
    }

    #[test]
    fn missing_file_reports_io_error_with_path() {
        let source = JsonFileDataset::new("/definitely/not/here/dataset.json");
        let err = source.load().expect_err("missing file should fail");
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here/dataset.json"));
    }
}
