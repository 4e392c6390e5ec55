//! Dropdown criteria, record predicates and the top-N profit slice.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::SalesRecord;

pub const TOP_ROWS: usize = 15;

/// Dropdown state at the moment a view is requested. Empty values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, rename = "discountType")]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

impl FilterCriteria {
    pub fn year_constraint(&self) -> Option<&str> {
        constraint(&self.year)
    }

    pub fn discount_type_constraint(&self) -> Option<&str> {
        constraint(&self.discount_type)
    }

    pub fn region_constraint(&self) -> Option<&str> {
        constraint(&self.region)
    }

    pub fn segment_constraint(&self) -> Option<&str> {
        constraint(&self.segment)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.year_constraint().is_none()
            && self.discount_type_constraint().is_none()
            && self.region_constraint().is_none()
            && self.segment_constraint().is_none()
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.year_constraint()
            .map_or(true, |year| record.year.to_string() == year)
            && self
                .discount_type_constraint()
                .map_or(true, |discount| record.discount_type == discount)
            && self
                .region_constraint()
                .map_or(true, |region| contains_ignore_case(&record.region, region))
            && self
                .segment_constraint()
                .map_or(true, |segment| contains_ignore_case(&record.segment, segment))
    }
}

pub fn apply_filters(records: &[SalesRecord], criteria: &FilterCriteria) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

/// Highest-profit records first. Equal profits keep their input order.
pub fn rank_by_profit(records: &[SalesRecord]) -> Vec<SalesRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    sorted
}

/// [`rank_by_profit`] truncated to `n`.
pub fn top_by_profit(records: &[SalesRecord], n: usize) -> Vec<SalesRecord> {
    let mut sorted = rank_by_profit(records);
    sorted.truncate(n);
    sorted
}

/// Distinct values offered by each dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub discount_types: Vec<String>,
    pub regions: Vec<String>,
    pub segments: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        Self {
            years: years.into_iter().map(|year| year.to_string()).collect(),
            discount_types: distinct(records, |r| &r.discount_type),
            regions: distinct(records, |r| &r.region),
            segments: distinct(records, |r| &r.segment),
        }
    }
}

fn distinct(records: &[SalesRecord], field: impl Fn(&SalesRecord) -> &String) -> Vec<String> {
    records
        .iter()
        .map(|r| field(r).clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|raw| !raw.trim().is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
