//! Keyed totals over the filtered record set.

use serde::Serialize;

use crate::format::{format_fixed, round_half_up};
use crate::record::SalesRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedTotal {
    pub key: String,
    pub value: f64,
}

/// Totals keyed by a categorical field. Keys keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyedTotals {
    entries: Vec<KeyedTotal>,
}

impl KeyedTotals {
    pub fn add(&mut self, key: &str, amount: f64) {
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value += amount,
            None => self.entries.push(KeyedTotal {
                key: key.to_string(),
                value: amount,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.value).collect()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.value).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyedTotal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn count_by(records: &[SalesRecord], key: impl Fn(&SalesRecord) -> &str) -> KeyedTotals {
    sum_by(records, key, |_| 1.0)
}

pub fn sum_by(
    records: &[SalesRecord],
    key: impl Fn(&SalesRecord) -> &str,
    value: impl Fn(&SalesRecord) -> f64,
) -> KeyedTotals {
    let mut totals = KeyedTotals::default();
    for record in records {
        totals.add(key(record), value(record));
    }
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategoryRank {
    pub sub_category: String,
    pub orders: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    pub order_count: usize,
    pub total_profit: f64,
    pub total_sales: f64,
    pub category_orders: KeyedTotals,
    pub category_sales: KeyedTotals,
    pub segment_quantity: KeyedTotals,
    pub subcategory_orders: KeyedTotals,
    pub subcategory_profit: KeyedTotals,
}

impl SalesSummary {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        Self {
            order_count: records.len(),
            total_profit: records.iter().map(|r| r.profit).sum(),
            total_sales: records.iter().map(|r| r.sales).sum(),
            category_orders: count_by(records, |r| &r.category),
            category_sales: sum_by(records, |r| &r.category, |r| r.sales),
            segment_quantity: sum_by(records, |r| &r.segment, |r| r.quantity as f64),
            subcategory_orders: count_by(records, |r| &r.sub_category),
            subcategory_profit: sum_by(records, |r| &r.sub_category, |r| r.profit),
        }
    }

    pub fn rounded_profit(&self) -> i64 {
        round_half_up(self.total_profit)
    }

    /// Sub-categories by order count, most orders first; ties keep first-seen order.
    pub fn subcategory_ranking(&self) -> Vec<SubCategoryRank> {
        let mut ranking: Vec<SubCategoryRank> = self
            .subcategory_orders
            .iter()
            .map(|entry| SubCategoryRank {
                sub_category: entry.key.clone(),
                orders: entry.value,
                profit: self.subcategory_profit.get(&entry.key).unwrap_or(0.0),
            })
            .collect();
        ranking.sort_by(|a, b| b.orders.total_cmp(&a.orders));
        ranking
    }

    /// Each segment's share of the total quantity, two decimals.
    pub fn segment_share_percentages(&self) -> Vec<String> {
        let total = self.segment_quantity.total();
        self.segment_quantity
            .iter()
            .map(|entry| {
                let share = if total == 0.0 {
                    0.0
                } else {
                    entry.value / total * 100.0
                };
                format_fixed(share, 2)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo_dataset;
    use crate::record::sample_record;

    fn record(
        category: &str,
        sub: &str,
        segment: &str,
        sales: f64,
        profit: f64,
        qty: i64,
    ) -> SalesRecord {
        let mut r = sample_record("X");
        r.category = category.to_string();
        r.sub_category = sub.to_string();
        r.segment = segment.to_string();
        r.sales = sales;
        r.profit = profit;
        r.quantity = qty;
        r
    }

    #[test]
    fn keyed_totals_keep_first_seen_order() {
        let mut totals = KeyedTotals::default();
        totals.add("Technology", 1.0);
        totals.add("Furniture", 2.0);
        totals.add("Technology", 3.0);

        assert_eq!(totals.labels(), vec!["Technology", "Furniture"]);
        assert_eq!(totals.values(), vec![4.0, 2.0]);
        assert_eq!(totals.get("Furniture"), Some(2.0));
        assert_eq!(totals.get("Office Supplies"), None);
    }

    #[test]
    fn category_order_counts_sum_to_record_count() {
        let records = demo_dataset();
        let summary = SalesSummary::from_records(&records);
        assert_eq!(summary.category_orders.total() as usize, summary.order_count);
        assert_eq!(summary.subcategory_orders.total() as usize, records.len());
    }

    #[test]
    fn summary_totals_and_per_key_sums() {
        let records = vec![
            record("Furniture", "Chairs", "Consumer", 100.0, 10.0, 2),
            record("Technology", "Phones", "Corporate", 50.0, -4.5, 1),
            record("Furniture", "Tables", "Consumer", 25.0, 20.0, 3),
        ];
        let summary = SalesSummary::from_records(&records);

        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.total_sales, 175.0);
        assert_eq!(summary.total_profit, 25.5);
        assert_eq!(summary.rounded_profit(), 26);
        assert_eq!(summary.category_sales.get("Furniture"), Some(125.0));
        assert_eq!(summary.segment_quantity.get("Consumer"), Some(5.0));
        assert_eq!(summary.subcategory_profit.get("Phones"), Some(-4.5));
    }

    #[test]
    fn subcategory_ranking_sorts_by_orders_and_keeps_tie_order() {
        let records = vec![
            record("Furniture", "Chairs", "Consumer", 1.0, 1.0, 1),
            record("Furniture", "Tables", "Consumer", 1.0, 2.0, 1),
            record("Furniture", "Tables", "Consumer", 1.0, 3.0, 1),
            record("Technology", "Phones", "Consumer", 1.0, 4.0, 1),
        ];
        let ranking = SalesSummary::from_records(&records).subcategory_ranking();

        let names: Vec<_> = ranking.iter().map(|r| r.sub_category.as_str()).collect();
        assert_eq!(names, vec!["Tables", "Chairs", "Phones"]);
        assert_eq!(ranking[0].orders, 2.0);
        assert_eq!(ranking[0].profit, 5.0);
    }

    #[test]
    fn segment_shares_handle_empty_and_split_totals() {
        let empty = SalesSummary::from_records(&[]);
        assert!(empty.segment_share_percentages().is_empty());

        let records = vec![
            record("Furniture", "Chairs", "Consumer", 1.0, 1.0, 1),
            record("Furniture", "Chairs", "Corporate", 1.0, 1.0, 2),
        ];
        let shares = SalesSummary::from_records(&records).segment_share_percentages();
        assert_eq!(shares, vec!["33.33", "66.67"]);

        let zero = vec![record("Furniture", "Chairs", "Consumer", 1.0, 1.0, 0)];
        assert_eq!(
            SalesSummary::from_records(&zero).segment_share_percentages(),
            vec!["0.00"]
        );
    }
}
