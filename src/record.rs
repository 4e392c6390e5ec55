//! Order-line records as they appear in the dataset file.

use serde::{Deserialize, Serialize};

pub const TABLE_HEADERS: [&str; 9] = [
    "Order ID",
    "Customer Name",
    "Segment",
    "Region",
    "Country",
    "Category",
    "Sub-Category",
    "Sales",
    "Profit",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "DiscountType")]
    pub discount_type: String,
}

impl SalesRecord {
    /// Cell text for each of [`TABLE_HEADERS`], in order.
    pub fn table_cells(&self) -> Vec<String> {
        vec![
            self.order_id.clone(),
            self.customer_name.clone(),
            self.segment.clone(),
            self.region.clone(),
            self.country.clone(),
            self.category.clone(),
            self.sub_category.clone(),
            self.sales.to_string(),
            self.profit.to_string(),
        ]
    }
}

#[cfg(test)]
pub(crate) fn sample_record(order_id: &str) -> SalesRecord {
    SalesRecord {
        order_id: order_id.to_string(),
        customer_name: "Claire Gute".to_string(),
        segment: "Consumer".to_string(),
        region: "South".to_string(),
        country: "United States".to_string(),
        category: "Furniture".to_string(),
        sub_category: "Bookcases".to_string(),
        sales: 261.96,
        profit: 41.9136,
        quantity: 2,
        year: 2016,
        discount_type: "No Discount".to_string(),
    }
}
