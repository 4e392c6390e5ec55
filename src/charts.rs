//! Chart.js payloads built from a declarative per-chart configuration table.
//!
//! Each payload carries the `{type, data, options}` object the browser hands to
//! `new Chart(...)`, plus the container/canvas identifiers and canvas size. Styling
//! lives in [`CHART_SPECS`]; the builders only contribute labels and series.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::SalesSummary;

pub const FILL_PALETTE: [&str; 7] = [
    "rgba(255, 99, 132, 0.5)",
    "rgba(255, 159, 64, 0.5)",
    "rgba(255, 205, 86, 0.5)",
    "rgba(75, 192, 192, 0.2)",
    "rgba(54, 162, 235, 0.2)",
    "rgba(153, 102, 255, 0.2)",
    "rgba(201, 203, 207, 0.2)",
];

pub const BORDER_PALETTE: [&str; 7] = [
    "rgb(255, 99, 132)",
    "rgb(255, 159, 64)",
    "rgb(255, 205, 86)",
    "rgb(75, 192, 192)",
    "rgb(54, 162, 235)",
    "rgb(153, 102, 255)",
    "rgb(201, 203, 207)",
];

const RED_LINE: &str = "rgba(255, 99, 132, 1)";
const RED_FILL: &str = "rgba(255, 99, 132, 0.2)";
const BLUE_LINE: &str = "rgba(54, 162, 235, 1)";
const BLUE_FILL: &str = "rgba(54, 162, 235, 0.5)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Doughnut,
    ComboBarLine,
    Line,
}

impl ChartKind {
    pub fn chart_js_type(self) -> &'static str {
        match self {
            Self::Bar | Self::ComboBarLine => "bar",
            Self::Pie => "pie",
            Self::Doughnut => "doughnut",
            Self::Line => "line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLabels {
    Hidden,
    /// Raw value above the bar.
    AboveBar,
    /// Percentage share centred in the slice.
    SliceShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: &'static str,
    pub container: &'static str,
    pub kind: ChartKind,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub subtitle_size: u32,
    pub subtitle_gap: u32,
    pub legend: Option<&'static str>,
    pub data_labels: DataLabels,
    pub value_axis_visible: bool,
    pub canvas: Option<(u32, u32)>,
}

pub static CHART_SPECS: [ChartSpec; 5] = [
    ChartSpec {
        id: "order-chart",
        container: "chart-container",
        kind: ChartKind::Bar,
        title: "Total Orders",
        subtitle: "Count of OrderID for every categories",
        subtitle_size: 11,
        subtitle_gap: 20,
        legend: None,
        data_labels: DataLabels::AboveBar,
        value_axis_visible: false,
        canvas: Some((800, 700)),
    },
    ChartSpec {
        id: "pie-chart",
        container: "pie-chart-container",
        kind: ChartKind::Pie,
        title: "Products Sold",
        subtitle: "Sum of products sold in every segment",
        subtitle_size: 11,
        subtitle_gap: 10,
        legend: Some("bottom"),
        data_labels: DataLabels::SliceShare,
        value_axis_visible: false,
        canvas: Some((800, 600)),
    },
    ChartSpec {
        id: "newcust-chart",
        container: "newcust-chart-container",
        kind: ChartKind::Doughnut,
        title: "New Customers",
        subtitle: "Discounts affect to reach a new customer",
        subtitle_size: 11,
        subtitle_gap: 10,
        legend: Some("bottom"),
        data_labels: DataLabels::Hidden,
        value_axis_visible: false,
        canvas: None,
    },
    ChartSpec {
        id: "subcatSalesProfit",
        container: "subcat-chart-container",
        kind: ChartKind::ComboBarLine,
        title: "Total Orders and Profit by Sub-Category",
        subtitle: "Count of Orders and Profit for each sub-category",
        subtitle_size: 11,
        subtitle_gap: 10,
        legend: Some("top"),
        data_labels: DataLabels::AboveBar,
        value_axis_visible: false,
        canvas: Some((2300, 800)),
    },
    ChartSpec {
        id: "timeSeriesChart",
        container: "timeseries-chart-container",
        kind: ChartKind::Line,
        title: "Time Series Chart of Profit",
        subtitle: "Time series chart actual vs predicted",
        subtitle_size: 13,
        subtitle_gap: 10,
        legend: Some("top"),
        data_labels: DataLabels::Hidden,
        value_axis_visible: true,
        canvas: Some((1850, 600)),
    },
];

pub fn chart_spec(id: &str) -> Option<&'static ChartSpec> {
    CHART_SPECS.iter().find(|spec| spec.id == id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub id: String,
    pub container: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub config: Value,
}

impl ChartPayload {
    fn from_spec(spec: &ChartSpec, data: Value, options: Value) -> Self {
        Self {
            id: spec.id.to_string(),
            container: spec.container.to_string(),
            width: spec.canvas.map(|(w, _)| w),
            height: spec.canvas.map(|(_, h)| h),
            config: json!({
                "type": spec.kind.chart_js_type(),
                "data": data,
                "options": options,
            }),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.config["data"]["labels"]
            .as_array()
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|label| label.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn series(&self, dataset_idx: usize) -> Vec<f64> {
        self.config["data"]["datasets"][dataset_idx]["data"]
            .as_array()
            .map(|values| values.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }
}

/// Every chart for one filtered view, in page order.
pub fn build_charts(summary: &SalesSummary) -> Vec<ChartPayload> {
    vec![
        orders_by_category_chart(summary),
        products_sold_chart(summary),
        new_customers_chart(),
        subcategory_chart(summary),
        profit_time_series_chart(),
    ]
}

pub fn orders_by_category_chart(summary: &SalesSummary) -> ChartPayload {
    let spec = &CHART_SPECS[0];
    let data = json!({
        "labels": summary.category_orders.labels(),
        "datasets": [{
            "label": "",
            "data": summary.category_orders.values(),
            "backgroundColor": FILL_PALETTE,
            "borderColor": BORDER_PALETTE,
            "borderWidth": 1,
            "borderRadius": 10,
        }],
    });
    let mut options = base_options(spec);
    options["scales"] = json!({
        "y": {
            "grid": { "display": false },
            "ticks": { "beginAtZero": true, "display": spec.value_axis_visible },
        },
        "x": { "grid": { "display": false } },
    });
    ChartPayload::from_spec(spec, data, options)
}

pub fn products_sold_chart(summary: &SalesSummary) -> ChartPayload {
    let spec = &CHART_SPECS[1];
    let data = json!({
        "labels": summary.segment_quantity.labels(),
        "datasets": [{
            "label": "Sales by Category",
            "data": summary.segment_quantity.values(),
            "percentages": summary.segment_share_percentages(),
            "backgroundColor": FILL_PALETTE,
            "borderColor": BORDER_PALETTE,
            "borderWidth": 1,
        }],
    });
    ChartPayload::from_spec(spec, data, base_options(spec))
}

/// Static demo figures; not derived from the dataset.
pub fn new_customers_chart() -> ChartPayload {
    let spec = &CHART_SPECS[2];
    let data = json!({
        "labels": ["No Discount", "Low Discount", "Moderate Discount", "Big Discount"],
        "datasets": [{
            "label": "",
            "data": [18, 255, 68, 452],
            "backgroundColor": FILL_PALETTE,
            "borderColor": BORDER_PALETTE,
            "borderWidth": 1,
        }],
    });
    ChartPayload::from_spec(spec, data, base_options(spec))
}

pub fn subcategory_chart(summary: &SalesSummary) -> ChartPayload {
    let spec = &CHART_SPECS[3];
    let ranking = summary.subcategory_ranking();
    let labels: Vec<&str> = ranking.iter().map(|r| r.sub_category.as_str()).collect();
    let profits: Vec<f64> = ranking.iter().map(|r| r.profit).collect();
    let orders: Vec<f64> = ranking.iter().map(|r| r.orders).collect();

    let data = json!({
        "labels": labels,
        "datasets": [
            {
                "label": "Profit",
                "data": profits,
                "type": "line",
                "borderColor": RED_LINE,
                "backgroundColor": RED_FILL,
                "borderWidth": 2,
                "yAxisID": "y",
                "tension": 0.3,
            },
            {
                "label": "Total Orders",
                "data": orders,
                "backgroundColor": BLUE_FILL,
                "borderColor": BLUE_LINE,
                "borderWidth": 1,
                "borderRadius": 10,
                "yAxisID": "y1",
            },
        ],
    });
    let mut options = base_options(spec);
    options["scales"] = json!({
        "y": value_axis(spec, "left", "Total Orders"),
        "y1": value_axis(spec, "right", "Profit"),
        "x": { "grid": { "display": false } },
    });
    ChartPayload::from_spec(spec, data, options)
}

pub const ACTUAL_MONTHLY_PROFIT: [f64; 48] = [
    700.8582, 425.738, 1547.784, 1652.7844, 1337.9199, 1397.7249, 1621.0695, 2009.0801, 2990.1721,
    1507.2472, 3531.3333, 2843.8627, 546.9656, 572.3874, 1296.3157, 1589.5722, 1895.7726,
    1514.3524, 2085.184, 1814.2809, 3183.1298, 2007.706, 4040.9709, 3969.2926, 1240.4443,
    1205.0789, 1486.9192, 1574.3275, 2190.1513, 2285.7975, 1972.5572, 2145.7673, 3830.3873,
    1926.0226, 3966.7285, 4010.3565, 1442.3047, 1160.939, 3111.7735, 1578.7114, 2641.6122,
    2602.6133, 2863.2486, 2924.4128, 5050.2648, 3006.7287, 4669.7443, 5477.2403,
];

/// Fitted values for the 48 observed months followed by a 12-month forecast.
pub const PREDICTED_MONTHLY_PROFIT: [f64; 60] = [
    428.12686, 303.9629915, 1061.198661, 903.7216545, 1559.273003, 1341.169284, 1585.149766,
    1599.269826, 3025.3829, 1588.800327, 3625.507046, 3412.028498, 826.8945382, 702.7306697,
    1459.966339, 1302.489333, 1958.040681, 1739.936962, 1983.917444, 1998.037505, 3424.150578,
    1987.568005, 4024.274724, 3810.796177, 1225.662216, 1101.498348, 1858.734017, 1701.257011,
    2356.808359, 2138.704641, 2382.685122, 2396.805183, 3822.918256, 2386.335683, 4423.042402,
    4209.563855, 1624.429895, 1500.266026, 2257.501695, 2100.024689, 2755.576037, 2537.472319,
    2781.4528, 2795.572861, 4221.685934, 2785.103362, 4821.810081, 4608.331533, 2023.2, 1899.03,
    2656.27, 2498.79, 3154.34, 2936.24, 3180.22, 3194.34, 4620.45, 3183.87, 5220.58, 5007.1,
];

/// `"Jan 14"`, `"Feb 14"`, ... one label per month starting January 2014.
pub fn monthly_labels(count: usize) -> Vec<String> {
    let Some(start) = NaiveDate::from_ymd_opt(2014, 1, 1) else {
        return Vec::new();
    };
    (0..count as u32)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .map(|date| date.format("%b %y").to_string())
        .collect()
}

pub fn profit_time_series_chart() -> ChartPayload {
    let spec = &CHART_SPECS[4];
    let data = json!({
        "labels": monthly_labels(PREDICTED_MONTHLY_PROFIT.len()),
        "datasets": [
            {
                "label": "Actual",
                "data": ACTUAL_MONTHLY_PROFIT.as_slice(),
                "borderWidth": 2,
                "tension": 0.4,
                "fill": false,
                "borderColor": BLUE_LINE,
            },
            {
                "label": "Predicted",
                "data": PREDICTED_MONTHLY_PROFIT.as_slice(),
                "borderWidth": 2,
                "tension": 0.4,
                "fill": false,
                "borderColor": RED_LINE,
            },
        ],
    });
    let mut options = base_options(spec);
    options["scales"] = json!({
        "x": {
            "type": "category",
            "grid": { "display": false },
            "ticks": { "font": { "size": 11 } },
        },
        "y": { "display": spec.value_axis_visible, "grid": { "display": false } },
    });
    options["elements"] = json!({ "line": { "tension": 0.2 } });
    ChartPayload::from_spec(spec, data, options)
}

fn base_options(spec: &ChartSpec) -> Value {
    let legend = match spec.legend {
        Some(position) => json!({
            "display": true,
            "position": position,
            "labels": { "font": { "size": 10, "family": "Montserrat" } },
        }),
        None => json!({ "display": false }),
    };
    let mut plugins = json!({
        "legend": legend,
        "title": {
            "display": true,
            "text": spec.title,
            "font": { "size": 20, "family": "Arial" },
            "color": "black",
            "position": "top",
            "align": "center",
            "padding": { "top": 20, "bottom": 0 },
        },
        "subtitle": {
            "display": true,
            "text": spec.subtitle,
            "font": { "size": spec.subtitle_size, "style": "italic" },
            "position": "top",
            "align": "center",
            "padding": { "top": 0, "bottom": spec.subtitle_gap },
        },
    });

    match spec.data_labels {
        DataLabels::Hidden => plugins["datalabels"] = json!({ "display": false }),
        DataLabels::AboveBar => {
            plugins["datalabels"] = json!({
                "color": "black",
                "anchor": "end",
                "align": "top",
                "font": { "size": 11, "family": "Montserrat", "weight": "bold" },
            })
        }
        DataLabels::SliceShare => {
            plugins["datalabels"] = json!({
                "color": "black",
                "align": "center",
                "offset": -2,
                "font": { "size": 10, "family": "Montserrat", "weight": "bold" },
                "share": true,
            })
        }
    }

    json!({
        "plugins": plugins,
        "layout": { "padding": { "top": 0, "bottom": 0 } },
    })
}

fn value_axis(spec: &ChartSpec, position: &str, title: &str) -> Value {
    json!({
        "type": "linear",
        "display": spec.value_axis_visible,
        "position": position,
        "grid": { "display": false },
        "ticks": { "beginAtZero": true },
        "title": { "display": true, "text": title },
    })
}
