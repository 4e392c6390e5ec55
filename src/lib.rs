//! Sales dashboard core crate.
//!
//! Loads order-line records from a JSON dataset, filters them by dropdown criteria,
//! aggregates the result and serves it as an HTML dashboard with Chart.js payloads.

mod aggregate;
mod charts;
mod config;
mod dashboard;
mod dataset;
mod filter;
mod format;
mod observability;
mod pipeline;
mod record;
mod toggle;

pub use aggregate::{count_by, sum_by, KeyedTotal, KeyedTotals, SalesSummary, SubCategoryRank};
pub use charts::{
    build_charts, chart_spec, monthly_labels, new_customers_chart, orders_by_category_chart,
    products_sold_chart, profit_time_series_chart, subcategory_chart, ChartKind, ChartPayload,
    ChartSpec, DataLabels, ACTUAL_MONTHLY_PROFIT, BORDER_PALETTE, CHART_SPECS, FILL_PALETTE,
    PREDICTED_MONTHLY_PROFIT,
};
pub use config::{
    ConfigError, DatasetChoice, ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_DATASET_PATH,
};
pub use dashboard::{dashboard_router, render_dashboard_html, DashboardPage, DashboardQuery};
pub use dataset::{demo_dataset, DatasetError, DatasetSource, InMemoryDataset, JsonFileDataset};
pub use filter::{
    apply_filters, rank_by_profit, top_by_profit, FilterCriteria, FilterOptions, TOP_ROWS,
};
pub use format::{
    format_fixed, format_grouped_decimal, format_grouped_integer, format_revenue, round_half_up,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_dataset_check, log_dataset_selected,
    logging_config_from_env, LogFormat, LoggingConfig, LoggingInitError,
};
pub use pipeline::{
    build_view, ApplyOutcome, DashboardController, DashboardView, RenderSequencer, RenderTicket,
    ANONYMOUS_CLIENT,
};
pub use record::{SalesRecord, TABLE_HEADERS};
pub use toggle::{ButtonGroup, Card, CardDeck, GroupKind, ToggleError, ToggleState, WILDCARD};
