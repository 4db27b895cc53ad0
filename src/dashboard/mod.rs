//! Dashboard module
//!
//! Derives the per-category and per-day totals shown for a month and turns
//! them into chart data.

mod aggregation;
mod charts;
mod summary;

pub use aggregation::{CategoryTotal, DailyTotal, aggregate_by_category, aggregate_by_day};
pub use charts::{
    ChartPalette, ChartPoint, DEFAULT_PALETTE, DashboardChart, category_bar_chart,
    daily_spendings_chart, dashboard_charts, distribution_chart, to_chart_series,
};
pub use summary::{Dashboard, derive_dashboard};
