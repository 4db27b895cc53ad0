//! The figures shown on the dashboard for one month.

use crate::{
    dashboard::aggregation::{CategoryTotal, DailyTotal, aggregate_by_category, aggregate_by_day},
    money::Money,
    spending::Spending,
};

/// Everything the dashboard displays, derived from one month of spendings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dashboard {
    /// Totals per category, largest first.
    pub category_totals: Vec<CategoryTotal>,
    /// Totals per day, earliest first.
    pub daily_totals: Vec<DailyTotal>,
    /// The sum of every spending.
    pub total_amount: Money,
    /// The number of spendings.
    pub transaction_count: usize,
    /// The number of distinct category labels.
    pub category_count: usize,
}

/// Derive the dashboard figures from `spendings`.
///
/// Pure: the same input always produces the same output.
pub fn derive_dashboard(spendings: &[Spending]) -> Dashboard {
    let category_totals = aggregate_by_category(spendings);
    let daily_totals = aggregate_by_day(spendings);

    Dashboard {
        category_count: category_totals.len(),
        total_amount: spendings.iter().map(|spending| spending.amount).sum(),
        transaction_count: spendings.len(),
        category_totals,
        daily_totals,
    }
}
