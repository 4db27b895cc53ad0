//! Spending aggregation by category and by day.
//!
//! Both functions are pure and never fail: an empty slice produces an empty
//! result. Sums are accumulated in cents.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::Date;

use crate::{money::Money, spending::Spending};

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// The exact category label the spendings carry.
    pub name: String,
    /// The sum of the category's spendings.
    pub total: Money,
}

/// The total spent on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    /// The day of the month, starting at 1.
    pub day: u8,
    /// The sum of the day's spendings.
    pub total: Money,
    /// The calendar date the total belongs to.
    pub date: Date,
}

/// Sums spendings per category name.
///
/// Category names are compared exactly, so "Food" and "food " are different
/// groups.
///
/// # Returns
/// One entry per distinct category name, largest total first. Categories with
/// equal totals keep the order in which they first appear in `spendings`.
pub fn aggregate_by_category(spendings: &[Spending]) -> Vec<CategoryTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for spending in spendings {
        let position = *positions
            .entry(spending.category_name.as_str())
            .or_insert_with(|| {
                totals.push(CategoryTotal {
                    name: spending.category_name.clone(),
                    total: Money::ZERO,
                });
                totals.len() - 1
            });

        totals[position].total += spending.amount;
    }

    // `sort_by` is stable, which keeps first-seen order for ties.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

/// Sums spendings per calendar day.
///
/// Callers must only pass spendings from a single month.
///
/// # Returns
/// One entry per distinct date, earliest first. Days without spendings are
/// not filled in.
pub fn aggregate_by_day(spendings: &[Spending]) -> Vec<DailyTotal> {
    let mut totals: BTreeMap<Date, Money> = BTreeMap::new();

    for spending in spendings {
        *totals.entry(spending.date).or_default() += spending.amount;
    }

    totals
        .into_iter()
        .map(|(date, total)| DailyTotal {
            day: date.day(),
            total,
            date,
        })
        .collect()
}
