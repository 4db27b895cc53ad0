//! Spendings: the dated, categorized expenses everything else is derived from.

mod db;
mod domain;

pub use db::{
    create_spending_table, get_spendings_in_month, insert_spending, update_spending_categories,
};
pub use domain::{Spending, SpendingId, SpendingRecord, validate_records};
