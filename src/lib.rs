//! Spendings is a library for reviewing a month of spendings.
//!
//! It totals spendings by category and by day, tracks which spendings are
//! selected, and moves selected spendings to another category in bulk. Bulk
//! changes are shown straight away and undone by reloading from the data
//! source if saving fails.
//!
//! The data source is abstracted by [SpendingsApi]. [SqliteSpendingsApi] is a
//! SQLite implementation used by the `spendings` command line tool.

#![warn(missing_docs)]

mod api;
mod category;
mod controller;
mod dashboard;
mod db;
mod logging;
mod money;
mod month;
mod selection;
mod spending;
mod state;

#[cfg(test)]
mod test_utils;

pub use api::SpendingsApi;
pub use category::{
    Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY, manageable_categories,
};
pub use controller::{BulkEditOutcome, LoadOutcome, SpendingsController};
pub use dashboard::{
    CategoryTotal, ChartPalette, ChartPoint, DEFAULT_PALETTE, DailyTotal, Dashboard,
    DashboardChart, aggregate_by_category, aggregate_by_day, category_bar_chart,
    daily_spendings_chart, dashboard_charts, derive_dashboard, distribution_chart,
    to_chart_series,
};
pub use db::{ImportSummary, SqliteSpendingsApi, initialize as initialize_db};
pub use logging::setup_logging;
pub use money::{Money, format_currency, share_label};
pub use month::{YearMonth, format_day_label, format_row_date, parse_date};
pub use selection::Selection;
pub use spending::{Spending, SpendingId, SpendingRecord, validate_records};
pub use state::{BulkEditRequest, LoadStatus, LoadTicket, Notice, SpendingRow, SpendingsState};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Spendings or categories could not be loaded from the data source.
    #[error("could not load spendings: {0}")]
    FetchFailure(String),

    /// The data source did not save a bulk category change. Nothing was
    /// changed at the source.
    #[error("could not update categories: {0}")]
    BulkUpdateFailure(String),

    /// A bulk edit was requested with no spendings or no category.
    #[error("a bulk edit needs at least one spending and a category")]
    InvalidRequest,

    /// A month string was not in the `YYYY-MM` format.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// An amount was not a decimal number with at most two decimal places.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A date string was not in the `YYYY-MM-DD` format.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A spending record was missing a required field or had an invalid
    /// value.
    #[error("invalid spending: {0}")]
    InvalidSpending(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The specified category name already exists in the database.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// No category has the given name.
    #[error("there is no category named \"{0}\"")]
    UnknownCategory(String),

    /// Tried to delete the "Other" category, which must always exist.
    #[error("the \"Other\" category cannot be deleted")]
    DeleteOtherCategory,

    /// There is no "Other" category to move spendings to.
    #[error("the \"Other\" category is missing")]
    MissingOtherCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The specified spending ID already exists in the database.
    #[error("the spending ID \"{0}\" already exists")]
    DuplicateSpendingId(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while reading or writing JSON
    #[error("could not read or write JSON: {0}")]
    JSONError(String),

    /// A chart palette was created without any colors.
    #[error("a chart palette needs at least one color")]
    EmptyPalette,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONError(value.to_string())
    }
}
