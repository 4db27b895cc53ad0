//! The data source the spendings controller reads from and writes to.

use std::collections::BTreeSet;

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    month::YearMonth,
    spending::{SpendingId, SpendingRecord},
};

/// A source of spendings and categories.
///
/// Implementations run on a single-threaded runtime, so the returned futures
/// need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait SpendingsApi {
    /// Fetch the raw spending records dated within `month`.
    async fn fetch_spendings(&self, month: YearMonth) -> Result<Vec<SpendingRecord>, Error>;

    /// Fetch every category.
    async fn fetch_categories(&self) -> Result<Vec<Category>, Error>;

    /// Move every spending in `spending_ids` to `category_name`.
    ///
    /// Must be all-or-nothing: on error no spending has changed.
    async fn apply_bulk_category(
        &self,
        spending_ids: &BTreeSet<SpendingId>,
        category_name: &CategoryName,
    ) -> Result<(), Error>;

    /// Create a category named `name`.
    async fn create_category(&self, name: &CategoryName) -> Result<Category, Error>;

    /// Delete a category, moving its spendings to "Other".
    async fn delete_category(&self, category_id: CategoryId) -> Result<(), Error>;
}
