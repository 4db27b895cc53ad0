//! Coordinates loading spendings and bulk category changes against a
//! [SpendingsApi].
//!
//! The controller runs on a single-threaded runtime. It owns a
//! [SpendingsState] in a [RefCell] and never holds a borrow across an
//! `.await`, so the state can be read between suspension points.

use std::{
    cell::{Ref, RefCell},
    collections::BTreeSet,
};

use crate::{
    Error,
    api::SpendingsApi,
    category::{Category, CategoryId, CategoryName, find_by_name},
    dashboard::{Dashboard, derive_dashboard},
    month::YearMonth,
    spending::{Spending, SpendingId, validate_records},
    state::{BulkEditRequest, Notice, SpendingsState},
};

/// What happened to a load of the spendings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched spendings replaced the list.
    Applied,
    /// A later load was started before this one finished, so its result was
    /// dropped.
    Superseded,
    /// The fetch failed and the list is now unavailable.
    Failed,
}

/// What happened to a bulk category change.
#[derive(Debug, PartialEq)]
pub enum BulkEditOutcome {
    /// Nothing was selected or no category was chosen.
    Skipped,
    /// The change was saved.
    Committed,
    /// Saving failed. The month was reloaded from the source and the user was
    /// told the update failed.
    Reverted(Error),
}

/// Drives a [SpendingsState] from a [SpendingsApi].
pub struct SpendingsController<A> {
    api: A,
    state: RefCell<SpendingsState>,
}

impl<A: SpendingsApi> SpendingsController<A> {
    /// Create a controller that will show `month`. Nothing is fetched until
    /// [SpendingsController::load_month] or [SpendingsController::reload] is
    /// called.
    pub fn new(api: A, month: YearMonth) -> Self {
        Self {
            api,
            state: RefCell::new(SpendingsState::new(month)),
        }
    }

    /// The data source the controller talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// A read-only view of the current state.
    ///
    /// Drop the returned guard before awaiting any controller method.
    pub fn state(&self) -> Ref<'_, SpendingsState> {
        self.state.borrow()
    }

    /// Select or deselect a spending. Returns whether it is now selected.
    pub fn toggle(&self, spending_id: &SpendingId) -> bool {
        self.state.borrow_mut().selection_mut().toggle(spending_id)
    }

    /// Replace the selection with the loaded spendings among `spending_ids`.
    pub fn set_all<'a>(&self, spending_ids: impl IntoIterator<Item = &'a SpendingId>) {
        self.state.borrow_mut().selection_mut().set_all(spending_ids);
    }

    /// Select every loaded spending.
    pub fn select_all(&self) {
        self.state.borrow_mut().selection_mut().select_all_visible();
    }

    /// Deselect every spending.
    pub fn clear_selection(&self) {
        self.state.borrow_mut().selection_mut().clear();
    }

    /// Whether `spending_id` is selected.
    pub fn is_selected(&self, spending_id: &SpendingId) -> bool {
        self.state.borrow().selection().is_selected(spending_id)
    }

    /// A copy of the selected IDs.
    pub fn selected_ids(&self) -> BTreeSet<SpendingId> {
        self.state.borrow().selection().selected_ids().clone()
    }

    /// Choose the category that [SpendingsController::submit_bulk_edit]
    /// moves the selection to.
    pub fn set_pending_category(&self, category_name: Option<CategoryName>) {
        self.state.borrow_mut().set_pending_category(category_name);
    }

    /// Hide the current notice.
    pub fn dismiss_notice(&self) {
        self.state.borrow_mut().dismiss_notice();
    }

    /// The dashboard figures for the loaded spendings.
    pub fn dashboard(&self) -> Dashboard {
        derive_dashboard(self.state.borrow().spendings())
    }

    /// Load the spendings and categories for `month`.
    ///
    /// Loads may overlap. Only the most recently started load is applied,
    /// whichever order they finish in.
    pub async fn load_month(&self, month: YearMonth) -> LoadOutcome {
        let ticket = self.state.borrow_mut().begin_load(month);

        let result = self.fetch(month).await;
        let failed = result.is_err();

        let applied = self.state.borrow_mut().finish_load(ticket, result);

        match (applied, failed) {
            (false, _) => LoadOutcome::Superseded,
            (true, true) => LoadOutcome::Failed,
            (true, false) => LoadOutcome::Applied,
        }
    }

    /// Load the month currently shown again.
    pub async fn reload(&self) -> LoadOutcome {
        let month = self.state.borrow().month();
        self.load_month(month).await
    }

    /// Move the selected spendings to the pending category.
    ///
    /// Returns [BulkEditOutcome::Skipped] without contacting the source if
    /// nothing is selected or no category has been chosen.
    pub async fn submit_bulk_edit(&self) -> BulkEditOutcome {
        let request = self.state.borrow().bulk_edit_request();

        match request {
            Ok(request) => self.submit(request).await,
            Err(error) => {
                tracing::debug!("Skipping bulk edit: {error}");
                BulkEditOutcome::Skipped
            }
        }
    }

    /// Move `spending_ids` to the category named `category_name`.
    ///
    /// Returns [BulkEditOutcome::Skipped] if either is empty.
    pub async fn recategorize(
        &self,
        spending_ids: impl IntoIterator<Item = SpendingId>,
        category_name: &str,
    ) -> BulkEditOutcome {
        match BulkEditRequest::new(spending_ids, category_name) {
            Ok(request) => self.submit(request).await,
            Err(error) => {
                tracing::debug!("Skipping bulk edit: {error}");
                BulkEditOutcome::Skipped
            }
        }
    }

    /// Apply `request` in memory, then save it with a single call to the
    /// source.
    ///
    /// The list shows the new categories and the selection is empty before
    /// the source has answered. If saving fails, the month shown at that
    /// point is reloaded from the source and [Notice::UpdateFailed] is raised
    /// once the reload has finished. Failed saves are not retried.
    pub async fn submit(&self, request: BulkEditRequest) -> BulkEditOutcome {
        let changed = self.state.borrow_mut().apply_optimistic(&request);
        tracing::debug!(
            "Moved {changed} spendings to \"{}\" pending save",
            request.category_name()
        );

        let result = self
            .api
            .apply_bulk_category(request.spending_ids(), request.category_name())
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    "Saved {} spendings in category \"{}\"",
                    request.spending_ids().len(),
                    request.category_name()
                );
                BulkEditOutcome::Committed
            }
            Err(error) => {
                let error = bulk_update_failure(error);
                tracing::warn!("{error}, reloading spendings");

                self.reload().await;
                self.state.borrow_mut().raise_notice(Notice::UpdateFailed);

                BulkEditOutcome::Reverted(error)
            }
        }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// - [Error::EmptyCategoryName] if `name` is blank.
    /// - [Error::DuplicateCategoryName] if a category with the same name is
    ///   already loaded or the source rejects it as a duplicate.
    pub async fn create_category(&self, name: &str) -> Result<Category, Error> {
        let name = CategoryName::new(name)?;

        if find_by_name(self.state.borrow().categories(), name.as_ref()).is_some() {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }

        let category = self.api.create_category(&name).await?;
        tracing::info!("Created category \"{}\"", category.name);

        self.state.borrow_mut().add_category(category.clone());

        Ok(category)
    }

    /// Delete a category and reload the month, since its spendings move to
    /// "Other".
    ///
    /// # Errors
    ///
    /// Returns [Error::DeleteOtherCategory] for "Other" without contacting the
    /// source, or the source's error if the deletion fails.
    pub async fn delete_category(&self, category_id: CategoryId) -> Result<(), Error> {
        let is_other = self
            .state
            .borrow()
            .categories()
            .iter()
            .any(|category| category.id == category_id && category.name.is_other());

        if is_other {
            return Err(Error::DeleteOtherCategory);
        }

        self.api.delete_category(category_id).await?;
        tracing::info!("Deleted category #{category_id}");

        self.reload().await;

        Ok(())
    }

    async fn fetch(&self, month: YearMonth) -> Result<(Vec<Spending>, Vec<Category>), Error> {
        let (records, categories) = tokio::join!(
            self.api.fetch_spendings(month),
            self.api.fetch_categories()
        );

        let records = records.map_err(fetch_failure)?;
        let categories = categories.map_err(fetch_failure)?;

        Ok((validate_records(records, month), categories))
    }
}

fn fetch_failure(error: Error) -> Error {
    match error {
        Error::FetchFailure(_) => error,
        error => Error::FetchFailure(error.to_string()),
    }
}

fn bulk_update_failure(error: Error) -> Error {
    match error {
        Error::BulkUpdateFailure(_) => error,
        error => Error::BulkUpdateFailure(error.to_string()),
    }
}
