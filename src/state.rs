//! The state behind the spendings view: the month's spendings, the
//! selection and the pending bulk edit.
//!
//! [SpendingsState] is plain data with explicit mutation methods. The async
//! coordination lives in [crate::controller].

use std::collections::BTreeSet;

use crate::{
    Error,
    category::{Category, CategoryName, manageable_categories},
    dashboard::{Dashboard, derive_dashboard},
    money::{Money, format_currency},
    month::{YearMonth, format_row_date},
    selection::Selection,
    spending::{Spending, SpendingId},
};

/// Where the spendings list is in its loading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// The list holds the spendings of the latest load.
    Ready,
    /// The last applied load failed. The list is empty.
    Unavailable,
}

/// A message for the user about something that went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Spendings could not be loaded.
    DataUnavailable,
    /// A bulk category change could not be saved and was undone.
    UpdateFailed,
}

impl Notice {
    /// The text shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Notice::DataUnavailable => {
                "Spendings could not be loaded. Check your connection and try again."
            }
            Notice::UpdateFailed => {
                "Failed to update categories. Your changes have been undone."
            }
        }
    }
}

/// Identifies one load of the spendings list.
///
/// Only the result for the most recently issued ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    sequence: u64,
    month: YearMonth,
}

impl LoadTicket {
    /// Tickets issued later have larger sequence numbers.
    pub fn sequence(self) -> u64 {
        self.sequence
    }

    /// The month the load was issued for.
    pub fn month(self) -> YearMonth {
        self.month
    }
}

/// A request to move several spendings to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEditRequest {
    spending_ids: BTreeSet<SpendingId>,
    category_name: CategoryName,
}

impl BulkEditRequest {
    /// Create a bulk edit request.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRequest] if `spending_ids` is empty or
    /// `category_name` is empty or only whitespace.
    pub fn new(
        spending_ids: impl IntoIterator<Item = SpendingId>,
        category_name: &str,
    ) -> Result<Self, Error> {
        let spending_ids: BTreeSet<SpendingId> = spending_ids.into_iter().collect();

        if spending_ids.is_empty() {
            return Err(Error::InvalidRequest);
        }

        let category_name = CategoryName::new(category_name).map_err(|_| Error::InvalidRequest)?;

        Ok(Self {
            spending_ids,
            category_name,
        })
    }

    /// The spendings to move.
    pub fn spending_ids(&self) -> &BTreeSet<SpendingId> {
        &self.spending_ids
    }

    /// The category to move them to.
    pub fn category_name(&self) -> &CategoryName {
        &self.category_name
    }
}

/// A spending formatted for display in the spendings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingRow {
    /// The ID of the spending shown in this row.
    pub id: SpendingId,
    /// e.g. "Jan 05, 2024"
    pub date: String,
    /// The spending's description.
    pub name: String,
    /// The category label, exactly as stored.
    pub category_name: String,
    /// e.g. "$1,234.50"
    pub amount: String,
    /// Whether the row's checkbox is ticked.
    pub selected: bool,
}

/// Everything the spendings view shows, owned in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingsState {
    month: YearMonth,
    spendings: Vec<Spending>,
    categories: Vec<Category>,
    selection: Selection,
    pending_category: Option<CategoryName>,
    status: LoadStatus,
    notice: Option<Notice>,
    latest_sequence: u64,
}

impl SpendingsState {
    /// Create an empty state for `month`.
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            spendings: Vec::new(),
            categories: Vec::new(),
            selection: Selection::default(),
            pending_category: None,
            status: LoadStatus::Idle,
            notice: None,
            latest_sequence: 0,
        }
    }

    /// The month currently shown, or being loaded.
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// The spendings for the month, newest first as delivered by the source.
    pub fn spendings(&self) -> &[Spending] {
        &self.spendings
    }

    /// Every category, including "Other".
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The categories the user may create, rename or delete.
    pub fn manageable_categories(&self) -> Vec<&Category> {
        manageable_categories(&self.categories)
    }

    /// The spendings chosen for a bulk edit.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Mutable access to the selection. The selection keeps itself a subset
    /// of the loaded spendings.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Where the list is in its loading lifecycle.
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// The message currently shown to the user, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Show `notice`, replacing any notice already shown.
    pub fn raise_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Hide the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The category chosen for the next bulk edit.
    pub fn pending_category(&self) -> Option<&CategoryName> {
        self.pending_category.as_ref()
    }

    /// Set the category that selected spendings will be moved to.
    pub fn set_pending_category(&mut self, category_name: Option<CategoryName>) {
        self.pending_category = category_name;
    }

    /// Start loading `month`, superseding any load still in flight.
    ///
    /// The selection is cleared straight away.
    pub fn begin_load(&mut self, month: YearMonth) -> LoadTicket {
        self.latest_sequence += 1;
        self.month = month;
        self.status = LoadStatus::Loading;
        self.selection.clear();

        tracing::debug!("Load #{} of {month} started", self.latest_sequence);

        LoadTicket {
            sequence: self.latest_sequence,
            month,
        }
    }

    /// Whether `ticket` belongs to the most recently started load.
    pub fn is_latest(&self, ticket: LoadTicket) -> bool {
        ticket.sequence == self.latest_sequence
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Results for any ticket except the latest are dropped. On success the
    /// spendings and categories are replaced and the selection is cleared.
    /// On failure the list is emptied and [Notice::DataUnavailable] is shown.
    ///
    /// Returns whether the result was applied.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<(Vec<Spending>, Vec<Category>), Error>,
    ) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(
                "Ignoring stale load #{} of {}, latest is #{}",
                ticket.sequence,
                ticket.month,
                self.latest_sequence
            );
            return false;
        }

        match result {
            Ok((spendings, categories)) => {
                tracing::debug!(
                    "Load #{} of {} applied with {} spendings",
                    ticket.sequence,
                    ticket.month,
                    spendings.len()
                );

                self.selection
                    .set_visible(spendings.iter().map(|spending| spending.id.clone()));
                self.spendings = spendings;
                self.categories = categories;
                self.status = LoadStatus::Ready;

                if self.notice == Some(Notice::DataUnavailable) {
                    self.notice = None;
                }
            }
            Err(error) => {
                tracing::warn!("Load #{} of {} failed: {error}", ticket.sequence, ticket.month);

                self.selection.set_visible(Vec::<SpendingId>::new());
                self.spendings.clear();
                self.status = LoadStatus::Unavailable;
                self.notice = Some(Notice::DataUnavailable);
            }
        }

        true
    }

    /// Build a bulk edit from the selected spendings and the pending category.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRequest] if nothing is selected or no category
    /// has been chosen.
    pub fn bulk_edit_request(&self) -> Result<BulkEditRequest, Error> {
        let category_name = self.pending_category.as_ref().ok_or(Error::InvalidRequest)?;

        BulkEditRequest::new(
            self.selection.selected_ids().iter().cloned(),
            category_name.as_ref(),
        )
    }

    /// Move the spendings in `request` to its category in memory, then clear
    /// the selection and the pending category.
    ///
    /// Returns the number of spendings changed.
    pub fn apply_optimistic(&mut self, request: &BulkEditRequest) -> usize {
        let mut changed = 0;

        for spending in self
            .spendings
            .iter_mut()
            .filter(|spending| request.spending_ids.contains(&spending.id))
        {
            spending.category_name = request.category_name.to_string();
            changed += 1;
        }

        self.selection.clear();
        self.pending_category = None;

        changed
    }

    /// Add a newly created category.
    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    /// The dashboard figures for the loaded spendings.
    pub fn dashboard(&self) -> Dashboard {
        derive_dashboard(&self.spendings)
    }

    /// The sum of all loaded spendings.
    pub fn total_amount(&self) -> Money {
        self.spendings.iter().map(|spending| spending.amount).sum()
    }

    /// Whether every loaded spending is selected.
    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected()
    }

    /// The loaded spendings formatted for the spendings table.
    pub fn spending_rows(&self) -> Vec<SpendingRow> {
        self.spendings
            .iter()
            .map(|spending| SpendingRow {
                id: spending.id.clone(),
                date: format_row_date(spending.date),
                name: spending.name.clone(),
                category_name: spending.category_name.clone(),
                amount: format_currency(spending.amount),
                selected: self.selection.is_selected(&spending.id),
            })
            .collect()
    }
}
