#![allow(missing_docs)]

//! Test doubles shared by the controller tests.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, HashMap},
};

use tokio::sync::oneshot;

use crate::{
    Error,
    api::SpendingsApi,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY},
    month::YearMonth,
    spending::{Spending, SpendingId, SpendingRecord},
};

/// An in-memory [SpendingsApi] that tests can script.
///
/// Responses can be held in flight with [FakeSpendingsApi::hold_fetch] and
/// [FakeSpendingsApi::hold_bulk_update]: the call does not resolve until the
/// returned sender is used or dropped. Data is read when the call resolves.
pub(crate) struct FakeSpendingsApi {
    spendings: RefCell<BTreeMap<YearMonth, Vec<SpendingRecord>>>,
    categories: RefCell<Vec<Category>>,
    fail_fetch: Cell<bool>,
    fail_bulk_update: Cell<bool>,
    fetch_gates: RefCell<HashMap<YearMonth, oneshot::Receiver<()>>>,
    bulk_gate: RefCell<Option<oneshot::Receiver<()>>>,
    fetch_calls: RefCell<Vec<YearMonth>>,
    bulk_calls: RefCell<Vec<(BTreeSet<SpendingId>, CategoryName)>>,
}

impl FakeSpendingsApi {
    /// An API with the default categories and no spendings.
    pub(crate) fn new() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, name)| Category {
                id: i as CategoryId + 1,
                name: CategoryName::new_unchecked(name),
            })
            .collect();

        Self {
            spendings: RefCell::new(BTreeMap::new()),
            categories: RefCell::new(categories),
            fail_fetch: Cell::new(false),
            fail_bulk_update: Cell::new(false),
            fetch_gates: RefCell::new(HashMap::new()),
            bulk_gate: RefCell::new(None),
            fetch_calls: RefCell::new(Vec::new()),
            bulk_calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_spendings(self, month: YearMonth, spendings: &[Spending]) -> Self {
        self.set_records(month, spendings.iter().map(Spending::to_record).collect());
        self
    }

    pub(crate) fn set_records(&self, month: YearMonth, records: Vec<SpendingRecord>) {
        self.spendings.borrow_mut().insert(month, records);
    }

    pub(crate) fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.set(fail);
    }

    pub(crate) fn set_fail_bulk_update(&self, fail: bool) {
        self.fail_bulk_update.set(fail);
    }

    /// Hold the next fetch of `month` until the returned sender fires.
    pub(crate) fn hold_fetch(&self, month: YearMonth) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.fetch_gates.borrow_mut().insert(month, receiver);
        sender
    }

    /// Hold the next bulk update until the returned sender fires.
    pub(crate) fn hold_bulk_update(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.bulk_gate.borrow_mut() = Some(receiver);
        sender
    }

    pub(crate) fn fetch_calls(&self) -> Vec<YearMonth> {
        self.fetch_calls.borrow().clone()
    }

    pub(crate) fn bulk_calls(&self) -> Vec<(BTreeSet<SpendingId>, CategoryName)> {
        self.bulk_calls.borrow().clone()
    }

    /// The stored spendings for `month`, as the source currently has them.
    pub(crate) fn stored_spendings(&self, month: YearMonth) -> Vec<Spending> {
        self.spendings
            .borrow()
            .get(&month)
            .map(|records| {
                records
                    .iter()
                    .cloned()
                    .filter_map(|record| Spending::try_from(record).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SpendingsApi for FakeSpendingsApi {
    async fn fetch_spendings(&self, month: YearMonth) -> Result<Vec<SpendingRecord>, Error> {
        self.fetch_calls.borrow_mut().push(month);

        let gate = self.fetch_gates.borrow_mut().remove(&month);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_fetch.get() {
            return Err(Error::FetchFailure("network unreachable".to_owned()));
        }

        Ok(self
            .spendings
            .borrow()
            .get(&month)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, Error> {
        if self.fail_fetch.get() {
            return Err(Error::FetchFailure("network unreachable".to_owned()));
        }

        Ok(self.categories.borrow().clone())
    }

    async fn apply_bulk_category(
        &self,
        spending_ids: &BTreeSet<SpendingId>,
        category_name: &CategoryName,
    ) -> Result<(), Error> {
        self.bulk_calls
            .borrow_mut()
            .push((spending_ids.clone(), category_name.clone()));

        let gate = self.bulk_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_bulk_update.get() {
            return Err(Error::DatabaseLockError);
        }

        for records in self.spendings.borrow_mut().values_mut() {
            for record in records.iter_mut() {
                let matches = record
                    .id
                    .as_str()
                    .is_some_and(|id| spending_ids.contains(&SpendingId::new(id)));

                if matches {
                    record.category_name = Some(category_name.to_string());
                }
            }
        }

        Ok(())
    }

    async fn create_category(&self, name: &CategoryName) -> Result<Category, Error> {
        let mut categories = self.categories.borrow_mut();

        if categories.iter().any(|category| &category.name == name) {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }

        let category = Category {
            id: categories.iter().map(|category| category.id).max().unwrap_or(0) + 1,
            name: name.clone(),
        };
        categories.push(category.clone());

        Ok(category)
    }

    async fn delete_category(&self, category_id: CategoryId) -> Result<(), Error> {
        let mut categories = self.categories.borrow_mut();

        let position = categories
            .iter()
            .position(|category| category.id == category_id)
            .ok_or(Error::DeleteMissingCategory)?;

        if categories[position].name.is_other() {
            return Err(Error::DeleteOtherCategory);
        }

        let removed = categories.remove(position);

        for records in self.spendings.borrow_mut().values_mut() {
            for record in records.iter_mut() {
                if record.category_name.as_deref() == Some(removed.name.as_ref()) {
                    record.category_name = Some(OTHER_CATEGORY.to_owned());
                }
            }
        }

        Ok(())
    }
}
