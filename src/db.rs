//! The SQLite database behind [SqliteSpendingsApi].

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    api::SpendingsApi,
    category::{
        Category, CategoryId, CategoryName, create_category, create_category_table,
        delete_category, get_all_categories, seed_default_categories,
    },
    month::YearMonth,
    spending::{
        Spending, SpendingId, SpendingRecord, create_spending_table, get_spendings_in_month,
        insert_spending, update_spending_categories,
    },
};

/// Create the tables for the domain models and seed the default categories.
///
/// Safe to call on a database that is already initialized.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_spending_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The result of [SqliteSpendingsApi::import_records].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Records that were stored.
    pub imported: usize,
    /// Records that were malformed or whose ID already exists.
    pub skipped: usize,
}

/// Serves spendings and categories from a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSpendingsApi {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSpendingsApi {
    /// Wrap `connection`, initializing the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Store spending records, e.g. from a JSON export.
    ///
    /// Malformed records and records with an existing ID are skipped with a
    /// warning. Category names are trimmed the same way [CategoryName::new]
    /// trims them, and categories that do not exist yet are created.
    pub fn import_records(&self, records: Vec<SpendingRecord>) -> Result<ImportSummary, Error> {
        let connection = self.lock()?;
        let transaction = connection.unchecked_transaction()?;
        let mut summary = ImportSummary::default();

        for record in records {
            let mut spending = match Spending::try_from(record) {
                Ok(spending) => spending,
                Err(error) => {
                    tracing::warn!("Skipping malformed spending record: {error}");
                    summary.skipped += 1;
                    continue;
                }
            };

            spending.category_name = spending.category_name.trim().to_owned();
            ensure_category_exists(&spending.category_name, &transaction)?;

            match insert_spending(&spending, &transaction) {
                Ok(()) => summary.imported += 1,
                Err(Error::DuplicateSpendingId(id)) => {
                    tracing::warn!("Skipping spending {id} which already exists");
                    summary.skipped += 1;
                }
                Err(error) => return Err(error),
            }
        }

        transaction.commit()?;

        tracing::info!(
            "Imported {} spendings, skipped {}",
            summary.imported,
            summary.skipped
        );

        Ok(summary)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLockError)
    }
}

impl SpendingsApi for SqliteSpendingsApi {
    async fn fetch_spendings(&self, month: YearMonth) -> Result<Vec<SpendingRecord>, Error> {
        let connection = self.lock()?;
        let spendings = get_spendings_in_month(month, &connection)?;

        Ok(spendings.iter().map(Spending::to_record).collect())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, Error> {
        let connection = self.lock()?;
        get_all_categories(&connection)
    }

    async fn apply_bulk_category(
        &self,
        spending_ids: &BTreeSet<SpendingId>,
        category_name: &CategoryName,
    ) -> Result<(), Error> {
        let connection = self.lock()?;
        let updated = update_spending_categories(spending_ids, category_name, &connection)?;

        if updated < spending_ids.len() {
            tracing::debug!(
                "{} of {} spendings to move to \"{category_name}\" were not found",
                spending_ids.len() - updated,
                spending_ids.len()
            );
        }

        Ok(())
    }

    async fn create_category(&self, name: &CategoryName) -> Result<Category, Error> {
        let connection = self.lock()?;
        create_category(name.clone(), &connection)
    }

    async fn delete_category(&self, category_id: CategoryId) -> Result<(), Error> {
        let connection = self.lock()?;
        delete_category(category_id, &connection)
    }
}

fn ensure_category_exists(name: &str, connection: &Connection) -> Result<(), Error> {
    let inserted = connection.execute("INSERT OR IGNORE INTO category (name) VALUES (?1)", [name])?;

    if inserted > 0 {
        tracing::info!("Created category \"{name}\" for imported spendings");
    }

    Ok(())
}

#[cfg(test)]
mod sqlite_spendings_api_tests {
    use std::collections::BTreeSet;

    use rusqlite::Connection;
    use serde_json::json;
    use time::{Month, macros::date};

    use crate::{
        Error,
        api::SpendingsApi,
        category::{CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY, find_by_name},
        db::{ImportSummary, SqliteSpendingsApi},
        money::Money,
        month::YearMonth,
        spending::{Spending, SpendingId, SpendingRecord},
    };

    fn get_test_api() -> SqliteSpendingsApi {
        let connection = Connection::open_in_memory().unwrap();
        SqliteSpendingsApi::new(connection).expect("Could not create API")
    }

    fn january() -> YearMonth {
        YearMonth::new(2024, Month::January)
    }

    fn records() -> Vec<SpendingRecord> {
        serde_json::from_value(json!([
            {"id": "a", "name": "Dinner", "date": "2024-01-05", "amount": 42.5, "category_name": "Food & Dining"},
            {"id": "b", "name": "Flight", "date": "2024-01-20", "amount": "310.00", "category_name": "Travel"},
            {"id": "c", "name": "Vet", "date": "2024-01-11", "amount": "80", "category_name": "Pets"},
            {"id": "d", "name": "Rent", "date": "2024-02-01", "amount": 1200, "category_name": "Bills & Utilities"},
            {"id": "e", "name": "Broken", "amount": 1}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn new_seeds_default_categories() {
        let categories = get_test_api().fetch_categories().await.unwrap();

        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
    }

    #[tokio::test]
    async fn import_records_creates_categories_and_skips_bad_rows() {
        let api = get_test_api();

        let summary = api.import_records(records()).unwrap();
        let again = api.import_records(records()).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                imported: 4,
                skipped: 1
            }
        );
        assert_eq!(
            again,
            ImportSummary {
                imported: 0,
                skipped: 5
            }
        );
        let categories = api.fetch_categories().await.unwrap();
        assert!(find_by_name(&categories, "Pets").is_some());
    }

    #[tokio::test]
    async fn fetch_spendings_returns_month_newest_first() {
        let api = get_test_api();
        api.import_records(records()).unwrap();

        let spendings: Vec<Spending> = api
            .fetch_spendings(january())
            .await
            .unwrap()
            .into_iter()
            .map(|record| Spending::try_from(record).unwrap())
            .collect();

        let ids: Vec<&str> = spendings.iter().map(|s| s.id.as_ref()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(spendings[2].amount, Money::from_cents(4_250));
        assert_eq!(spendings[2].date, date!(2024 - 01 - 05));
    }

    #[tokio::test]
    async fn apply_bulk_category_is_all_or_nothing() {
        let api = get_test_api();
        api.import_records(records()).unwrap();
        let ids = BTreeSet::from([SpendingId::new("a"), SpendingId::new("c")]);

        let result = api
            .apply_bulk_category(&ids, &CategoryName::new_unchecked("Yachts"))
            .await;
        assert_eq!(result, Err(Error::UnknownCategory("Yachts".to_owned())));

        api.apply_bulk_category(&ids, &CategoryName::new_unchecked("Shopping"))
            .await
            .unwrap();

        let categories: Vec<String> = api
            .fetch_spendings(january())
            .await
            .unwrap()
            .into_iter()
            .filter_map(|record| record.category_name)
            .collect();
        assert_eq!(categories, vec!["Travel", "Shopping", "Shopping"]);
    }

    #[tokio::test]
    async fn import_records_trims_category_names() {
        let api = get_test_api();
        let records: Vec<SpendingRecord> = serde_json::from_value(json!([
            {"id": "a", "date": "2024-01-05", "amount": 12, "category_name": "  Gifts "},
            {"id": "b", "date": "2024-01-06", "amount": 30, "category_name": "Travel"}
        ]))
        .unwrap();
        api.import_records(records).unwrap();

        let target = CategoryName::new("  Gifts ").unwrap();
        api.apply_bulk_category(&BTreeSet::from([SpendingId::new("b")]), &target)
            .await
            .unwrap();

        let categories = api.fetch_categories().await.unwrap();
        assert!(find_by_name(&categories, "Gifts").is_some());
        assert!(find_by_name(&categories, "  Gifts ").is_none());
        let names: Vec<String> = api
            .fetch_spendings(january())
            .await
            .unwrap()
            .into_iter()
            .filter_map(|record| record.category_name)
            .collect();
        assert_eq!(names, vec!["Gifts", "Gifts"]);
    }

    #[tokio::test]
    async fn create_and_delete_category() {
        let api = get_test_api();
        api.import_records(records()).unwrap();

        let created = api
            .create_category(&CategoryName::new_unchecked("Gifts"))
            .await
            .unwrap();
        assert_eq!(
            api.create_category(&CategoryName::new_unchecked("Gifts"))
                .await,
            Err(Error::DuplicateCategoryName("Gifts".to_owned()))
        );

        let categories = api.fetch_categories().await.unwrap();
        let pets = find_by_name(&categories, "Pets").unwrap().id;
        api.delete_category(pets).await.unwrap();
        api.delete_category(created.id).await.unwrap();

        let records = api.fetch_spendings(january()).await.unwrap();
        let vet = records
            .iter()
            .find(|record| record.name.as_deref() == Some("Vet"))
            .unwrap();
        assert_eq!(vet.category_name.as_deref(), Some(OTHER_CATEGORY));
    }
}
