//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY},
};

/// Code 2067 occurs when a UNIQUE constraint failed.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if a category with the same name
/// already exists.
pub fn create_category(name: CategoryName, connection: &Connection) -> Result<Category, Error> {
    connection
        .execute("INSERT INTO category (name) VALUES (?1);", (name.as_ref(),))
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateCategoryName(name.to_string())
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Retrieve all categories in the order they were created.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a category by its exact name.
pub fn get_category_by_name(name: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE name = :name;")?
        .query_row(&[(":name", &name)], map_row)
        .map_err(|error| error.into())
}

/// Delete a category, moving its spendings to the "Other" category.
///
/// The reassignment and deletion happen in one SQL transaction.
///
/// # Errors
///
/// - [Error::DeleteMissingCategory] if no category has the ID `category_id`.
/// - [Error::DeleteOtherCategory] if the category is "Other".
/// - [Error::MissingOtherCategory] if there is no "Other" category to move
///   spendings to.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let category = transaction
        .query_row(
            "SELECT id, name FROM category WHERE id = ?1",
            [category_id],
            map_row,
        )
        .optional()?
        .ok_or(Error::DeleteMissingCategory)?;

    if category.name.is_other() {
        return Err(Error::DeleteOtherCategory);
    }

    let other_id = match get_category_by_name(OTHER_CATEGORY, &transaction) {
        Ok(other) => other.id,
        Err(Error::NotFound) => return Err(Error::MissingOtherCategory),
        Err(error) => return Err(error),
    };

    let moved = transaction.execute(
        "UPDATE spending SET category_id = ?1 WHERE category_id = ?2",
        (other_id, category_id),
    )?;
    transaction.execute("DELETE FROM category WHERE id = ?1", [category_id])?;
    transaction.commit()?;

    tracing::info!(
        "Deleted category \"{}\" and moved {moved} spendings to \"{OTHER_CATEGORY}\"",
        category.name
    );

    Ok(())
}

/// Insert the default categories into an empty table and make sure "Other"
/// exists.
///
/// Returns the number of categories inserted.
pub fn seed_default_categories(connection: &Connection) -> Result<usize, Error> {
    let existing: i64 =
        connection.query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;

    let mut inserted = 0;

    if existing == 0 {
        let mut stmt = connection.prepare("INSERT INTO category (name) VALUES (?1)")?;

        for name in DEFAULT_CATEGORIES {
            inserted += stmt.execute([name])?;
        }
    }

    inserted += connection.execute(
        "INSERT OR IGNORE INTO category (name) VALUES (?1)",
        [OTHER_CATEGORY],
    )?;

    Ok(inserted)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category { id, name })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{
            CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY, create_category,
            db::get_category_by_name, delete_category, get_all_categories,
        },
        db::initialize,
        money::Money,
        month::YearMonth,
        spending::{Spending, SpendingId, get_spendings_in_month, insert_spending},
    };

    use super::seed_default_categories;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn initialize_seeds_default_categories() {
        let connection = get_test_db_connection();

        let names: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, DEFAULT_CATEGORIES.map(str::to_owned).to_vec());
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let connection = get_test_db_connection();

        let inserted = seed_default_categories(&connection).unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(
            get_all_categories(&connection).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let name = CategoryName::new("Pets").unwrap();

        let category = create_category(name.clone(), &connection).expect("Could not create");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(get_category_by_name("Pets", &connection), Ok(category));
    }

    #[test]
    fn create_category_rejects_duplicate_name() {
        let connection = get_test_db_connection();

        let result = create_category(CategoryName::new_unchecked("Travel"), &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateCategoryName("Travel".to_owned()))
        );
    }

    #[test]
    fn get_category_by_unknown_name_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(
            get_category_by_name("Nope", &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_category_moves_spendings_to_other() {
        let connection = get_test_db_connection();
        let travel = get_category_by_name("Travel", &connection).unwrap();
        insert_spending(
            &Spending::new(
                SpendingId::new("s1"),
                "Flight",
                date!(2024 - 01 - 10),
                Money::from_cents(30_000),
                "Travel",
            ),
            &connection,
        )
        .unwrap();

        delete_category(travel.id, &connection).expect("Could not delete category");

        let spendings =
            get_spendings_in_month(YearMonth::of(date!(2024 - 01 - 10)), &connection).unwrap();
        assert_eq!(spendings[0].category_name, OTHER_CATEGORY);
        assert_eq!(
            get_category_by_name("Travel", &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_other_category_is_refused() {
        let connection = get_test_db_connection();
        let other = get_category_by_name(OTHER_CATEGORY, &connection).unwrap();

        assert_eq!(
            delete_category(other.id, &connection),
            Err(Error::DeleteOtherCategory)
        );
    }

    #[test]
    fn delete_missing_category_returns_error() {
        let connection = get_test_db_connection();

        assert_eq!(
            delete_category(999_999, &connection),
            Err(Error::DeleteMissingCategory)
        );
    }

    #[test]
    fn delete_fails_when_other_is_missing() {
        let connection = get_test_db_connection();
        let travel = get_category_by_name("Travel", &connection).unwrap();
        connection
            .execute("DELETE FROM category WHERE name = ?1", [OTHER_CATEGORY])
            .unwrap();

        assert_eq!(
            delete_category(travel.id, &connection),
            Err(Error::MissingOtherCategory)
        );
        assert!(get_category_by_name("Travel", &connection).is_ok());
    }
}
