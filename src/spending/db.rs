//! Database operations for spendings.

use std::collections::BTreeSet;

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{CategoryId, CategoryName},
    money::Money,
    month::YearMonth,
    spending::{Spending, SpendingId},
};

/// Code 1555 occurs when a PRIMARY KEY constraint failed.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;

/// Store a spending under the category with its exact name.
///
/// # Errors
///
/// - [Error::UnknownCategory] if no category has the spending's category name.
/// - [Error::DuplicateSpendingId] if a spending with the same ID exists.
pub fn insert_spending(spending: &Spending, connection: &Connection) -> Result<(), Error> {
    let category_id = find_category_id(&spending.category_name, connection)?;

    connection
        .execute(
            "INSERT INTO spending (id, name, date, amount_cents, category_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                spending.id.as_ref(),
                &spending.name,
                spending.date,
                spending.amount.cents(),
                category_id,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Error::DuplicateSpendingId(spending.id.to_string())
            }
            error => error.into(),
        })?;

    Ok(())
}

/// Get the spendings dated within `month`, newest first.
pub fn get_spendings_in_month(
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<Spending>, Error> {
    connection
        .prepare(
            "SELECT s.id, s.name, s.date, s.amount_cents, c.name
            FROM spending s
            JOIN category c ON c.id = s.category_id
            WHERE s.date BETWEEN ?1 AND ?2
            ORDER BY s.date DESC, s.id ASC",
        )?
        .query_map((month.first_day(), month.last_day()), map_row)?
        .map(|maybe_spending| maybe_spending.map_err(|error| error.into()))
        .collect()
}

/// Move every spending in `spending_ids` to `category_name`.
///
/// All updates happen in a single SQL transaction: either every row is
/// updated or none are. IDs that do not exist are skipped.
///
/// Returns the number of spendings updated.
///
/// # Errors
///
/// Returns [Error::UnknownCategory] if there is no category named
/// `category_name`.
pub fn update_spending_categories(
    spending_ids: &BTreeSet<SpendingId>,
    category_name: &CategoryName,
    connection: &Connection,
) -> Result<usize, Error> {
    if spending_ids.is_empty() {
        return Ok(0);
    }

    let transaction = connection.unchecked_transaction()?;
    let category_id = find_category_id(category_name.as_ref(), &transaction)?;

    let mut updated_rows = 0;
    {
        let mut stmt = transaction.prepare("UPDATE spending SET category_id = ?1 WHERE id = ?2")?;

        for spending_id in spending_ids {
            updated_rows += stmt.execute((category_id, spending_id.as_ref()))?;
        }
    }

    transaction.commit()?;

    Ok(updated_rows)
}

/// Initialize the spending table and indexes.
pub fn create_spending_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS spending (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            category_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_spending_date ON spending(date);",
    )?;

    Ok(())
}

fn find_category_id(name: &str, connection: &Connection) -> Result<CategoryId, Error> {
    connection
        .query_row("SELECT id FROM category WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or_else(|| Error::UnknownCategory(name.to_owned()))
}

fn map_row(row: &Row) -> Result<Spending, rusqlite::Error> {
    let id: String = row.get(0)?;
    let amount_cents: i64 = row.get(3)?;

    Ok(Spending {
        id: SpendingId::new(id),
        name: row.get(1)?,
        date: row.get(2)?,
        amount: Money::from_cents(amount_cents),
        category_name: row.get(4)?,
    })
}
