//! Spending records and their validation at the fetch boundary.

use std::{collections::HashSet, fmt::Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::{
    Error,
    category::OTHER_CATEGORY,
    money::Money,
    month::{YearMonth, parse_date},
};

/// The opaque identifier of a spending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpendingId(String);

impl SpendingId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for SpendingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SpendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single dated expense with a category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spending {
    /// Unique and stable across requests.
    pub id: SpendingId,
    /// Free-text description, e.g. "Coffee at Joe's".
    pub name: String,
    /// The day the money was spent.
    pub date: Date,
    /// How much was spent, never negative.
    pub amount: Money,
    /// The category label. Never empty, see [OTHER_CATEGORY].
    ///
    /// Kept exactly as received: no trimming or case folding.
    pub category_name: String,
}

impl Spending {
    /// Create a spending, substituting "Other" for an empty category.
    pub fn new(
        id: SpendingId,
        name: &str,
        date: Date,
        amount: Money,
        category_name: &str,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            date,
            amount,
            category_name: sanitize_category_name(Some(category_name)),
        }
    }

    /// Convert back to the wire representation.
    pub fn to_record(&self) -> SpendingRecord {
        SpendingRecord {
            id: Value::String(self.id.to_string()),
            name: Some(self.name.clone()),
            date: Some(self.date.to_string()),
            amount: Value::String(self.amount.to_string()),
            category_name: Some(self.category_name.clone()),
        }
    }
}

/// A spending as it arrives from a data source, before validation.
///
/// Every field is optional or loosely typed so that one malformed record can
/// be rejected on its own instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingRecord {
    /// A string or integer identifier.
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    /// Free-text description. Missing means empty.
    pub name: Option<String>,
    /// An ISO date, optionally followed by a time.
    #[serde(default)]
    pub date: Option<String>,
    /// A JSON number or decimal string.
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    /// The category label. Missing or blank means "Other".
    pub category_name: Option<String>,
}

impl TryFrom<SpendingRecord> for Spending {
    type Error = Error;

    fn try_from(record: SpendingRecord) -> Result<Self, Self::Error> {
        let id = match &record.id {
            Value::String(id) if !id.trim().is_empty() => SpendingId::new(id.as_str()),
            Value::Number(id) if id.is_i64() || id.is_u64() => SpendingId::new(id.to_string()),
            other => {
                return Err(Error::InvalidSpending(format!(
                    "missing or invalid id {other}"
                )));
            }
        };

        let date_text = record
            .date
            .as_deref()
            .ok_or_else(|| Error::InvalidSpending(format!("spending {id} has no date")))?;
        let date = parse_date(date_prefix(date_text))?;

        let amount = match &record.amount {
            Value::Number(number) => Money::parse(&number.to_string())?,
            Value::String(text) => Money::parse(text)?,
            other => return Err(Error::InvalidAmount(other.to_string())),
        };

        if amount.is_negative() {
            return Err(Error::InvalidSpending(format!(
                "spending {id} has a negative amount {amount}"
            )));
        }

        Ok(Spending {
            id,
            name: record.name.unwrap_or_default(),
            date,
            amount,
            category_name: sanitize_category_name(record.category_name.as_deref()),
        })
    }
}

/// Validate fetched records for `month`.
///
/// Malformed records, records dated outside `month` and repeated ids are
/// dropped with a warning. Order is preserved.
pub fn validate_records(records: Vec<SpendingRecord>, month: YearMonth) -> Vec<Spending> {
    let mut seen_ids = HashSet::new();
    let mut spendings = Vec::with_capacity(records.len());

    for record in records {
        let spending = match Spending::try_from(record) {
            Ok(spending) => spending,
            Err(error) => {
                tracing::warn!("Rejected malformed spending record: {error}");
                continue;
            }
        };

        if !month.contains(spending.date) {
            tracing::warn!(
                "Rejected spending {} dated {} outside of {month}",
                spending.id,
                spending.date
            );
            continue;
        }

        if !seen_ids.insert(spending.id.clone()) {
            tracing::warn!("Rejected duplicate spending id {}", spending.id);
            continue;
        }

        spendings.push(spending);
    }

    spendings
}

fn sanitize_category_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_owned(),
        _ => OTHER_CATEGORY.to_owned(),
    }
}

/// Date-times such as `2024-01-05T10:00:00` are cut down to the date.
fn date_prefix(text: &str) -> &str {
    let text = text.trim();

    match text.char_indices().nth(10) {
        Some((index, 'T' | ' ')) => &text[..index],
        _ => text,
    }
}
