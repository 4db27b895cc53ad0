//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// The category that absorbs spendings without a category, including those
/// whose category was deleted. It can never be deleted itself.
pub const OTHER_CATEGORY: &str = "Other";

/// The categories a new store starts with.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Health & Fitness",
    "Travel",
    "Education",
    "Personal Care",
    OTHER_CATEGORY,
];

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The sentinel "Other" category name.
    pub fn other() -> Self {
        Self(OTHER_CATEGORY.to_owned())
    }

    /// Whether this is the sentinel "Other" category.
    pub fn is_other(&self) -> bool {
        self.0 == OTHER_CATEGORY
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for CategoryName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        CategoryName::new(&text).map_err(serde::de::Error::custom)
    }
}

/// Identifier for a category.
pub type CategoryId = i64;

/// A named grouping for spendings, e.g. 'Groceries' or 'Travel'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID assigned by the database.
    pub id: CategoryId,
    /// The unique name shown to the user.
    pub name: CategoryName,
}

/// The categories a user may manage, i.e. everything except "Other".
pub fn manageable_categories(categories: &[Category]) -> Vec<&Category> {
    categories
        .iter()
        .filter(|category| !category.name.is_other())
        .collect()
}

/// Find a category by its exact name.
pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories
        .iter()
        .find(|category| category.name.as_ref() == name)
}
