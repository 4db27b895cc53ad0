//! Category management for grouping spendings.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, delete_category, get_all_categories,
    seed_default_categories,
};
pub use domain::{
    Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, OTHER_CATEGORY, find_by_name,
    manageable_categories,
};
