//! # Repository Module
//!
//! Database repository implementations for Souq.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  souq-service                                                          │
//! │       │                                                                 │
//! │       │  db.products().find(&filter)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── insert(&self, draft, images)                                      │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── find(&self, filter)                                               │
//! │  ├── update(&self, id, patch, images)  → UPDATE ... RETURNING          │
//! │  └── delete(&self, id)                 → DELETE ... RETURNING          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Updates and deletes return the affected row (or `None` when the id is
//! unknown) so callers never need a second round trip.
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Categories and their image
//! - [`ProductRepository`](product::ProductRepository) - Products and their gallery
//! - [`OrderRepository`](order::OrderRepository) - Orders and order lines
//! - [`UserRepository`](user::UserRepository) - Accounts and roles

pub mod category;
pub mod order;
pub mod product;
pub mod user;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DbResult;

/// Generates a new record ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a `LIKE` pattern matching `keyword` anywhere in a column.
///
/// `%`, `_` and `\` in the keyword are escaped, so queries using the
/// pattern must declare `ESCAPE '\'`. SQLite's `LIKE` is case-insensitive
/// for ASCII.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Encodes a value for a JSON document column.
pub(crate) fn to_document<T: Serialize + ?Sized>(value: &T) -> DbResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a JSON document column.
pub(crate) fn from_document<T: DeserializeOwned>(raw: &str) -> DbResult<T> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("shoe"), "%shoe%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_generate_id_is_uuid() {
        let id = generate_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, generate_id());
    }
}
