//! # Validation Module
//!
//! Input validation for Souq.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP request (axum)                                          │
//! │  ├── Type validation (deserialization, multipart parsing)              │
//! │  └── Auth guard                                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + UploadPolicy                                   │
//! │  ├── Field rules (lengths, ranges, formats)                            │
//! │  └── Runs before any database or image host call                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE constraints (category name, user email)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use souq_core::validation::{validate_category_name, validate_uuid};
//!
//! validate_category_name("Shoes").unwrap();
//! assert!(validate_uuid("not-a-uuid").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{
    CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, OrderItem, OrderPatch,
    ProductPatch, UserPatch,
};

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a trimmed string length lies within `min..=max` characters.
fn validate_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a category name.
///
/// ## Rules
/// - Between 3 and 50 characters after trimming
///
/// ## Example
/// ```rust
/// use souq_core::validation::validate_category_name;
///
/// assert!(validate_category_name("Shoes").is_ok());
/// assert!(validate_category_name("ab").is_err());
/// ```
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_length("name", name, 3, 50)
}

/// Validates a category description (10 to 200 characters).
pub fn validate_category_description(description: &str) -> ValidationResult<()> {
    validate_length("description", description, 10, 200)
}

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_title(title: &str) -> ValidationResult<()> {
    validate_length("title", title, 1, 200)
}

/// Validates a product description (required, at most 2000 characters).
pub fn validate_product_description(description: &str) -> ValidationResult<()> {
    validate_length("description", description, 1, 2000)
}

/// Validates a search keyword.
///
/// ## Rules
/// - Can be empty (no filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed keyword.
pub fn validate_search_keyword(keyword: &str) -> ValidationResult<String> {
    let keyword = keyword.trim();

    if keyword.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "keyword".to_string(),
            max: 100,
        });
    }

    Ok(keyword.to_string())
}

/// Validates a person's display name (1 to 100 characters).
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    validate_length("name", name, 1, 100)
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use souq_core::validation::validate_email;
///
/// assert!(validate_email("dana@example.com").is_ok());
/// assert!(validate_email("dana@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = || ValidationError::invalid("email", "must be a valid email address");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }

    match domain.find('.') {
        Some(dot) if dot > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a plaintext password (at least 6 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
///
/// ## Example
/// ```rust
/// use souq_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product rating (1 to 5).
pub fn validate_rate(rate: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 1,
            max: 5,
        });
    }

    Ok(())
}

/// Validates a non-negative counter such as `number_of_sales`.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an order line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use souq_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_uuid_field("id", id)
}

/// Validates a UUID held in a named field (e.g. `category_id`).
pub fn validate_uuid_field(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id)
        .map_err(|_| ValidationError::invalid(field, "must be a valid UUID"))?;

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

pub fn validate_new_category(draft: &NewCategory) -> ValidationResult<()> {
    validate_category_name(&draft.name)?;
    validate_category_description(&draft.description)
}

pub fn validate_category_patch(patch: &CategoryPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_category_name(name)?;
    }
    if let Some(description) = &patch.description {
        validate_category_description(description)?;
    }
    Ok(())
}

pub fn validate_new_product(draft: &NewProduct) -> ValidationResult<()> {
    validate_product_title(&draft.title)?;
    validate_product_description(&draft.description)?;
    validate_price_cents(draft.price_cents)?;

    if let Some(category_id) = &draft.category_id {
        validate_uuid_field("category", category_id)?;
    }
    if let Some(rate) = draft.rate {
        validate_rate(rate)?;
    }
    if let Some(sales) = draft.number_of_sales {
        validate_non_negative("number_of_sales", sales)?;
    }

    Ok(())
}

pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(title) = &patch.title {
        validate_product_title(title)?;
    }
    if let Some(description) = &patch.description {
        validate_product_description(description)?;
    }
    if let Some(price) = patch.price_cents {
        validate_price_cents(price)?;
    }
    Ok(())
}

fn validate_order_items(items: &[OrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("products"));
    }

    for item in items {
        validate_uuid_field("product", &item.product_id)?;
        validate_quantity(item.quantity)?;
        if item.price_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "price".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_new_order(draft: &NewOrder) -> ValidationResult<()> {
    validate_uuid_field("user", &draft.user_id)?;
    validate_order_items(&draft.items)?;
    validate_non_negative("total_price", draft.total_price_cents)
}

pub fn validate_order_patch(patch: &OrderPatch) -> ValidationResult<()> {
    if let Some(user_id) = &patch.user_id {
        validate_uuid_field("user", user_id)?;
    }
    if let Some(items) = &patch.items {
        validate_order_items(items)?;
    }
    if let Some(total) = patch.total_price_cents {
        validate_non_negative("total_price", total)?;
    }
    Ok(())
}

pub fn validate_new_user(draft: &NewUser) -> ValidationResult<()> {
    validate_person_name(&draft.name)?;
    validate_email(&draft.email)?;
    validate_password(&draft.password)
}

pub fn validate_user_patch(patch: &UserPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_person_name(name)?;
    }
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    if let Some(password) = &patch.password {
        validate_password(password)?;
    }
    if let Some(roles) = &patch.roles {
        if roles.is_empty() {
            return Err(ValidationError::required("roles"));
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_category_name() {
        assert!(validate_category_name("Shoes").is_ok());
        assert!(validate_category_name("abc").is_ok());

        assert!(validate_category_name("").is_err());
        assert!(validate_category_name("  ").is_err());
        assert!(validate_category_name("ab").is_err());
        assert!(validate_category_name(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_category_description() {
        assert!(validate_category_description("Footwear category long enough").is_ok());
        assert!(validate_category_description("too short").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("dana@example.com").is_ok());
        assert!(validate_email("a.b@shop.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("dana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("dana@example.").is_err());
        assert!(validate_email("dana@.com").is_err());
        assert!(validate_email("da na@example.com").is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(1).is_ok());
        assert!(validate_rate(5).is_ok());
        assert!(validate_rate(0).is_err());
        assert!(validate_rate(6).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut draft = NewProduct {
            title: "Runner".into(),
            description: "Light running shoe".into(),
            price_cents: 4999,
            ..Default::default()
        };
        assert!(validate_new_product(&draft).is_ok());

        draft.category_id = Some("nope".into());
        assert!(validate_new_product(&draft).is_err());

        draft.category_id = None;
        draft.rate = Some(9);
        assert!(validate_new_product(&draft).is_err());
    }

    #[test]
    fn test_validate_patches_only_check_present_fields() {
        assert!(validate_category_patch(&CategoryPatch::default()).is_ok());
        assert!(validate_category_patch(&CategoryPatch {
            name: Some("x".into()),
            description: None
        })
        .is_err());

        assert!(validate_product_patch(&ProductPatch {
            price_cents: Some(-1),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_validate_new_order() {
        let item = OrderItem {
            product_id: "550e8400-e29b-41d4-a716-446655440000".into(),
            quantity: 2,
            price_cents: 1500,
        };
        let order = NewOrder {
            user_id: "550e8400-e29b-41d4-a716-446655440001".into(),
            items: vec![item.clone()],
            total_price_cents: 3000,
            status: None,
        };
        assert!(validate_new_order(&order).is_ok());

        let empty = NewOrder {
            items: vec![],
            ..order.clone()
        };
        assert!(validate_new_order(&empty).is_err());

        let zero_qty = NewOrder {
            items: vec![OrderItem { quantity: 0, ..item }],
            ..order
        };
        assert!(validate_new_order(&zero_qty).is_err());
    }

    #[test]
    fn test_validate_new_user() {
        let user = NewUser {
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password: "hunter22".into(),
            roles: None,
        };
        assert!(validate_new_user(&user).is_ok());

        let weak = NewUser {
            password: "123".into(),
            ..user
        };
        assert!(validate_new_user(&weak).is_err());
    }
}
