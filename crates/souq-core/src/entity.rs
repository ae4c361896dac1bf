//! # Asset-Owning Entities
//!
//! Categories and products both own images held outside the database. The
//! [`AssetOwning`] trait captures what the generic entity manager needs to
//! know about them, so the create/update/delete lifecycle is written once.

use crate::error::ValidationResult;
use crate::types::{
    AssetRef, Category, CategoryPatch, NewCategory, NewProduct, Product, ProductPatch,
};
use crate::validation;

/// An entity whose record carries references to externally stored assets.
pub trait AssetOwning: Clone + Send + Sync + 'static {
    /// Entity name used in errors and logs ("Category", "Product").
    const KIND: &'static str;

    /// Fields required to create the entity.
    type Draft: Send + Sync + 'static;

    /// Partial update; absent fields are left untouched.
    type Patch: Send + Sync + 'static;

    fn id(&self) -> &str;

    /// Every asset the entity currently references.
    fn assets(&self) -> Vec<AssetRef>;

    fn validate_draft(draft: &Self::Draft) -> ValidationResult<()>;

    fn validate_patch(patch: &Self::Patch) -> ValidationResult<()>;
}

impl AssetOwning for Category {
    const KIND: &'static str = "Category";

    type Draft = NewCategory;
    type Patch = CategoryPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn assets(&self) -> Vec<AssetRef> {
        self.image.iter().cloned().collect()
    }

    fn validate_draft(draft: &NewCategory) -> ValidationResult<()> {
        validation::validate_new_category(draft)
    }

    fn validate_patch(patch: &CategoryPatch) -> ValidationResult<()> {
        validation::validate_category_patch(patch)
    }
}

impl AssetOwning for Product {
    const KIND: &'static str = "Product";

    type Draft = NewProduct;
    type Patch = ProductPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn assets(&self) -> Vec<AssetRef> {
        self.images.clone()
    }

    fn validate_draft(draft: &NewProduct) -> ValidationResult<()> {
        validation::validate_new_product(draft)
    }

    fn validate_patch(patch: &ProductPatch) -> ValidationResult<()> {
        validation::validate_product_patch(patch)
    }
}
