//! # souq-core: Pure Domain Logic for Souq
//!
//! This crate holds the storefront's domain model and every rule that can be
//! checked without touching a database or the image host.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Souq Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/souq-api (axum)                         │   │
//! │  │    /categories  /products  /orders  /auth  /users               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    souq-service                                 │   │
//! │  │    AssetManager<Category>, AssetManager<Product>, OrderService  │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │                                     │                    │
//! │  ┌───────────▼───────────┐             ┌───────────▼───────────┐       │
//! │  │       souq-db         │             │      souq-media       │       │
//! │  │   SQLite documents    │             │   Cloudinary images   │       │
//! │  └───────────────────────┘             └───────────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ souq-core (THIS CRATE) ★                        │   │
//! │  │   types │ entity │ upload │ validation │ pagination │ error     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Order, User, AssetRef)
//! - [`entity`] - The [`AssetOwning`] trait shared by image-owning entities
//! - [`upload`] - [`UploadPolicy`], the immutable upload limits
//! - [`validation`] - Field validation
//! - [`pagination`] - Page/keyword query parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use souq_core::{UploadFile, UploadPolicy};
//!
//! let policy = UploadPolicy::single_image();
//! let logo = UploadFile::new("logo.png", "image/png", vec![0u8; 1024]);
//!
//! assert!(policy.validate(&[logo]).is_ok());
//! assert!(policy.validate(&[]).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod entity;
pub mod error;
pub mod pagination;
pub mod types;
pub mod upload;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use entity::AssetOwning;
pub use error::{ValidationError, ValidationResult};
pub use pagination::{ListFilter, PageQuery};
pub use types::*;
pub use upload::UploadPolicy;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Content types accepted for image uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// Maximum size of a single uploaded image (2 MiB).
pub const DEFAULT_MAX_FILE_BYTES: usize = 2 * 1024 * 1024;

/// Maximum number of images attached to one product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// Default number of records returned per page by list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 4;
