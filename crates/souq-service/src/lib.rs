//! # souq-service: Business Services
//!
//! Everything between the HTTP layer and the two backends.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  souq-api handlers                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────────────┐ ┌────────────────┐ ┌──────────────┐ ┌────────────┐ │
//! │  │CategoryService │ │ ProductService │ │ OrderService │ │AccountSvc  │ │
//! │  └───────┬────────┘ └───────┬────────┘ └──────┬───────┘ └─────┬──────┘ │
//! │          └────────┬─────────┘                 │               │        │
//! │                   ▼                           │               │        │
//! │          AssetManager<E: AssetOwning>         │               │        │
//! │            │                  │               │               │        │
//! │            ▼                  ▼               ▼               ▼        │
//! │   dyn EntityRepository<E>  dyn AssetStore   Database      Database    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The manager never sees a concrete database or asset store, so tests
//! swap in recording or failing collaborators freely.

pub mod account;
pub mod auth;
pub mod category;
pub mod error;
pub mod manager;
pub mod order;
pub mod product;
pub mod repository;

pub use account::{AccountService, AuthToken};
pub use auth::{Claims, JwtManager};
pub use category::CategoryService;
pub use error::{ServiceError, ServiceResult};
pub use manager::AssetManager;
pub use order::OrderService;
pub use product::ProductService;
pub use repository::EntityRepository;
