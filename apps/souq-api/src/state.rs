//! Shared application state handed to every handler.

use std::sync::Arc;

use souq_core::UploadPolicy;
use souq_db::Database;
use souq_media::AssetStore;
use souq_service::{AccountService, CategoryService, JwtManager, OrderService, ProductService};

use crate::config::ApiConfig;

pub struct AppState {
    pub config: ApiConfig,
    pub db: Database,
    pub categories: CategoryService,
    pub products: ProductService,
    pub orders: OrderService,
    pub accounts: AccountService,
}

impl AppState {
    /// Wires the services. Categories and products each get their own
    /// upload policy value.
    pub fn new(config: ApiConfig, db: Database, store: Arc<dyn AssetStore>) -> Self {
        let category_policy =
            UploadPolicy::single_image().with_max_file_bytes(config.upload_max_file_bytes);
        let product_policy = UploadPolicy::images(config.max_product_images)
            .with_max_file_bytes(config.upload_max_file_bytes);

        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

        AppState {
            categories: CategoryService::new(
                db.clone(),
                store.clone(),
                category_policy,
                config.page_size,
            ),
            products: ProductService::new(db.clone(), store, product_policy, config.page_size),
            orders: OrderService::new(db.clone(), config.page_size),
            accounts: AccountService::new(db.clone(), jwt, config.page_size),
            db,
            config,
        }
    }
}

pub type SharedState = Arc<AppState>;
