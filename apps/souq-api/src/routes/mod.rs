//! # Routes
//!
//! ```text
//! GET    /health
//! POST   /auth/signup              public
//! POST   /auth/login               public
//! GET    /users                    admin
//! GET    /users/{id}               admin
//! PUT    /users/{id}               admin
//! DELETE /users/{id}               admin
//! GET    /categories               public   ?page=&keyword=
//! POST   /categories               moderator|admin  multipart
//! GET    /categories/{id}          public
//! PUT    /categories/{id}          moderator|admin  multipart
//! DELETE /categories/{id}          moderator|admin
//! GET    /products                 public   ?page=&keyword=
//! POST   /products                 moderator|admin  multipart
//! GET    /products/{id}            public   (category populated)
//! PUT    /products/{id}            moderator|admin  multipart
//! DELETE /products/{id}            moderator|admin
//! GET    /orders                   authenticated  ?page=&status=
//! POST   /orders                   authenticated
//! GET    /orders/user/{user_id}    authenticated
//! GET    /orders/{id}              authenticated
//! PUT    /orders/{id}              authenticated
//! DELETE /orders/{id}              authenticated
//! ```

mod accounts;
mod categories;
mod orders;
mod products;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

/// Builds the full application router.
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(accounts::signup))
        .route("/auth/login", post(accounts::login))
        .route("/users", get(accounts::list))
        .route(
            "/users/{id}",
            get(accounts::get).put(accounts::update).delete(accounts::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/user/{user_id}", get(orders::list_by_user))
        .route(
            "/orders/{id}",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler(State(state): State<SharedState>) -> Json<Value> {
    let database = state.db.health_check().await;
    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
