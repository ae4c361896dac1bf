//! # souq-api: HTTP Surface
//!
//! A thin axum layer that decodes requests, checks the caller's role and
//! hands off to the services in `souq-service`.
//!
//! ## Module Structure
//! ```text
//! souq_api/
//! ├── config.rs     - ApiConfig loaded from the environment
//! ├── error.rs      - ApiError {code, message} with HTTP status mapping
//! ├── state.rs      - AppState: the wired services
//! ├── auth.rs       - CurrentUser extractor and role guard
//! ├── multipart.rs  - Text fields + image parts from multipart bodies
//! └── routes/       - Handlers grouped by resource
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod multipart;
pub mod routes;
pub mod state;

use axum::Router;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, SharedState};

/// Builds the application router over the given state.
pub fn app(state: SharedState) -> Router {
    routes::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use souq_db::{Database, DbConfig};
    use souq_media::MemoryAssetStore;

    const BOUNDARY: &str = "souq-test-boundary";

    async fn test_app() -> (Router, Arc<MemoryAssetStore>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryAssetStore::new());
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        let state = Arc::new(AppState::new(config, db, store.clone()));
        (app(state), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_request(
        method: Method,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str)],
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (file_name, content_type) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(&[0x89, 0x50, 0x4e, 0x47]);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn signup(app: &Router, email: &str, roles: Value) -> String {
        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/auth/signup",
                None,
                json!({"name": "Dana", "email": email, "password": "secret123", "roles": roles}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app().await;
        let (status, body) = send(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (app, _) = test_app().await;
        signup(&app, "dana@example.com", json!(null)).await;

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/auth/login",
                None,
                json!({"email": "DANA@example.com", "password": "secret123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/auth/login",
                None,
                json!({"email": "dana@example.com", "password": "wrong-password"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_mutation_requires_token_and_role() {
        let (app, store) = test_app().await;

        let (status, _) = send(
            &app,
            json_request(Method::DELETE, "/categories/x", None, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = signup(&app, "shopper@example.com", json!(["user"])).await;
        let request = multipart_request(
            Method::POST,
            "/categories",
            &token,
            &[("name", "Shoes"), ("description", "All kinds of footwear")],
            &[("shoes.png", "image/png")],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
        assert!(store.upload_attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_category_lifecycle_over_http() {
        let (app, store) = test_app().await;
        let token = signup(&app, "admin@example.com", json!(["admin"])).await;

        let request = multipart_request(
            Method::POST,
            "/categories",
            &token,
            &[("name", "Shoes"), ("description", "All kinds of footwear")],
            &[("shoes.png", "image/png")],
        );
        let (status, created) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Shoes");
        let id = created["id"].as_str().unwrap().to_string();
        let public_id = created["image"]["publicId"].as_str().unwrap().to_string();
        assert!(store.contains(&public_id).await);

        let (status, list) = send(&app, get("/categories?page=1&keyword=sho", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let request = multipart_request(
            Method::PUT,
            &format!("/categories/{id}"),
            &token,
            &[("name", "Boots")],
            &[],
        );
        let (status, updated) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Boots");
        assert_eq!(updated["image"]["publicId"], public_id.as_str());

        let (status, _) = send(
            &app,
            json_request(Method::DELETE, &format!("/categories/{id}"), Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.delete_attempts().await, vec![public_id]);

        let (status, body) = send(&app, get(&format!("/categories/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_rejected_image_type_is_bad_request() {
        let (app, store) = test_app().await;
        let token = signup(&app, "mod@example.com", json!(["moderator"])).await;

        let request = multipart_request(
            Method::POST,
            "/products",
            &token,
            &[
                ("title", "Runner"),
                ("description", "Light running shoe"),
                ("priceCents", "4999"),
            ],
            &[("runner.svg", "image/svg+xml")],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(store.upload_attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_product_without_price_is_rejected() {
        let (app, store) = test_app().await;
        let token = signup(&app, "mod@example.com", json!(["moderator"])).await;

        let request = multipart_request(
            Method::POST,
            "/products",
            &token,
            &[("title", "Runner"), ("description", "Light running shoe")],
            &[("runner.png", "image/png")],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "priceCents is required");
        assert!(store.upload_attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_product_list_populates_category() {
        let (app, _) = test_app().await;
        let token = signup(&app, "admin@example.com", json!(["admin"])).await;

        let request = multipart_request(
            Method::POST,
            "/categories",
            &token,
            &[("name", "Shoes"), ("description", "All kinds of footwear")],
            &[("shoes.png", "image/png")],
        );
        let (_, category) = send(&app, request).await;
        let category_id = category["id"].as_str().unwrap().to_string();

        let request = multipart_request(
            Method::POST,
            "/products",
            &token,
            &[
                ("title", "Runner"),
                ("description", "Light running shoe"),
                ("priceCents", "4999"),
                ("categoryId", category_id.as_str()),
            ],
            &[("runner.png", "image/png")],
        );
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = send(&app, get("/products", None)).await;
        assert_eq!(status, StatusCode::OK);
        let products = list.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["title"], "Runner");
        assert_eq!(products[0]["category"]["name"], "Shoes");
    }

    #[tokio::test]
    async fn test_orders_require_authentication() {
        let (app, _) = test_app().await;
        let (status, _) = send(&app, get("/orders", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = signup(&app, "dana@example.com", json!(null)).await;
        let (status, body) = send(&app, get("/orders?status=pending", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = send(&app, get("/orders?status=lost", Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
