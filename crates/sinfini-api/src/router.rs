use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::middleware::require_auth;
use crate::uploads::MAX_UPLOAD_SIZE;
use crate::{AppState, auth, blog, chatbot, contact, dashboard, gallery, products};

/// All `/api` routes plus `/health`. Static upload serving, CORS and request
/// tracing are layered on by the server binary.
pub fn api_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/blog", get(blog::list_posts))
        .route("/api/blog/{id}", get(blog::get_post))
        .route("/api/gallery", get(gallery::list_items))
        .route("/api/chatbot/settings", get(chatbot::get_settings))
        .route("/api/chatbot/message", post(chatbot::message))
        .route("/api/contact", post(contact::submit))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/products", post(products::create_product))
        .route("/api/products/{id}", put(products::update_product))
        .route("/api/products/{id}", delete(products::delete_product))
        .route("/api/blog", post(blog::create_post))
        .route("/api/blog/{id}", put(blog::update_post))
        .route("/api/blog/{id}", delete(blog::delete_post))
        .route("/api/gallery", post(gallery::create_item))
        .route("/api/gallery/{id}", delete(gallery::delete_item))
        .route("/api/chatbot/settings", put(chatbot::update_settings))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
