use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, clear_snapshot, create_book, create_loan, create_member, delete_book,
    delete_member, flush_snapshot, get_book, get_loan, get_member, get_stats, list_books,
    list_categories, list_loans, list_members, return_loan, update_book, update_member,
};

/// Creates the API router with all circulation endpoints
///
/// Catalog:
/// - GET/POST /books, GET /books/categories
/// - GET/PUT/DELETE /books/:id
/// - GET/POST /members, GET/PUT/DELETE /members/:id
///
/// Circulation:
/// - GET/POST /loans, GET /loans/:id
/// - POST /loans/:id/return
///
/// Reporting and maintenance:
/// - GET /stats
/// - POST /snapshot, DELETE /snapshot (clear all data)
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog
        .route("/books", get(list_books).post(create_book))
        .route("/books/categories", get(list_categories))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        // Circulation
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/:id", get(get_loan))
        .route("/loans/:id/return", post(return_loan))
        // Reporting
        .route("/stats", get(get_stats))
        .route("/snapshot", post(flush_snapshot).delete(clear_snapshot))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
