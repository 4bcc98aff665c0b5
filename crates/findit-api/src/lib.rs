pub mod auth;
pub mod error;
pub mod items;
pub mod middleware;
pub mod pages;
pub mod reports;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::services::ServeDir;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

/// Build the full route table. Logging layers are added by the binary.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::start))
        .route("/register", get(pages::register).post(auth::register))
        .route("/login", get(pages::login).post(auth::login))
        .route("/find", get(pages::find).post(pages::find))
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(state.photos.dir()));

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/lost", get(items::dashboard))
        .route("/list", get(items::list_items))
        .route("/my_items", get(items::my_items))
        .route("/register_item", post(items::register_item))
        .route("/report/{item_id}", post(reports::submit_report))
        .route("/my_items/action", post(reports::handle_report))
        .layer(from_fn_with_state(state.clone(), middleware::require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "ok"
}

/// Run blocking store or hashing work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("spawn_blocking join error: {e}")))?
}
