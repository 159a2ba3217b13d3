//! API route definitions

mod articles;
mod health;
mod images;
mod sentiments;
mod stream;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(articles::routes())
        .merge(sentiments::routes())
        .merge(stream::routes())
        .merge(images::routes())
}
