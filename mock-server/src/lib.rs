//! In-memory stand-in for the Trust Lifecycle Manager REST API.
//!
//! Serves every endpoint the client covers under `/mpki/api/v1`, backed by
//! a seeded [`Store`] behind one `RwLock`. Requests must carry
//! `X-API-Key`; errors use the vendor JSON shape except for unknown routes,
//! which get a plain-text 404.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    http::{StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub mod error;
pub mod query;
mod routes;
pub mod store;

pub use error::ApiError;
pub use store::Store;

/// Key accepted by [`app`].
pub const API_KEY: &str = "mock-api-key";

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Db {
        state.db.clone()
    }
}

/// Router accepting [`API_KEY`].
pub fn app() -> Router {
    app_with_key(API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(Store::seeded())),
    };

    let api = routes::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state);

    Router::new().nest("/mpki/api/v1", api).fallback(fallback)
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if presented != Some(&*state.api_key) {
        tracing::warn!(path = %request.uri().path(), "rejected request without a valid API key");
        return ApiError::unauthorized().into_response();
    }

    next.run(request).await
}

async fn fallback(uri: Uri) -> (StatusCode, &'static str) {
    tracing::debug!(path = %uri.path(), "no route");
    (StatusCode::NOT_FOUND, "404 page not found")
}
