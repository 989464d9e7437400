use axum::routing::{get, post};
use axum::Router;

use crate::handlers::push;
use crate::state::AppState;

/// Routes mounted at `/api/push`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/public-key", get(push::public_key))
        .route("/subscribe", post(push::subscribe))
        .route("/unsubscribe", post(push::unsubscribe))
        .route("/latest", get(push::latest))
}
