use axum::routing::get;
use axum::Router;

use crate::handlers::locations;
use crate::state::AppState;

/// Routes mounted at `/api/locations`.
pub fn router() -> Router<AppState> {
    Router::new().route("/nearest", get(locations::nearest))
}
