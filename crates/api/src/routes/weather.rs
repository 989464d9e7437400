use axum::routing::get;
use axum::Router;

use crate::handlers::weather;
use crate::state::AppState;

/// Routes mounted at `/api/weather`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(weather::get_weather))
}
