pub mod health;
pub mod locations;
pub mod push;
pub mod weather;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /weather/{id}                 GET   canonical report (?name, ?region, ?source)
///
/// /locations/nearest            GET   nearest static city (?lat, ?lon)
///
/// /push/public-key              GET   VAPID application server key
/// /push/subscribe               POST  store or refresh a subscription
/// /push/unsubscribe             POST  delete a subscription
/// /push/latest                  GET   last message sent (?endpoint)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/weather", weather::router())
        .nest("/locations", locations::router())
        .nest("/push", push::router())
}
