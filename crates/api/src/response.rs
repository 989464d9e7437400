//! Shared response envelope types for API handlers.
//!
//! JSON endpoints wrap their payload in a `{ "data": ... }` envelope. The
//! weather endpoint is the exception: it returns the bare report, which is
//! the document the front-end renders and the one stored in the cache.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: city }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
