//! Web Push delivery and the rain-alert background job.
//!
//! Notifications are payload-less: the push only wakes the service worker,
//! which then fetches the message recorded for its subscription from
//! `GET /api/push/latest`. That keeps the server free of the Web Push
//! payload encryption scheme while still authenticating with VAPID.

pub mod error;
pub mod rain_watch;
pub mod sender;
pub mod vapid;

pub use error::PushError;
pub use rain_watch::{NowcastProvider, RainWatch, RainWatchConfig};
pub use sender::{PushSender, PushTransport};
pub use vapid::VapidSigner;
