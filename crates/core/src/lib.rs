//! Aeris domain layer.
//!
//! Pure, I/O-free building blocks shared by the HTTP server, the upstream
//! clients and the push notifier:
//!
//! - [`location`] / [`geo`]: location ids, naming heuristics, nearest city.
//! - [`codes`]: condition-code lookup tables for every provider.
//! - [`forecast`] / [`normalize`]: provider-neutral series and the
//!   canonical report built from them.
//! - [`alerts`] / [`rain`]: threshold alerts and rain notifications.

pub mod alerts;
pub mod codes;
pub mod error;
pub mod forecast;
pub mod geo;
pub mod location;
pub mod normalize;
pub mod rain;
pub mod source;
pub mod types;
