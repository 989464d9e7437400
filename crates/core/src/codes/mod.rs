//! Lookup tables translating provider condition codes into WMO codes, and
//! WMO codes into display text and icons.
//!
//! Every provider is normalized to WMO codes first so a single table
//! ([`wmo::decode_wmo`]) drives all icons and descriptions.

pub mod aemet;
pub mod weatherapi;
pub mod wmo;

pub use aemet::aemet_sky_to_wmo;
pub use weatherapi::weatherapi_to_wmo;
pub use wmo::{decode_wmo, Decoded, UNKNOWN_CODE};
