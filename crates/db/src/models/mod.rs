//! Row types and DTOs for each table.

pub mod subscription;
pub mod weather_cache;
