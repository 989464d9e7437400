pub mod locations;
pub mod push;
pub mod weather;
