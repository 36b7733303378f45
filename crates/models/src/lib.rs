pub mod activity;
pub mod assignment;
pub mod availability;
pub mod days;
pub mod grid;
pub mod identity;
#[cfg(feature = "database")]
mod persist;
pub mod publication;
pub mod slot;
