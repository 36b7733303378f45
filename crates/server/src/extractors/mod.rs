pub mod actor;
pub mod json;
