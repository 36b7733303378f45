pub mod db;
pub mod entities;
pub mod error;
pub mod notification;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
