pub mod config;
pub mod connection;

pub use crate::config::DatabaseSettings;
pub use crate::connection::{DbPool, connect_db};
