pub mod activity;
pub mod clock;
pub mod db;
pub mod error;
pub mod prefs;
pub mod recap;
pub mod rotation;
pub mod schema;
pub mod theme;

pub use db::Database;
pub use error::{Result, SelahError};
