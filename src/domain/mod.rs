pub mod error;
pub mod formats;
pub mod models;
