pub mod db;
pub mod fingerprints;
pub mod models;
pub mod schema;
pub mod search_cache;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
