pub mod error;
pub use error::*;

pub mod config;
pub use config::*;

pub mod schema;
pub use schema::*;

pub mod pg_client;
pub use pg_client::*;

pub mod sample_fetcher;
pub use sample_fetcher::*;

pub mod db;
pub use db::*;
