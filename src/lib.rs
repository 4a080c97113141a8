pub mod aggregate;
pub mod analyze;
pub mod catalog;
pub mod config;
pub mod db;
pub mod export;
pub mod ingest;
pub mod normalize;
pub mod resolve;

/// Application name for XDG paths
pub const APP_NAME: &str = "showtimings";
