pub mod config;
pub mod error;
pub mod http_probe;
pub mod suite;
