pub mod config;
pub mod cosmos;
