pub mod chain;
pub mod database;
pub mod listener;
