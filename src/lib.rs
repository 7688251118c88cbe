pub mod app;
pub mod cli;
pub mod config;
pub mod list;
pub mod prompt;
pub mod storage;
pub mod tasks;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
