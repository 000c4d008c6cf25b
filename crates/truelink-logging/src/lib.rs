pub mod config;
pub mod init;
pub mod targets;

pub use config::LoggingConfig;
pub use init::{apply, init, LoggingGuards};
