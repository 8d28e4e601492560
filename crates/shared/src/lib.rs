//! Shared library for the seiyuu-report workspace.
//!
//! This crate provides common functionality used across the binary crates:
//! - Configuration management
//! - Data models
//! - File path utilities
//! - Logging infrastructure
//! - Browser launching

pub mod browser;
pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use paths::DataPaths;
