pub mod config;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod metrics;
pub mod runner;
pub mod types;
pub mod watermark;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;
