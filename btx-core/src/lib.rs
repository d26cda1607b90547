//! Configuration, status caching and site health monitoring.
//!
//! The extraction pipeline itself lives in `btx-extractors`; this crate wires it to a config
//! file and watches the sites it depends on.
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod progress;

pub use cache::StatusCache;
pub use config::AppConfig;
pub use health::{targets_from, HealthMonitor, ProbeTarget};
