//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the background poll loop.

use herakles_zfs_exporter::health_stats::HealthStats;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::cache::MetricsCache;
use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and the poll loop.
pub struct AppState {
    pub cache: RwLock<MetricsCache>,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
