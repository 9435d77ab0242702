//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default page database API endpoint
pub const DEFAULT_STORE_BASE_URL: &str = "https://api.notion.com/v1";
/// API version pinned in the `Notion-Version` header
pub const DEFAULT_STORE_API_VERSION: &str = "2022-06-28";

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Secret that grants privileged access through the `api-key` header
    pub api_key: Option<String>,
    /// Base URL of the record store API
    pub store_base_url: String,
    /// Bearer token for the record store; the in-memory store is used without one
    pub store_api_token: Option<String>,
    /// Record store API version header
    pub store_api_version: String,
    /// Timeout for each record store request, in seconds
    pub store_timeout_secs: u64,
    /// Database backing `/members`
    pub members_database_id: Option<String>,
    /// Database backing `/students`
    pub students_database_id: Option<String>,
    /// Database backing `/projects`
    pub projects_database_id: Option<String>,
    /// Redis connection URL; the in-process cache is used without one
    pub redis_url: Option<String>,
    /// Listing cache TTL in seconds
    pub cache_ttl: u64,
    /// Budget for a single cache call before it counts as a miss, in milliseconds
    pub cache_timeout_ms: u64,
    /// Maximum entries held by the in-process cache
    pub cache_max_entries: usize,
    /// In-process cache sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `API_KEY` - Privileged credential (default: unset, nobody is privileged)
    /// - `STORE_BASE_URL` - Record store endpoint (default: the public page API)
    /// - `STORE_API_TOKEN` - Record store token (default: unset, in-memory store)
    /// - `STORE_API_VERSION` - Record store API version (default: 2022-06-28)
    /// - `STORE_TIMEOUT_SECS` - Record store request timeout (default: 10)
    /// - `MEMBERS_DATABASE_ID`, `STUDENTS_DATABASE_ID`, `PROJECTS_DATABASE_ID` -
    ///   database per collection; a collection without one is not served, except
    ///   that the in-memory store serves all three when none is set
    /// - `REDIS_URL` - Listing cache (default: unset, in-process cache)
    /// - `CACHE_TTL_SECS` - Listing cache TTL (default: 10)
    /// - `CACHE_TIMEOUT_MS` - Cache call timeout (default: 500)
    /// - `CACHE_MAX_ENTRIES` - In-process cache capacity (default: 64)
    /// - `CLEANUP_INTERVAL` - In-process cache sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            api_key: non_empty("API_KEY"),
            store_base_url: non_empty("STORE_BASE_URL").unwrap_or(defaults.store_base_url),
            store_api_token: non_empty("STORE_API_TOKEN"),
            store_api_version: non_empty("STORE_API_VERSION")
                .unwrap_or(defaults.store_api_version),
            store_timeout_secs: parsed("STORE_TIMEOUT_SECS")
                .unwrap_or(defaults.store_timeout_secs),
            members_database_id: non_empty("MEMBERS_DATABASE_ID"),
            students_database_id: non_empty("STUDENTS_DATABASE_ID"),
            projects_database_id: non_empty("PROJECTS_DATABASE_ID"),
            redis_url: non_empty("REDIS_URL"),
            cache_ttl: parsed("CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl),
            cache_timeout_ms: parsed("CACHE_TIMEOUT_MS").unwrap_or(defaults.cache_timeout_ms),
            cache_max_entries: parsed("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            cleanup_interval: parsed("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            api_key: None,
            store_base_url: DEFAULT_STORE_BASE_URL.to_string(),
            store_api_token: None,
            store_api_version: DEFAULT_STORE_API_VERSION.to_string(),
            store_timeout_secs: 10,
            members_database_id: None,
            students_database_id: None,
            projects_database_id: None,
            redis_url: None,
            cache_ttl: 10,
            cache_timeout_ms: 500,
            cache_max_entries: 64,
            cleanup_interval: 1,
        }
    }
}
