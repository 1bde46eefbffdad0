// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional and has defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConciergeConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Realtime message feed settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Request lifecycle rules.
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// HTTP/WebSocket gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl ConciergeConfig {
    /// Top-level section names, used for typo suggestions.
    pub const SECTIONS: &'static [&'static str] =
        &["app", "storage", "realtime", "workflow", "gateway"];
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Name reported in logs and health responses.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "concierge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journaling.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("concierge").join("concierge.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "concierge.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Publish inserted messages to open conversations.
    #[serde(default = "default_realtime_enabled")]
    pub enabled: bool,

    /// Buffered messages per request before slow subscribers start skipping.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Upper bound on concurrent subscriptions across all requests.
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_realtime_enabled(),
            channel_capacity: default_channel_capacity(),
            max_subscribers: default_max_subscribers(),
        }
    }
}

fn default_realtime_enabled() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    64
}

fn default_max_subscribers() -> usize {
    1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Reject status writes that are not edges of the lifecycle graph.
    /// `false` accepts any status over any other.
    #[serde(default = "default_strict_transitions")]
    pub strict_transitions: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            strict_transitions: default_strict_transitions(),
        }
    }
}

fn default_strict_transitions() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Shared secret the upstream auth proxy presents as a bearer token.
    /// `None` trusts the identity header alone.
    #[serde(default)]
    pub proxy_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            proxy_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8480
}
