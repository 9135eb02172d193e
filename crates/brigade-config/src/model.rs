// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Brigade sync core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Brigade configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrigadeConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Broadcast hub server settings.
    #[serde(default)]
    pub hub: HubConfig,

    /// Client connection and reconciliation settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Persistence collaborator (REST store) settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "brigade".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Broadcast hub server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Host address to bind.
    #[serde(default = "default_hub_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_hub_port")]
    pub port: u16,

    /// Bound on each connection's outbound event queue. When a slow client
    /// overflows its queue, the oldest buffered event is dropped and the
    /// client is told to re-fetch on its next heartbeat.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_hub_host(),
            port: default_hub_port(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_hub_host() -> String {
    "127.0.0.1".to_string()
}

fn default_hub_port() -> u16 {
    8090
}

fn default_queue_capacity() -> usize {
    64
}

/// Client connection and reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// WebSocket endpoint of the hub.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Heartbeat ping interval in seconds.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Base delay for exponential reconnect backoff, in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Cap on the reconnect backoff delay, in milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Maximum reconnect attempts before giving up and signalling a fatal,
    /// user-visible connection-lost state.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Window for collapsing bursts of signal events into one re-fetch,
    /// in milliseconds.
    #[serde(default = "default_refetch_debounce_ms")]
    pub refetch_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            refetch_debounce_ms: default_refetch_debounce_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://127.0.0.1:8090/ws".to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_refetch_debounce_ms() -> u64 {
    250
}

/// Persistence collaborator (REST store) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the entity store REST API.
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_store_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}
