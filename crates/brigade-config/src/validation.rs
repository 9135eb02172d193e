// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, URL schemes, and backoff
//! parameter relationships.

use crate::diagnostic::ConfigError;
use crate::model::BrigadeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BrigadeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate hub.host is not empty and looks like an IP or hostname
    let host = config.hub.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "hub.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("hub.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.hub.queue_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "hub.queue_capacity must be at least 1".to_string(),
        });
    }

    // Validate client endpoint scheme
    let endpoint = config.client.endpoint.trim();
    if !endpoint.starts_with("ws://") && !endpoint.starts_with("wss://") {
        errors.push(ConfigError::Validation {
            message: format!("client.endpoint `{endpoint}` must use a ws:// or wss:// scheme"),
        });
    }

    if config.client.heartbeat_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "client.heartbeat_interval_secs must be at least 1".to_string(),
        });
    }

    if config.client.backoff_base_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "client.backoff_base_ms must be at least 1".to_string(),
        });
    }

    if config.client.backoff_cap_ms < config.client.backoff_base_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.backoff_cap_ms ({}) must be >= client.backoff_base_ms ({})",
                config.client.backoff_cap_ms, config.client.backoff_base_ms
            ),
        });
    }

    if config.client.max_reconnect_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "client.max_reconnect_attempts must be at least 1".to_string(),
        });
    }

    // Validate store base URL scheme
    let base_url = config.store.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("store.base_url `{base_url}` must use an http:// or https:// scheme"),
        });
    }

    if config.store.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
