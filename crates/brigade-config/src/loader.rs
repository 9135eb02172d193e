// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./brigade.toml` > `~/.config/brigade/brigade.toml` > `/etc/brigade/brigade.toml`
//! with environment variable overrides via `BRIGADE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BrigadeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/brigade/brigade.toml` (system-wide)
/// 3. `~/.config/brigade/brigade.toml` (user XDG config)
/// 4. `./brigade.toml` (local directory)
/// 5. `BRIGADE_*` environment variables
pub fn load_config() -> Result<BrigadeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadeConfig::default()))
        .merge(Toml::file("/etc/brigade/brigade.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("brigade/brigade.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("brigade.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BrigadeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BrigadeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrigadeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BRIGADE_CLIENT_BACKOFF_BASE_MS` must
/// map to `client.backoff_base_ms`, not `client.backoff.base.ms`.
fn env_provider() -> Env {
    Env::prefixed("BRIGADE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BRIGADE_CLIENT_ENDPOINT -> "client_endpoint"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("hub_", "hub.", 1)
            .replacen("client_", "client.", 1)
            .replacen("store_", "store.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.hub.port, 8090);
        assert_eq!(config.client.max_reconnect_attempts, 10);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [client]
            heartbeat_interval_secs = 15
            backoff_cap_ms = 60000

            [hub]
            port = 9001
            "#,
        )
        .unwrap();
        assert_eq!(config.client.heartbeat_interval_secs, 15);
        assert_eq!(config.client.backoff_cap_ms, 60_000);
        assert_eq!(config.hub.port, 9001);
        // Untouched keys keep their defaults.
        assert_eq!(config.client.backoff_base_ms, 500);
    }

    #[test]
    fn unknown_section_key_errors() {
        let result = load_config_from_str("[client]\nhartbeat_interval_secs = 5\n");
        assert!(result.is_err());
    }
}
