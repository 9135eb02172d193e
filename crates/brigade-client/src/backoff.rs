// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capped exponential backoff shared by reconnects and re-fetch retries.

use std::time::Duration;

use brigade_config::model::ClientConfig;

/// `delay(n) = min(base * 2^n, cap)`, giving up after `max_attempts`.
///
/// The same policy family governs both socket reconnects and re-fetch
/// retries against the entity store; the two track their attempt counters
/// independently.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    /// Build the policy from client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base: Duration::from_millis(config.backoff_base_ms),
            cap: Duration::from_millis(config.backoff_cap_ms),
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        let cap_ms = self.cap.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt.min(63)).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(factor).min(cap_ms))
    }

    /// Whether `attempt` failures exhaust the policy.
    pub fn exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}
