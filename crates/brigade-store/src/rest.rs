// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the entity store REST API.
//!
//! Provides [`RestStore`], the production [`EntityStore`] implementation.
//! Status transitions are validated against the lifecycle graph before any
//! PATCH is issued, so an illegal transition never reaches the wire. Order
//! transitions that would outrun the kitchen also consult the order's
//! kitchen tokens.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use async_trait::async_trait;
use brigade_core::lifecycle::{
    is_valid_order_transition, is_valid_token_transition, token_blocks_order,
};
use brigade_core::types::{
    Bill, EntityKind, KitchenToken, Order, OrderDraft, OrderId, OrderStatus, StatsSnapshot,
    TokenId, TokenStatus,
};
use brigade_core::{BrigadeError, EntityStore};

/// PATCH body for a status transition request.
#[derive(Debug, Serialize)]
struct StatusPatch<S: Serialize> {
    status: S,
}

/// HTTP client for the entity store.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    /// Creates a new store client.
    ///
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`; the
    /// collection paths (`/orders`, `/kitchen-tokens`, `/bills`, `/stats`)
    /// hang off it.
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self, BrigadeError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| BrigadeError::Store {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BrigadeError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await.map_err(|e| {
            BrigadeError::Store {
                message: format!("GET {url} failed: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        Self::decode_response(response, "GET", path).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, BrigadeError> {
        let url = self.url(path);
        let method_name = method.to_string();
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| BrigadeError::Store {
                message: format!("{method_name} {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::decode_response(response, &method_name, path).await
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
        method: &str,
        path: &str,
    ) -> Result<T, BrigadeError> {
        let status = response.status();
        debug!(%status, method, path, "store response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrigadeError::Store {
                message: format!("{method} {path} returned {status}: {body}"),
                source: None,
            });
        }

        response.json::<T>().await.map_err(|e| BrigadeError::Store {
            message: format!("{method} {path} returned malformed body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl EntityStore for RestStore {
    async fn fetch_orders(&self) -> Result<Vec<Order>, BrigadeError> {
        self.get_json("/orders").await
    }

    async fn fetch_kitchen_tokens(&self) -> Result<Vec<KitchenToken>, BrigadeError> {
        self.get_json("/kitchen-tokens").await
    }

    async fn fetch_bills(&self) -> Result<Vec<Bill>, BrigadeError> {
        self.get_json("/bills").await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, BrigadeError> {
        self.get_json("/stats").await
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, BrigadeError> {
        self.send_json(reqwest::Method::POST, "/orders", &draft).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        proposed: OrderStatus,
    ) -> Result<Order, BrigadeError> {
        // Validate against the current authoritative status before writing.
        let current: Order = self.get_json(&format!("/orders/{}", id.0)).await?;
        if !is_valid_order_transition(current.status, proposed) {
            return Err(BrigadeError::InvalidTransition {
                entity: EntityKind::Order,
                current: current.status.to_string(),
                attempted: proposed.to_string(),
            });
        }
        // Kitchen gate: the token fetch is only worth the round trip for
        // statuses a pending token can block.
        if token_blocks_order(proposed, TokenStatus::Pending) {
            let tokens: Vec<KitchenToken> = self.get_json("/kitchen-tokens").await?;
            if let Some(token) = tokens
                .iter()
                .find(|t| t.order_id == *id && token_blocks_order(proposed, t.status))
            {
                debug!(token = %token.id.0, order = %id.0, "transition blocked by kitchen token");
                return Err(BrigadeError::InvalidTransition {
                    entity: EntityKind::Order,
                    current: current.status.to_string(),
                    attempted: proposed.to_string(),
                });
            }
        }
        self.send_json(
            reqwest::Method::PATCH,
            &format!("/orders/{}", id.0),
            &StatusPatch { status: proposed },
        )
        .await
    }

    async fn update_token_status(
        &self,
        id: &TokenId,
        proposed: TokenStatus,
    ) -> Result<KitchenToken, BrigadeError> {
        let current: KitchenToken = self.get_json(&format!("/kitchen-tokens/{}", id.0)).await?;
        if !is_valid_token_transition(current.status, proposed) {
            return Err(BrigadeError::InvalidTransition {
                entity: EntityKind::KitchenToken,
                current: current.status.to_string(),
                attempted: proposed.to_string(),
            });
        }
        self.send_json(
            reqwest::Method::PATCH,
            &format!("/kitchen-tokens/{}", id.0),
            &StatusPatch { status: proposed },
        )
        .await
    }
}
