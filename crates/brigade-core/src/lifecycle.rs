// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status-transition state machine for orders and kitchen tokens.
//!
//! A proposed status must be an immediate successor of the current status
//! in the lifecycle graph. `delayed` is reachable from `pending` or
//! `preparing` and always returns to `preparing`; it never terminates the
//! order (there is no cancelled state). Skipping stages or moving backward
//! is rejected.
//!
//! `completed` has two successors: `delivered` for dine-in handoff and
//! `billed` directly for counter orders that skip the delivery stage.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::error::BrigadeError;
use crate::types::{EntityKind, KitchenToken, Order, OrderStatus, TokenStatus};

/// Immediate successors of an order status in the lifecycle graph.
pub fn order_successors(status: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match status {
        Pending => &[Preparing, Delayed],
        Preparing => &[Ready, Delayed],
        Delayed => &[Preparing],
        Ready => &[Completed],
        Completed => &[Delivered, Billed],
        Delivered => &[Billed],
        Billed => &[],
    }
}

/// Immediate successors of a kitchen-token status.
pub fn token_successors(status: TokenStatus) -> &'static [TokenStatus] {
    use TokenStatus::*;
    match status {
        Pending => &[Preparing, Delayed],
        Preparing => &[Ready, Delayed],
        Delayed => &[Preparing],
        Ready => &[Served],
        Served => &[],
    }
}

/// Whether `proposed` is a legal next status for an order at `current`.
pub fn is_valid_order_transition(current: OrderStatus, proposed: OrderStatus) -> bool {
    order_successors(current).contains(&proposed)
}

/// Whether `proposed` is a legal next status for a kitchen token at `current`.
pub fn is_valid_token_transition(current: TokenStatus, proposed: TokenStatus) -> bool {
    token_successors(current).contains(&proposed)
}

/// String-keyed validator for callers holding raw status values (e.g. a
/// PATCH body before it is parsed into typed entities). Unknown status
/// strings are never valid.
pub fn is_valid_transition(entity: EntityKind, current: &str, proposed: &str) -> bool {
    match entity {
        EntityKind::Order => match (OrderStatus::from_str(current), OrderStatus::from_str(proposed))
        {
            (Ok(c), Ok(p)) => is_valid_order_transition(c, p),
            _ => false,
        },
        EntityKind::KitchenToken => {
            match (TokenStatus::from_str(current), TokenStatus::from_str(proposed)) {
                (Ok(c), Ok(p)) => is_valid_token_transition(c, p),
                _ => false,
            }
        }
    }
}

/// Whether a kitchen token's status forbids its order from moving to
/// `proposed`. An order cannot be `ready` or beyond while its token is
/// still `pending`.
pub fn token_blocks_order(proposed: OrderStatus, token: TokenStatus) -> bool {
    use OrderStatus::*;
    let order_past_kitchen = matches!(proposed, Ready | Completed | Delivered | Billed);
    order_past_kitchen && token == TokenStatus::Pending
}

/// Return a transition timestamp strictly greater than `last`.
///
/// `updated_at` must strictly increase with each accepted transition even
/// when two transitions land inside the same clock tick.
fn monotonic_now(last: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > last {
        now
    } else {
        last + Duration::microseconds(1)
    }
}

impl Order {
    /// Apply a status transition, bumping `updated_at` strictly monotonically.
    ///
    /// Rejected transitions return [`BrigadeError::InvalidTransition`] with
    /// the current and attempted status; the order is left untouched.
    pub fn transition(&mut self, proposed: OrderStatus) -> Result<(), BrigadeError> {
        if !is_valid_order_transition(self.status, proposed) {
            return Err(BrigadeError::InvalidTransition {
                entity: EntityKind::Order,
                current: self.status.to_string(),
                attempted: proposed.to_string(),
            });
        }
        self.status = proposed;
        self.updated_at = monotonic_now(self.updated_at);
        Ok(())
    }
}

impl KitchenToken {
    /// Apply a status transition, bumping `started_at` strictly monotonically
    /// so elapsed-time displays derive from the last transition.
    pub fn transition(&mut self, proposed: TokenStatus) -> Result<(), BrigadeError> {
        if !is_valid_token_transition(self.status, proposed) {
            return Err(BrigadeError::InvalidTransition {
                entity: EntityKind::KitchenToken,
                current: self.status.to_string(),
                attempted: proposed.to_string(),
            });
        }
        self.status = proposed;
        self.started_at = monotonic_now(self.started_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderChannel, OrderId, TokenId};
    use proptest::prelude::*;

    const ALL_ORDER: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Delayed,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Delivered,
        OrderStatus::Billed,
    ];

    const ALL_TOKEN: [TokenStatus; 5] = [
        TokenStatus::Pending,
        TokenStatus::Preparing,
        TokenStatus::Delayed,
        TokenStatus::Ready,
        TokenStatus::Served,
    ];

    fn sample_order() -> Order {
        Order {
            id: OrderId("1".into()),
            order_number: "ORD-1001".into(),
            table_number: Some(4),
            status: OrderStatus::Pending,
            total: 180.0,
            channel: OrderChannel::Manual,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_token() -> KitchenToken {
        KitchenToken {
            id: TokenId("t1".into()),
            token_number: "T-1".into(),
            order_id: OrderId("1".into()),
            status: TokenStatus::Pending,
            urgent: false,
            started_at: Utc::now(),
        }
    }

    #[test]
    fn forward_chain_is_accepted() {
        for (from, to) in [
            (OrderStatus::Pending, OrderStatus::Preparing),
            (OrderStatus::Preparing, OrderStatus::Ready),
            (OrderStatus::Ready, OrderStatus::Completed),
            (OrderStatus::Completed, OrderStatus::Delivered),
            (OrderStatus::Delivered, OrderStatus::Billed),
        ] {
            assert!(is_valid_order_transition(from, to), "{from} -> {to}");
        }
    }

    #[test]
    fn delayed_loops_are_accepted() {
        assert!(is_valid_order_transition(OrderStatus::Pending, OrderStatus::Delayed));
        assert!(is_valid_order_transition(OrderStatus::Preparing, OrderStatus::Delayed));
        assert!(is_valid_order_transition(OrderStatus::Delayed, OrderStatus::Preparing));
        // Delayed only ever returns to preparing.
        assert!(!is_valid_order_transition(OrderStatus::Delayed, OrderStatus::Ready));
        assert!(!is_valid_order_transition(OrderStatus::Delayed, OrderStatus::Pending));
    }

    #[test]
    fn counter_orders_may_skip_delivered() {
        assert!(is_valid_order_transition(OrderStatus::Completed, OrderStatus::Billed));
    }

    #[test]
    fn backward_and_skip_moves_are_rejected() {
        assert!(!is_valid_order_transition(OrderStatus::Ready, OrderStatus::Pending));
        assert!(!is_valid_order_transition(OrderStatus::Pending, OrderStatus::Ready));
        assert!(!is_valid_order_transition(OrderStatus::Preparing, OrderStatus::Completed));
        assert!(!is_valid_order_transition(OrderStatus::Billed, OrderStatus::Pending));
    }

    #[test]
    fn billed_is_terminal() {
        for to in ALL_ORDER {
            assert!(!is_valid_order_transition(OrderStatus::Billed, to));
        }
    }

    #[test]
    fn served_is_terminal() {
        for to in ALL_TOKEN {
            assert!(!is_valid_token_transition(TokenStatus::Served, to));
        }
    }

    #[test]
    fn string_keyed_validator_matches_typed() {
        assert!(is_valid_transition(EntityKind::Order, "pending", "preparing"));
        assert!(!is_valid_transition(EntityKind::Order, "ready", "pending"));
        assert!(is_valid_transition(EntityKind::KitchenToken, "ready", "served"));
        assert!(!is_valid_transition(EntityKind::KitchenToken, "pending", "ready"));
        // Unknown statuses are never valid.
        assert!(!is_valid_transition(EntityKind::Order, "pending", "cancelled"));
        assert!(!is_valid_transition(EntityKind::Order, "bogus", "preparing"));
    }

    #[test]
    fn ord_1001_scenario() {
        let mut order = sample_order();
        let mut last = order.updated_at;

        for status in [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Billed,
        ] {
            order.transition(status).expect("step should be accepted");
            assert!(order.updated_at > last, "updated_at must strictly increase");
            last = order.updated_at;
        }

        let err = order.transition(OrderStatus::Pending).unwrap_err();
        match err {
            BrigadeError::InvalidTransition { current, attempted, .. } => {
                assert_eq!(current, "billed");
                assert_eq!(attempted, "pending");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Rejection leaves the order untouched.
        assert_eq!(order.status, OrderStatus::Billed);
        assert_eq!(order.updated_at, last);
    }

    #[test]
    fn rejected_ready_to_pending_after_partial_chain() {
        let mut order = sample_order();
        order.transition(OrderStatus::Preparing).unwrap();
        order.transition(OrderStatus::Ready).unwrap();
        assert!(order.transition(OrderStatus::Pending).is_err());
        assert_eq!(order.status, OrderStatus::Ready);
    }

    #[test]
    fn token_transition_bumps_started_at() {
        let mut token = sample_token();
        let before = token.started_at;
        token.transition(TokenStatus::Preparing).unwrap();
        assert!(token.started_at > before);
        assert!(token.transition(TokenStatus::Pending).is_err());
    }

    #[test]
    fn pending_token_blocks_ready_order() {
        assert!(token_blocks_order(OrderStatus::Ready, TokenStatus::Pending));
        assert!(token_blocks_order(OrderStatus::Completed, TokenStatus::Pending));
        assert!(!token_blocks_order(OrderStatus::Ready, TokenStatus::Preparing));
        assert!(!token_blocks_order(OrderStatus::Preparing, TokenStatus::Pending));
    }

    #[test]
    fn monotonic_now_advances_past_future_timestamp() {
        // Even if the last transition timestamp is ahead of the clock, the
        // next one must still be strictly greater.
        let future = Utc::now() + Duration::seconds(60);
        let next = monotonic_now(future);
        assert!(next > future);
    }

    proptest! {
        #[test]
        fn order_validator_accepts_exactly_the_graph(
            from_idx in 0usize..7,
            to_idx in 0usize..7,
        ) {
            let from = ALL_ORDER[from_idx];
            let to = ALL_ORDER[to_idx];
            let expected = order_successors(from).contains(&to);
            prop_assert_eq!(is_valid_order_transition(from, to), expected);
            // Self-transitions are never legal.
            if from == to {
                prop_assert!(!is_valid_order_transition(from, to));
            }
        }

        #[test]
        fn token_validator_accepts_exactly_the_graph(
            from_idx in 0usize..5,
            to_idx in 0usize..5,
        ) {
            let from = ALL_TOKEN[from_idx];
            let to = ALL_TOKEN[to_idx];
            prop_assert_eq!(
                is_valid_token_transition(from, to),
                token_successors(from).contains(&to)
            );
        }
    }
}
