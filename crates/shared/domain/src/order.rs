//! Order entity and its lifecycle state machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    DURATION_MAX_DIGITS, DURATION_SCALE, MAX_DISPLAY_NAME_LENGTH, MAX_GAME_NAME_LENGTH,
    REASON_APPROVED, REASON_REJECTED,
};
use crate::error::{DomainError, DomainResult};

/// Order status. Also the set of states of the lifecycle state machine.
///
/// ```text
/// PENDING_REVIEW -> REVIEW_APPROVED | REVIEW_REJECTED
/// REVIEW_APPROVED -> IN_PROGRESS
/// IN_PROGRESS -> COMPLETED
/// ```
///
/// `Cancelled` is reserved; no operation currently leads to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingReview,
    ReviewRejected,
    ReviewApproved,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::PendingReview,
        OrderStatus::ReviewRejected,
        OrderStatus::ReviewApproved,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Canonical storage and wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingReview => "PENDING_REVIEW",
            OrderStatus::ReviewRejected => "REVIEW_REJECTED",
            OrderStatus::ReviewApproved => "REVIEW_APPROVED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// No operation leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::ReviewRejected | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    /// Apply a lifecycle operation to this status.
    pub fn apply(self, op: LifecycleOp) -> DomainResult<OrderStatus> {
        transition(self, op)
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::internal(format!("unknown order status: {}", s)))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations that move an existing order through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Review { approve: bool },
    Accept,
    Complete,
}

impl LifecycleOp {
    /// Status the order must be in for the operation to apply
    pub fn required_status(&self) -> OrderStatus {
        match self {
            LifecycleOp::Review { .. } => OrderStatus::PendingReview,
            LifecycleOp::Accept => OrderStatus::ReviewApproved,
            LifecycleOp::Complete => OrderStatus::InProgress,
        }
    }

    /// Status the order ends up in when the operation succeeds
    pub fn target_status(&self) -> OrderStatus {
        match self {
            LifecycleOp::Review { approve: true } => OrderStatus::ReviewApproved,
            LifecycleOp::Review { approve: false } => OrderStatus::ReviewRejected,
            LifecycleOp::Accept => OrderStatus::InProgress,
            LifecycleOp::Complete => OrderStatus::Completed,
        }
    }
}

/// Transition legality: `(current, op) -> new status`.
///
/// Pure; performs no I/O. The caller persists the result.
pub fn transition(current: OrderStatus, op: LifecycleOp) -> DomainResult<OrderStatus> {
    let expected = op.required_status();
    if current != expected {
        return Err(DomainError::invalid_state(current, expected));
    }
    Ok(op.target_status())
}

/// Validate an order duration and normalize it to exactly two decimal places.
///
/// Rejects non-positive values, more than two decimal places and values
/// that do not fit NUMERIC(6,2).
pub fn normalize_duration(hours: Decimal) -> DomainResult<Decimal> {
    if hours <= Decimal::ZERO {
        return Err(DomainError::validation("duration_hours must be greater than 0"));
    }
    if hours.normalize().scale() > DURATION_SCALE {
        return Err(DomainError::validation(
            "duration_hours must have at most 2 decimal places",
        ));
    }
    let limit = Decimal::from(10i64.pow(DURATION_MAX_DIGITS - DURATION_SCALE));
    if hours >= limit {
        return Err(DomainError::validation("duration_hours is too large"));
    }

    let mut normalized = hours;
    normalized.rescale(DURATION_SCALE);
    Ok(normalized)
}

/// Order domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub game_name: String,
    /// Price in minor currency units
    pub amount_cents: i64,
    /// Hours, two decimal places
    pub duration_hours: Decimal,
    pub status: OrderStatus,
    pub boss_kook_id: String,
    pub boss_kook_name: String,
    pub player_kook_id: Option<String>,
    pub player_kook_name: Option<String>,
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for order creation
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub game_name: String,
    pub amount_cents: i64,
    pub duration_hours: Decimal,
    pub boss_kook_id: String,
    pub boss_kook_name: String,
}

impl NewOrder {
    /// Validate raw creation input.
    ///
    /// Trims the task description and normalizes the duration.
    pub fn new(
        game_name: impl Into<String>,
        amount_cents: i64,
        duration_hours: Decimal,
        boss_kook_id: impl Into<String>,
        boss_kook_name: impl Into<String>,
    ) -> DomainResult<Self> {
        let game_name = game_name.into().trim().to_string();
        if game_name.is_empty() {
            return Err(DomainError::validation("game_name is required"));
        }
        check_length("game_name", &game_name, MAX_GAME_NAME_LENGTH)?;
        if amount_cents < 0 {
            return Err(DomainError::validation("amount_cents must be >= 0"));
        }
        let boss_kook_id = boss_kook_id.into();
        require_identity("boss_kook_id", &boss_kook_id)?;
        let boss_kook_name = boss_kook_name.into();
        check_length("boss_kook_name", &boss_kook_name, MAX_DISPLAY_NAME_LENGTH)?;

        Ok(Self {
            game_name,
            amount_cents,
            duration_hours: normalize_duration(duration_hours)?,
            boss_kook_id,
            boss_kook_name,
        })
    }
}

/// Order creation command, as received from callers
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub game_name: String,
    pub amount_cents: i64,
    pub duration_hours: Decimal,
    pub boss_kook_id: String,
    pub boss_kook_name: String,
}

impl TryFrom<CreateOrder> for NewOrder {
    type Error = DomainError;

    fn try_from(cmd: CreateOrder) -> Result<Self, Self::Error> {
        NewOrder::new(
            cmd.game_name,
            cmd.amount_cents,
            cmd.duration_hours,
            cmd.boss_kook_id,
            cmd.boss_kook_name,
        )
    }
}

/// Review decision on a pending order
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewOrder {
    pub reviewer_kook_id: String,
    pub approve: bool,
    pub reason: Option<String>,
}

impl ReviewOrder {
    /// Recorded audit reason; blank reasons fall back to the decision
    pub fn audit_reason(&self) -> String {
        match self.reason.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => reason.to_string(),
            _ if self.approve => REASON_APPROVED.to_string(),
            _ => REASON_REJECTED.to_string(),
        }
    }
}

/// Player taking an approved order
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptOrder {
    pub player_kook_id: String,
    pub player_kook_name: Option<String>,
    pub payload: Option<Value>,
}

impl AcceptOrder {
    pub fn validate(&self) -> DomainResult<()> {
        require_identity("player_kook_id", &self.player_kook_id)?;
        if let Some(name) = &self.player_kook_name {
            check_length("player_kook_name", name, MAX_DISPLAY_NAME_LENGTH)?;
        }
        Ok(())
    }

    pub fn assignee(&self) -> Assignee {
        Assignee {
            kook_id: self.player_kook_id.clone(),
            kook_name: self.player_kook_name.clone(),
        }
    }
}

/// Completion of an in-progress order by any actor
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteOrder {
    pub actor_kook_id: String,
    pub payload: Option<Value>,
}

/// Assignee identity written onto an order when it is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    pub kook_id: String,
    /// Left untouched on the order when absent
    pub kook_name: Option<String>,
}

/// Reject blank identity strings
pub fn require_identity(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Reject values longer than `max` characters
pub fn check_length(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Treat `null` and `{}` payloads as absent
pub fn non_empty_payload(payload: Option<Value>) -> Option<Value> {
    payload.filter(|value| match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}

/// Order representation returned to API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderResponse {
    pub id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "LOL"))]
    pub game_name: String,
    #[cfg_attr(feature = "openapi", schema(example = 3000))]
    pub amount_cents: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "1.50"))]
    pub duration_hours: Decimal,
    #[cfg_attr(feature = "openapi", schema(example = "PENDING_REVIEW"))]
    pub status: String,
    pub boss_kook_id: Option<String>,
    pub boss_kook_name: Option<String>,
    pub player_kook_id: Option<String>,
    pub player_kook_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            game_name: order.game_name,
            amount_cents: order.amount_cents,
            duration_hours: order.duration_hours,
            status: order.status.to_string(),
            boss_kook_id: Some(order.boss_kook_id),
            boss_kook_name: Some(order.boss_kook_name),
            player_kook_id: order.player_kook_id,
            player_kook_name: order.player_kook_name,
            extra: order.extra,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const OPS: [LifecycleOp; 4] = [
        LifecycleOp::Review { approve: true },
        LifecycleOp::Review { approve: false },
        LifecycleOp::Accept,
        LifecycleOp::Complete,
    ];

    #[test]
    fn legal_transitions() {
        assert_eq!(
            transition(OrderStatus::PendingReview, LifecycleOp::Review { approve: true }),
            Ok(OrderStatus::ReviewApproved)
        );
        assert_eq!(
            transition(OrderStatus::PendingReview, LifecycleOp::Review { approve: false }),
            Ok(OrderStatus::ReviewRejected)
        );
        assert_eq!(
            transition(OrderStatus::ReviewApproved, LifecycleOp::Accept),
            Ok(OrderStatus::InProgress)
        );
        assert_eq!(
            transition(OrderStatus::InProgress, LifecycleOp::Complete),
            Ok(OrderStatus::Completed)
        );
    }

    #[test]
    fn every_other_pair_is_rejected_with_current_and_expected() {
        for current in OrderStatus::ALL {
            for op in OPS {
                if current == op.required_status() {
                    continue;
                }
                assert_eq!(
                    transition(current, op),
                    Err(DomainError::InvalidStateTransition {
                        current,
                        expected: op.required_status(),
                    }),
                    "{current} / {op:?}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_accept_no_operation() {
        for status in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(OPS.iter().all(|op| status.apply(*op).is_err()));
        }
    }

    #[test]
    fn accept_requires_approval_not_pending() {
        let err = OrderStatus::PendingReview.apply(LifecycleOp::Accept).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid state: PENDING_REVIEW. expect REVIEW_APPROVED"
        );
    }

    #[test]
    fn status_round_trips_through_storage_value() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("PAID".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReviewApproved).unwrap();
        assert_eq!(json, "\"REVIEW_APPROVED\"");
    }

    #[test]
    fn duration_is_normalized_to_two_places() {
        let hours = normalize_duration(dec!(1.5)).unwrap();
        assert_eq!(hours.to_string(), "1.50");
        assert_eq!(normalize_duration(dec!(2)).unwrap().to_string(), "2.00");
        assert_eq!(normalize_duration(dec!(0.250)).unwrap().to_string(), "0.25");
    }

    #[test]
    fn duration_rejects_invalid_values() {
        assert!(normalize_duration(dec!(0)).is_err());
        assert!(normalize_duration(dec!(-1)).is_err());
        assert!(normalize_duration(dec!(1.234)).is_err());
        assert!(normalize_duration(dec!(10000)).is_err());
        assert!(normalize_duration(dec!(9999.99)).is_ok());
    }

    #[test]
    fn new_order_validates_input() {
        let order = NewOrder::new("  LOL ", 3000, dec!(1.5), "B1", "Boss").unwrap();
        assert_eq!(order.game_name, "LOL");
        assert_eq!(order.duration_hours.to_string(), "1.50");

        assert!(NewOrder::new("   ", 3000, dec!(1.5), "B1", "Boss").is_err());
        assert!(NewOrder::new("LOL", -1, dec!(1.5), "B1", "Boss").is_err());
        assert!(NewOrder::new("LOL", 0, dec!(1.5), "B1", "Boss").is_ok());
        assert!(NewOrder::new("LOL", 3000, dec!(0), "B1", "Boss").is_err());
        assert!(NewOrder::new("LOL", 3000, dec!(1.5), "", "Boss").is_err());
        assert!(NewOrder::new("x".repeat(101), 3000, dec!(1.5), "B1", "Boss").is_err());
        assert!(NewOrder::new("x".repeat(100), 3000, dec!(1.5), "B1", "Boss").is_ok());
    }

    #[test]
    fn review_reason_defaults_to_decision() {
        let mut review = ReviewOrder {
            reviewer_kook_id: "R1".to_string(),
            approve: true,
            reason: None,
        };
        assert_eq!(review.audit_reason(), "approved");

        review.approve = false;
        review.reason = Some("  ".to_string());
        assert_eq!(review.audit_reason(), "rejected");

        review.reason = Some("price too low".to_string());
        assert_eq!(review.audit_reason(), "price too low");
    }

    #[test]
    fn empty_payloads_are_dropped() {
        assert_eq!(non_empty_payload(None), None);
        assert_eq!(non_empty_payload(Some(Value::Null)), None);
        assert_eq!(non_empty_payload(Some(serde_json::json!({}))), None);
        assert_eq!(
            non_empty_payload(Some(serde_json::json!({"note": "gg"}))),
            Some(serde_json::json!({"note": "gg"}))
        );
    }
}
