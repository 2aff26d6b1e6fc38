//! Append-only order history: audit rows and receipts.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};
use crate::order::{Order, OrderStatus};

/// One recorded lifecycle transition. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAudit {
    pub id: i64,
    pub order_id: i64,
    /// None for entries without an acting user (creation, accept)
    pub actor_user_id: Option<i64>,
    /// None on creation
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub reason: Option<String>,
    pub payload: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Audit row about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewAudit {
    pub order_id: i64,
    pub actor_user_id: Option<i64>,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub reason: String,
    pub payload: Option<Value>,
}

/// Receipt kinds. Only `Completion` is currently emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptType {
    Acceptance,
    Completion,
}

impl ReceiptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptType::Acceptance => "ACCEPTANCE",
            ReceiptType::Completion => "COMPLETION",
        }
    }
}

impl FromStr for ReceiptType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPTANCE" => Ok(ReceiptType::Acceptance),
            "COMPLETION" => Ok(ReceiptType::Completion),
            other => Err(DomainError::internal(format!("unknown receipt type: {}", other))),
        }
    }
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable fact snapshot written when an order completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub order_id: i64,
    pub receipt_type: ReceiptType,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Default completion receipt payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSnapshot {
    pub completed_by: String,
    pub amount_cents: i64,
    pub duration_hours: Decimal,
}

impl CompletionSnapshot {
    pub fn new(order: &Order, completed_by: impl Into<String>) -> Self {
        Self {
            completed_by: completed_by.into(),
            amount_cents: order.amount_cents,
            duration_hours: order.duration_hours,
        }
    }

    /// Receipt payload; the duration keeps its two-decimal string form.
    pub fn to_value(&self) -> DomainResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::internal(format!("completion snapshot: {}", e)))
    }
}

/// Audit row returned to API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrderAuditResponse {
    pub id: i64,
    pub order_id: i64,
    pub actor_user_id: Option<i64>,
    pub from_status: Option<String>,
    pub to_status: String,
    pub reason: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object, nullable))]
    pub payload: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderAudit> for OrderAuditResponse {
    fn from(audit: OrderAudit) -> Self {
        Self {
            id: audit.id,
            order_id: audit.order_id,
            actor_user_id: audit.actor_user_id,
            from_status: audit.from_status.map(|s| s.to_string()),
            to_status: audit.to_status.to_string(),
            reason: audit.reason,
            payload: audit.payload,
            created_at: audit.created_at,
        }
    }
}

/// Receipt returned to API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReceiptResponse {
    pub id: i64,
    pub order_id: i64,
    #[serde(rename = "type")]
    pub receipt_type: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            id: receipt.id,
            order_id: receipt.order_id,
            receipt_type: receipt.receipt_type.to_string(),
            payload: receipt.payload,
            created_at: receipt.created_at,
        }
    }
}
