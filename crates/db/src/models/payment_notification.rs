//! Payment provider webhook log rows.

use licensing_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// How the provider encoded the webhook body.
pub mod payload_kinds {
    pub const FORM: &str = "form";
    pub const JSON: &str = "json";
}

/// A row from the `payment_notifications` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentNotification {
    pub id: DbId,
    pub payload_kind: String,
    pub notification_code: Option<String>,
    pub notification_type: Option<String>,
    pub payload: serde_json::Value,
    pub headers: serde_json::Value,
    pub received_at: Timestamp,
}

/// Values for a new `payment_notifications` row.
#[derive(Debug, Clone)]
pub struct NewPaymentNotification {
    pub payload_kind: &'static str,
    pub notification_code: Option<String>,
    pub notification_type: Option<String>,
    pub payload: serde_json::Value,
    pub headers: serde_json::Value,
}
