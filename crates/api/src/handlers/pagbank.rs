//! PagBank payment notification webhook.
//!
//! PagBank's transaction notifications arrive form-encoded
//! (`notificationCode`, `notificationType`); newer APIs post JSON. Both are
//! acknowledged and logged to `payment_notifications`. Resolving the
//! notification code into a transaction is not done here.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use licensing_db::models::payment_notification::{payload_kinds, NewPaymentNotification};
use licensing_db::repositories::PaymentNotificationRepo;
use serde_json::{json, Map, Value};

use crate::state::AppState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A webhook body the handler could make sense of.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    Form {
        fields: Map<String, Value>,
        notification_code: Option<String>,
        notification_type: Option<String>,
    },
    Json(Value),
}

/// Decode a webhook body: a non-empty form wins, then any truthy JSON value.
///
/// Returns `None` when neither yields anything usable.
pub fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Option<WebhookPayload> {
    if is_form(headers) {
        let fields: Map<String, Value> = form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();

        if !fields.is_empty() {
            let field = |camel: &str, snake: &str| {
                [camel, snake]
                    .iter()
                    .filter_map(|name| fields.get(*name).and_then(Value::as_str))
                    .find(|v| !v.is_empty())
                    .map(str::to_string)
            };
            let notification_code = field("notificationCode", "notification_code");
            let notification_type = field("notificationType", "notification_type");
            return Some(WebhookPayload::Form {
                fields,
                notification_code,
                notification_type,
            });
        }
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) if is_truthy(&value) => Some(WebhookPayload::Json(value)),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "PagBank webhook body is not JSON");
            None
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Empty containers, empty strings, zero, `false` and `null` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn headers_json(headers: &HeaderMap) -> Value {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect::<Map<String, Value>>()
        .into()
}

/// POST /pagbank/webhook
pub async fn pagbank_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_log = headers_json(&headers);
    tracing::info!(headers = %header_log, body_len = body.len(), "PagBank webhook received");

    let Some(payload) = parse_payload(&headers, &body) else {
        tracing::warn!("PagBank webhook payload could not be read");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Payload do PagBank inválido" })),
        )
            .into_response();
    };

    let (record, response) = match payload {
        WebhookPayload::Form {
            fields,
            notification_code,
            notification_type,
        } => {
            tracing::info!(
                notification_code = ?notification_code,
                notification_type = ?notification_type,
                "PagBank form notification",
            );
            let response = json!({
                "ok": true,
                "tipo": payload_kinds::FORM,
                "notificationCode": notification_code,
            });
            let record = NewPaymentNotification {
                payload_kind: payload_kinds::FORM,
                notification_code,
                notification_type,
                payload: Value::Object(fields),
                headers: header_log,
            };
            (record, response)
        }
        WebhookPayload::Json(value) => {
            tracing::info!(payload = %value, "PagBank JSON notification");
            let response = json!({
                "ok": true,
                "tipo": payload_kinds::JSON,
                "payload": value,
            });
            let record = NewPaymentNotification {
                payload_kind: payload_kinds::JSON,
                notification_code: None,
                notification_type: None,
                payload: value,
                headers: header_log,
            };
            (record, response)
        }
    };

    // Persistence failures do not change the acknowledgement.
    if let Err(e) = PaymentNotificationRepo::create(&state.pool, &record).await {
        tracing::error!(error = %e, "Failed to persist PagBank notification");
    }

    (StatusCode::OK, Json(response)).into_response()
}
