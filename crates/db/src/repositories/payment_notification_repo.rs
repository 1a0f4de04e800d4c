//! Repository for the `payment_notifications` table.

use sqlx::PgPool;

use crate::models::payment_notification::{NewPaymentNotification, PaymentNotification};

const COLUMNS: &str = "\
    id, payload_kind, notification_code, notification_type, payload, headers, received_at";

pub struct PaymentNotificationRepo;

impl PaymentNotificationRepo {
    /// Append a received notification.
    pub async fn create(
        pool: &PgPool,
        input: &NewPaymentNotification,
    ) -> Result<PaymentNotification, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_notifications \
                (payload_kind, notification_code, notification_type, payload, headers) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentNotification>(&query)
            .bind(input.payload_kind)
            .bind(&input.notification_code)
            .bind(&input.notification_type)
            .bind(&input.payload)
            .bind(&input.headers)
            .fetch_one(pool)
            .await
    }

    /// Most recent notifications first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PaymentNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_notifications \
             ORDER BY received_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, PaymentNotification>(&query)
            .bind(limit.clamp(1, 500))
            .fetch_all(pool)
            .await
    }
}
