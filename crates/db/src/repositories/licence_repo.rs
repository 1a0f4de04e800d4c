//! Repository for the `licences` table.

use licensing_core::licence::LicenceStatus;
use licensing_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::licence::{Licence, NewLicence};

const COLUMNS: &str = "\
    id, code, email, cpf, status, purchased_at, expires_at, plan, \
    payment_origin, payment_transaction_id, created_at, updated_at";

/// Hard cap on a single list page.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Provides persistence operations for licences.
pub struct LicenceRepo;

impl LicenceRepo {
    /// Insert a new licence and return the stored row.
    ///
    /// Fails with a unique violation on `uq_licences_code` when the code is
    /// already taken.
    pub async fn create(pool: &PgPool, input: &NewLicence) -> Result<Licence, sqlx::Error> {
        let query = format!(
            "INSERT INTO licences \
                (code, email, cpf, status, purchased_at, expires_at, plan, \
                 payment_origin, payment_transaction_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Licence>(&query)
            .bind(&input.code)
            .bind(&input.email)
            .bind(&input.cpf)
            .bind(LicenceStatus::ACTIVE)
            .bind(input.purchased_at)
            .bind(input.expires_at)
            .bind(&input.plan)
            .bind(&input.payment_origin)
            .bind(&input.payment_transaction_id)
            .fetch_one(pool)
            .await
    }

    /// Find a licence by its (already normalised) code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Licence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM licences WHERE code = $1");
        sqlx::query_as::<_, Licence>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Licence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM licences WHERE id = $1");
        sqlx::query_as::<_, Licence>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List licences, newest purchase first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Licence>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM licences \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY purchased_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Licence>(&query)
            .bind(status)
            .bind(limit.clamp(1, MAX_PAGE_SIZE))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await
    }

    /// Overwrite the status of a licence. Returns `None` when the code is unknown.
    pub async fn set_status(
        pool: &PgPool,
        code: &str,
        status: &LicenceStatus,
    ) -> Result<Option<Licence>, sqlx::Error> {
        let query = format!(
            "UPDATE licences SET status = $2 \
             WHERE code = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Licence>(&query)
            .bind(code)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Expire one licence, but only while it is still `ativo` and its expiry
    /// lies before `now`.
    ///
    /// Returns `None` when the row no longer qualifies, e.g. it was cancelled
    /// after being read.
    pub async fn expire(
        pool: &PgPool,
        code: &str,
        now: Timestamp,
    ) -> Result<Option<Licence>, sqlx::Error> {
        let query = format!(
            "UPDATE licences SET status = $2 \
             WHERE code = $1 AND status = $3 \
               AND expires_at IS NOT NULL AND expires_at < $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Licence>(&query)
            .bind(code)
            .bind(LicenceStatus::EXPIRED)
            .bind(LicenceStatus::ACTIVE)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Mark every active licence whose expiry lies before `now` as expired.
    ///
    /// Returns the number of rows changed.
    pub async fn expire_overdue(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE licences SET status = $1 \
             WHERE status = $2 AND expires_at IS NOT NULL AND expires_at < $3",
        )
        .bind(LicenceStatus::EXPIRED)
        .bind(LicenceStatus::ACTIVE)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
