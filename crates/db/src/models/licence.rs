//! Licence rows and DTOs.

use licensing_core::licence::LicenceStatus;
use licensing_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `licences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Licence {
    pub id: DbId,
    pub code: String,
    pub email: String,
    pub cpf: Option<String>,
    pub status: String,
    pub purchased_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub plan: String,
    pub payment_origin: String,
    pub payment_transaction_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Licence {
    pub fn status(&self) -> LicenceStatus {
        LicenceStatus::parse(&self.status)
    }
}

/// Values for a new `licences` row.
#[derive(Debug, Clone)]
pub struct NewLicence {
    pub code: String,
    pub email: String,
    pub cpf: Option<String>,
    pub purchased_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub plan: String,
    pub payment_origin: String,
    pub payment_transaction_id: String,
}
