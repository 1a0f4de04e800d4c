//! Periodic expiry of overdue licences.
//!
//! Validation expires a licence when it is presented past its date. This
//! sweep covers the licences nobody presents.

use std::time::Duration;

use chrono::Utc;
use licensing_db::repositories::LicenceRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run one sweep. Returns the number of licences marked `expirado`.
pub async fn sweep_once(pool: &PgPool) -> Result<u64, sqlx::Error> {
    LicenceRepo::expire_overdue(pool, Utc::now()).await
}

/// Run the expiry loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Licence expiry job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Licence expiry job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sweep_once(&pool).await {
                    Ok(expired) => {
                        if expired > 0 {
                            tracing::info!(expired, "Licence expiry: marked overdue licences");
                        } else {
                            tracing::debug!("Licence expiry: nothing overdue");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Licence expiry: sweep failed");
                    }
                }
            }
        }
    }
}
