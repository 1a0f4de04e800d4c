//! Licence validation, called by the browser extension.
//!
//! The response is always HTTP 200 with `ok` telling the extension whether
//! the licence may be used; `motivo` carries the machine-readable reason
//! when it may not.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use licensing_core::licence::{evaluate, normalize_code, reasons, LicenceVerdict};
use licensing_core::timestamp::iso8601;
use licensing_db::repositories::LicenceRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `POST /licencas/validar`.
#[derive(Debug, Deserialize)]
pub struct ValidateLicenceRequest {
    /// Code as typed by the user, with or without the `@#` marker.
    pub licenca: String,
}

/// Result of a validation. Absent values serialize as `null`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ValidateLicenceResponse {
    pub ok: bool,
    pub motivo: Option<String>,
    pub expira_em: Option<String>,
    pub api_key_meudanfe: Option<String>,
}

impl ValidateLicenceResponse {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            motivo: Some(reason.into()),
            expira_em: None,
            api_key_meudanfe: None,
        }
    }

    fn from_verdict(verdict: &LicenceVerdict) -> Self {
        Self {
            ok: verdict.is_valid(),
            motivo: verdict.reason(),
            expira_em: verdict.expires_at().map(iso8601),
            api_key_meudanfe: None,
        }
    }
}

/// POST /licencas/validar
///
/// Looks the code up, checks status then expiry. A licence found past its
/// expiry is marked `expirado` in storage before answering.
pub async fn validate_licence(
    State(state): State<AppState>,
    payload: Result<Json<ValidateLicenceRequest>, JsonRejection>,
) -> AppResult<Json<ValidateLicenceResponse>> {
    let Json(input) = payload?;
    let code = normalize_code(&input.licenca);

    let Some(licence) = LicenceRepo::find_by_code(&state.pool, &code).await? else {
        tracing::info!(code = %code, "Validation of unknown licence");
        return Ok(Json(ValidateLicenceResponse::rejected(reasons::NOT_FOUND)));
    };

    let now = Utc::now();
    let verdict = evaluate(&licence.status(), licence.expires_at, now);

    if let LicenceVerdict::Expired { expires_at } = &verdict {
        if LicenceRepo::expire(&state.pool, &code, now).await?.is_some() {
            tracing::info!(code = %code, expires_at = %expires_at, "Licence expired on validation");
        } else {
            tracing::info!(code = %code, "Licence changed status before it could be expired");
        }
    } else {
        tracing::debug!(code = %code, ok = verdict.is_valid(), "Licence validated");
    }

    Ok(Json(ValidateLicenceResponse::from_verdict(&verdict)))
}
