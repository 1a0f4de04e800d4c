//! Operator handlers for licence issuance and inspection.
//!
//! All endpoints require the `ADMIN_TOKEN` bearer via [`RequireAdmin`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use licensing_core::error::CoreError;
use licensing_core::licence::{
    expiry_from, generate_code, licence_marker, normalize_code, LicenceStatus,
    DEFAULT_PAYMENT_ORIGIN, DEFAULT_PLAN,
};
use licensing_db::models::licence::{Licence, NewLicence};
use licensing_db::repositories::{LicenceRepo, PaymentNotificationRepo};
use licensing_delivery::LicenceEmail;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{unique_violation, AppError, AppResult};
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Attempts at drawing a free licence code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Default page size for list endpoints.
const DEFAULT_LIST_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /admin/licencas`.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueLicenceRequest {
    #[validate(email(message = "email must be a valid e-mail address"))]
    pub email: String,
    pub cpf: Option<String>,
    #[validate(length(min = 1, message = "transaction_id must not be empty"))]
    pub transaction_id: String,
    pub plan: Option<String>,
}

/// A newly issued licence plus what happened to its e-mail.
#[derive(Debug, Serialize)]
pub struct IssuedLicence {
    #[serde(flatten)]
    pub licence: Licence,
    /// `@#CODE`, as the user will type it.
    pub marker: String,
    /// `sent`, `logged` or `failed`.
    pub email_delivery: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListLicencesQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /admin/licencas
///
/// Generate a code, store the licence and e-mail it to the buyer. A mail
/// failure is reported in `email_delivery` and does not undo the issue.
pub async fn issue_licence(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    payload: Result<Json<IssueLicenceRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(mut input) = payload?;
    input.email = input.email.trim().to_string();
    input.transaction_id = input.transaction_id.trim().to_string();
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let purchased_at = Utc::now();
    let mut new_licence = NewLicence {
        code: String::new(),
        email: input.email,
        cpf: input.cpf.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        purchased_at,
        expires_at: Some(expiry_from(purchased_at, state.config.licence_days)),
        plan: input
            .plan
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAN.to_string()),
        payment_origin: DEFAULT_PAYMENT_ORIGIN.to_string(),
        payment_transaction_id: input.transaction_id,
    };

    let licence = insert_with_fresh_code(&state.pool, &mut new_licence, generate_code).await?;

    tracing::info!(
        licence_id = licence.id,
        code = %licence.code,
        transaction_id = %licence.payment_transaction_id,
        "Licence issued",
    );

    let email = LicenceEmail {
        to: licence.email.clone(),
        code: licence.code.clone(),
        api_key: state.config.meudanfe_api_key.clone(),
        licence_days: state.config.licence_days,
    };
    let email_delivery = match state.mailer.send(&email).await {
        Ok(delivery) => delivery.as_str(),
        Err(e) => {
            tracing::error!(code = %licence.code, error = %e, "Licence e-mail delivery failed");
            "failed"
        }
    };

    let response = IssuedLicence {
        marker: licence_marker(&licence.code),
        licence,
        email_delivery,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// Insert `input` under a code drawn from `next_code`, drawing again whenever
/// the previous code is taken. Gives up with a conflict after
/// [`MAX_CODE_ATTEMPTS`] draws.
pub async fn insert_with_fresh_code(
    pool: &PgPool,
    input: &mut NewLicence,
    mut next_code: impl FnMut() -> String,
) -> AppResult<Licence> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        input.code = next_code();
        match LicenceRepo::create(pool, input).await {
            Ok(licence) => return Ok(licence),
            Err(sqlx::Error::Database(db_err))
                if unique_violation(&*db_err) == Some("uq_licences_code") =>
            {
                tracing::warn!(attempt, code = %input.code, "Licence code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Core(CoreError::Conflict(
        "Could not allocate a unique licence code".into(),
    )))
}

/// GET /admin/licencas
pub async fn list_licences(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    query: Result<Query<ListLicencesQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let status = params
        .status
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let licences = LicenceRepo::list(
        &state.pool,
        status.as_deref(),
        params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        params.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: licences }))
}

/// GET /admin/licencas/{code}
pub async fn get_licence(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let code = normalize_code(&code);
    let licence = LicenceRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or(AppError::Core(CoreError::LicenceNotFound(code)))?;
    Ok(Json(DataResponse { data: licence }))
}

/// POST /admin/licencas/{code}/cancelar
pub async fn cancel_licence(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let code = normalize_code(&code);
    let licence = LicenceRepo::set_status(&state.pool, &code, &LicenceStatus::Cancelled)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::LicenceNotFound(code.clone())))?;

    tracing::info!(code = %code, "Licence cancelled");
    Ok(Json(DataResponse { data: licence }))
}

/// GET /admin/notificacoes
pub async fn list_notifications(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    query: Result<Query<ListNotificationsQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let notifications =
        PaymentNotificationRepo::list_recent(&state.pool, params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .await?;
    Ok(Json(DataResponse { data: notifications }))
}
