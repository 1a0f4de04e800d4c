//! HTTP-level tests for the operator routes under `/admin`.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Method, Request, StatusCode};
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, Utc};
use common::{body_json, get, get_admin, post_admin_json, post_json, post_raw, send};
use licensing_api::handlers::admin::{insert_with_fresh_code, MAX_CODE_ATTEMPTS};
use licensing_db::models::licence::NewLicence;
use licensing_db::repositories::LicenceRepo;
use licensing_delivery::{EmailConfig, LicenceMailer};
use serde_json::json;
use sqlx::PgPool;

fn issue_body() -> serde_json::Value {
    json!({
        "email": "buyer@example.com",
        "cpf": "123.456.789-00",
        "transaction_id": "TX-9F2A",
    })
}

async fn issue(pool: &PgPool) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_admin_json(app, "/admin/licencas", issue_body()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/admin/licencas").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/admin/licencas")
        .header(AUTHORIZATION, "Bearer not-the-token")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_routes_are_closed_without_configured_token(pool: PgPool) {
    let mut config = common::test_config();
    config.admin_token_hash = None;
    let app = common::build_test_app_with(pool, config);

    let response = get_admin(app, "/admin/licencas").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn issue_creates_active_licence_for_configured_days(pool: PgPool) {
    let data = issue(&pool).await;

    let code = data["code"].as_str().unwrap();
    assert_eq!(code.len(), 9);
    assert_eq!(&code[4..5], "-");
    assert_eq!(data["marker"], format!("@#{code}"));
    assert_eq!(data["status"], "ativo");
    assert_eq!(data["plan"], "mensal");
    assert_eq!(data["payment_origin"], "pagbank");
    assert_eq!(data["payment_transaction_id"], "TX-9F2A");
    assert_eq!(data["cpf"], "123.456.789-00");
    assert_eq!(data["email_delivery"], "logged");

    let purchased: DateTime<Utc> = data["purchased_at"].as_str().unwrap().parse().unwrap();
    let expires: DateTime<Utc> = data["expires_at"].as_str().unwrap().parse().unwrap();
    assert_eq!((expires - purchased).num_days(), 30);

    // The issued code validates straight away.
    let app = common::build_test_app(pool);
    let response = post_json(app, "/licencas/validar", json!({ "licenca": format!("@#{code}") })).await;
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn issue_uses_requested_plan(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = issue_body();
    body["plan"] = json!("anual");
    let response = post_admin_json(app, "/admin/licencas", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["plan"], "anual");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn issue_validates_input(pool: PgPool) {
    for body in [
        json!({"email": "not-an-email", "transaction_id": "TX"}),
        json!({"email": "buyer@example.com", "transaction_id": "   "}),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = post_admin_json(app, "/admin/licencas", body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}

fn pending_licence() -> NewLicence {
    let now = Utc::now();
    NewLicence {
        code: String::new(),
        email: "buyer@example.com".to_string(),
        cpf: None,
        purchased_at: now,
        expires_at: Some(now + Duration::days(30)),
        plan: "mensal".to_string(),
        payment_origin: "pagbank".to_string(),
        payment_transaction_id: "TX-COLLIDE".to_string(),
    }
}

async fn occupy(pool: &PgPool, code: &str) {
    let mut taken = pending_licence();
    taken.code = code.to_string();
    LicenceRepo::create(pool, &taken).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn taken_code_is_redrawn(pool: PgPool) {
    occupy(&pool, "TAKE-0001").await;

    let mut draws = 0;
    let mut input = pending_licence();
    let licence = insert_with_fresh_code(&pool, &mut input, || {
        draws += 1;
        let code = if draws == 1 { "TAKE-0001" } else { "FREE-0001" };
        code.to_string()
    })
    .await
    .unwrap();

    assert_eq!(draws, 2);
    assert_eq!(licence.code, "FREE-0001");
    assert_eq!(licence.payment_transaction_id, "TX-COLLIDE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn exhausted_code_draws_are_a_conflict(pool: PgPool) {
    occupy(&pool, "TAKE-0002").await;

    let mut draws = 0;
    let mut input = pending_licence();
    let err = insert_with_fresh_code(&pool, &mut input, || {
        draws += 1;
        "TAKE-0002".to_string()
    })
    .await
    .unwrap_err();

    assert_eq!(draws, MAX_CODE_ATTEMPTS);
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    let rows = LicenceRepo::list(&pool, None, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mail_failure_still_issues_licence(pool: PgPool) {
    let unreachable = LicenceMailer::new(Some(EmailConfig {
        smtp_host: "127.0.0.1".to_string(),
        smtp_port: 1,
        smtp_user: "mailer@example.com".to_string(),
        smtp_password: "pw".to_string(),
        from_address: "mailer@example.com".to_string(),
    }));
    let app = common::build_test_app_with_mailer(pool.clone(), common::test_config(), unreachable);

    let response = post_admin_json(app, "/admin/licencas", issue_body()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email_delivery"], "failed");

    let code = json["data"]["code"].as_str().unwrap();
    let stored = LicenceRepo::find_by_code(&pool, code).await.unwrap().unwrap();
    assert_eq!(stored.status, "ativo");
    assert_eq!(stored.email, "buyer@example.com");
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_and_list_issued_licences(pool: PgPool) {
    let first = issue(&pool).await;
    issue(&pool).await;
    let code = first["code"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = get_admin(app, &format!("/admin/licencas/{}", code.to_lowercase())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["code"], code.as_str());

    let app = common::build_test_app(pool.clone());
    let response = get_admin(app, "/admin/licencas?status=ativo&limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get_admin(app, "/admin/licencas?limit=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_code_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_admin(app, "/admin/licencas/ZZZZ-0000").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_licence_no_longer_validates(pool: PgPool) {
    let data = issue(&pool).await;
    let code = data["code"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_admin_json(app, &format!("/admin/licencas/{code}/cancelar"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "cancelado");

    let app = common::build_test_app(pool);
    let response = post_json(app, "/licencas/validar", json!({ "licenca": code })).await;
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["motivo"], "LICENCA_CANCELADO");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn notifications_are_listed_newest_first(pool: PgPool) {
    for code in ["FIRST", "SECOND"] {
        let app = common::build_test_app(pool.clone());
        let body = format!("notificationCode={code}");
        let response = post_raw(
            app,
            "/pagbank/webhook",
            "application/x-www-form-urlencoded",
            &body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let app = common::build_test_app(pool);
    let response = get_admin(app, "/admin/notificacoes?limit=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["notification_code"], "SECOND");
}
