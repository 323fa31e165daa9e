//! Integration tests for the Leave Entitlement Engine.
//!
//! The router runs against the fixture catalog in `./config` and the
//! snapshot it names. Covered:
//! - Deferral carry-over and quota year attribution
//! - Allocation overrides and cached deferred days
//! - Clamping of overdrawn balances
//! - Skipped malformed request rows
//! - Unavailable markers for unknown leave types and offline stores
//! - Request validation errors

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use leave_engine::api::{AppState, create_router};
use leave_engine::config::ConfigLoader;
use leave_engine::error::{EngineError, EngineResult};
use leave_engine::models::RequestRow;
use leave_engine::store::{InMemoryLeaveStore, LeaveStores, RequestLedger};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_stores() -> LeaveStores {
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    let store =
        Arc::new(InMemoryLeaveStore::load(config.snapshot_path()).expect("Failed to load snapshot"));
    LeaveStores::from_shared(store).with_catalog(Arc::new(config))
}

fn create_router_for_test() -> Router {
    create_router(AppState::new(create_test_stores()))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_balances(router: Router, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri("/balances")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

fn row<'a>(json: &'a Value, employee_id: &str) -> &'a Value {
    json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["employeeId"] == employee_id)
        .unwrap_or_else(|| panic!("no row for {}", employee_id))
}

fn assert_balance(cell: &Value, expected: [i64; 6]) {
    assert_eq!(cell["status"], "available", "cell: {}", cell);
    let actual = [
        cell["total"].as_i64().unwrap(),
        cell["deferred"].as_i64().unwrap(),
        cell["used_current"].as_i64().unwrap(),
        cell["used_deferred"].as_i64().unwrap(),
        cell["used"].as_i64().unwrap(),
        cell["remaining"].as_i64().unwrap(),
    ];
    assert_eq!(actual, expected, "cell: {}", cell);
}

// =============================================================================
// Balance scenarios
// =============================================================================

#[tokio::test]
async fn test_deferral_and_quota_year_attribution() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_001"], "year": 2025}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let emp = row(&json, "emp_001");

    // Three days deferred from 2024; the 2022 request counts against neither year
    assert_balance(&emp["balances"]["annual"], [12, 3, 5, 2, 7, 8]);
    assert_eq!(emp["deferralLog"]["id"], "def_2024_001");
    assert_eq!(emp["deferralLog"]["daysDeferred"], 3);
}

#[tokio::test]
async fn test_non_deferrable_type_ignores_ledger() {
    let (_, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_001"], "year": 2025}),
    )
    .await;

    // Request without a quota year falls into the year it starts in
    assert_balance(&row(&json, "emp_001")["balances"]["sick"], [10, 0, 2, 0, 2, 8]);
}

#[tokio::test]
async fn test_override_and_cached_deferred_days() {
    let (_, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_002"], "year": 2025}),
    )
    .await;

    let emp = row(&json, "emp_002");
    // Textual "2025" counts; "next year" is skipped with a warning
    assert_balance(&emp["balances"]["annual"], [20, 4, 3, 0, 3, 21]);
    assert!(emp["deferralLog"].is_null());

    let warnings = emp["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "MALFORMED_RECORD");
}

#[tokio::test]
async fn test_overdrawn_balance_clamps_to_zero() {
    let (_, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_003"], "year": 2025, "leave_type_ids": ["annual"]}),
    )
    .await;

    let emp = row(&json, "emp_003");
    assert_balance(&emp["balances"]["annual"], [5, 1, 6, 2, 8, 0]);
    assert_eq!(emp["balances"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_typed_deferral_applies_only_to_its_leave_type() {
    let (_, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_004"], "year": 2025}),
    )
    .await;

    let emp = row(&json, "emp_004");
    assert_balance(&emp["balances"]["annual"], [12, 0, 0, 0, 0, 12]);
    // The negative request is skipped
    assert_balance(&emp["balances"]["study"], [5, 2, 0, 0, 0, 7]);
    assert_eq!(emp["deferralLog"]["id"], "def_2024_004");
}

#[tokio::test]
async fn test_unknown_employee_gets_defaults() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_999"], "year": 2025}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let emp = row(&json, "emp_999");
    assert_balance(&emp["balances"]["annual"], [12, 0, 0, 0, 0, 12]);
    assert_balance(&emp["balances"]["sick"], [10, 0, 0, 0, 0, 10]);
    assert!(emp["deferralLog"].is_null());
    assert!(emp.get("warnings").is_none());
}

// =============================================================================
// Report shape
// =============================================================================

#[tokio::test]
async fn test_duplicate_employee_ids_yield_one_row_each() {
    let (_, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_002", "emp_001", "emp_002"], "year": 2025}),
    )
    .await;

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["employeeId"], "emp_002");
    assert_eq!(rows[1]["employeeId"], "emp_001");
}

#[tokio::test]
async fn test_unknown_leave_type_is_marked_unavailable() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({
            "employee_ids": ["emp_001"],
            "year": 2025,
            "leave_type_ids": ["annual", "sabbatical"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let emp = row(&json, "emp_001");
    assert_balance(&emp["balances"]["annual"], [12, 3, 5, 2, 7, 8]);

    let sabbatical = &emp["balances"]["sabbatical"];
    assert_eq!(sabbatical["status"], "unavailable");
    assert_eq!(sabbatical["code"], "LEAVE_TYPE_NOT_FOUND");
    assert!(sabbatical.get("remaining").is_none());
}

#[tokio::test]
async fn test_identical_requests_produce_identical_rows() {
    let body = json!({"employee_ids": ["emp_001", "emp_002", "emp_003"], "year": 2025});

    let (_, first) = post_balances(create_router_for_test(), body.clone()).await;
    let (_, second) = post_balances(create_router_for_test(), body).await;

    // report_id differs per request; rows must not
    assert_eq!(first["rows"], second["rows"]);
    assert_ne!(first["report_id"], second["report_id"]);
}

// =============================================================================
// Data source failures
// =============================================================================

struct OfflineRequestLedger;

#[async_trait]
impl RequestLedger for OfflineRequestLedger {
    async fn get_requests(
        &self,
        _employee_id: &str,
        _leave_type_id: &str,
        _since_year: i32,
    ) -> EngineResult<Vec<RequestRow>> {
        Err(EngineError::unavailable("requests", "connection refused"))
    }

    async fn get_requests_for(
        &self,
        _employee_ids: &[String],
        _since_year: i32,
    ) -> EngineResult<Vec<RequestRow>> {
        Err(EngineError::unavailable("requests", "connection refused"))
    }
}

#[tokio::test]
async fn test_offline_request_ledger_returns_503_not_zero() {
    let mut stores = create_test_stores();
    stores.requests = Some(Arc::new(OfflineRequestLedger));
    let router = create_router(AppState::new(stores));

    let (status, json) = post_balances(
        router,
        json!({"employee_ids": ["emp_001"], "year": 2025}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_without_request_ledger_uses_cached_used_days() {
    let stores = create_test_stores().without_request_ledger();
    let router = create_router(AppState::new(stores));

    let (status, json) = post_balances(
        router,
        json!({"employee_ids": ["emp_002"], "year": 2025, "leave_type_ids": ["annual"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let annual = &row(&json, "emp_002")["balances"]["annual"];
    assert_eq!(annual["used"], 6);
    assert_eq!(annual["remaining"], 18);
}

// =============================================================================
// Single balance endpoint
// =============================================================================

#[tokio::test]
async fn test_single_balance_matches_report_cell() {
    let (status, json) = send(
        create_router_for_test(),
        Request::builder()
            .uri("/employees/emp_001/balances/annual?year=2025")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["employee_id"], "emp_001");
    assert_eq!(json["balance"]["remaining"], 8);
    assert_eq!(json["balance"]["used_deferred"], 2);
}

#[tokio::test]
async fn test_single_balance_unknown_type_returns_404() {
    let (status, json) = send(
        create_router_for_test(),
        Request::builder()
            .uri("/employees/emp_001/balances/sabbatical?year=2025")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "LEAVE_TYPE_NOT_FOUND");
}

// =============================================================================
// Validation errors
// =============================================================================

#[tokio::test]
async fn test_empty_employee_ids_returns_400() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": [], "year": 2025}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_year_out_of_range_returns_400() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_001"], "year": 12025}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn test_wrong_field_type_returns_malformed_json() {
    let (status, json) = post_balances(
        create_router_for_test(),
        json!({"employee_ids": ["emp_001"], "year": "2025"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_invalid_json_syntax_returns_400() {
    let (status, json) = send(
        create_router_for_test(),
        Request::builder()
            .method("POST")
            .uri("/balances")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"employee_ids\": [\"emp_001\""))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}
