//! Router-level tests against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use chrono::Utc;
use http_body_util::BodyExt;
use medfin_core::storage::ProofStore;
use medfin_db::UserRepository;
use medfin_db::migration::Migrator;
use medfin_shared::AppConfig;
use medfin_shared::config::{DatabaseConfig, LedgerConfig, ServerConfig, StorageSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::extractors::USER_ID_HEADER;
use crate::{AppState, create_router};

const BOUNDARY: &str = "medfin-test-boundary";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

struct TestApp {
    router: Router,
    user_id: i64,
}

async fn test_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let user = UserRepository::new(db.clone())
        .create("Administrator", "admin@medfin.test")
        .await
        .unwrap();

    let root = std::env::temp_dir().join(format!("medfin-api-{}", unique_suffix()));
    let storage = StorageSettings {
        root: root.to_string_lossy().into_owned(),
        ..StorageSettings::default()
    };
    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            busy_timeout_secs: 5,
        },
        ledger: LedgerConfig::default(),
        storage: storage.clone(),
    };

    let state = AppState {
        db: Arc::new(db),
        storage: Some(Arc::new(ProofStore::from_settings(&storage).unwrap())),
        config: Arc::new(config),
    };
    TestApp {
        router: create_router(state),
        user_id: user.id,
    }
}

fn unique_suffix() -> String {
    Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn write(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(USER_ID_HEADER, self.user_id.to_string())
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.write("POST", uri, body).await
    }

    /// Unit `IGD`, accounts `5` and `5.1`; returns the ids of the unit and `5.1`.
    async fn seed_ledger(&self) -> (i64, i64) {
        let (status, unit) = self
            .post(
                "/api/v1/units",
                &json!({ "code": "IGD", "name": "Instalasi Gawat Darurat" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, root) = self
            .post(
                "/api/v1/accounts",
                &json!({ "code": "5", "name": "Belanja", "type": "expense" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, child) = self
            .post(
                "/api/v1/accounts",
                &json!({
                    "code": "5.1",
                    "name": "Belanja Operasi",
                    "type": "expense",
                    "parent_id": root["id"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(child["level"], 2);

        (
            unit["id"].as_i64().unwrap(),
            child["id"].as_i64().unwrap(),
        )
    }

    async fn create_transaction(&self, unit_id: i64, account_id: i64) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/transactions",
                &json!({
                    "transaction_date": "2024-03-15",
                    "journal_date": "2024-03-15",
                    "account_id": account_id,
                    "unit_id": unit_id,
                    "type": "expense",
                    "amount": "150000.505",
                    "description": "Pembelian obat",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn multipart(filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"proof_file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = app.get("/health-check").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_writes_require_known_user() {
    let app = test_app().await;
    let payload = json!({ "code": "LAB", "name": "Laboratorium" }).to_string();

    for header in [None, Some("abc"), Some("9999")] {
        let mut request = Request::post("/api/v1/units").header(CONTENT_TYPE, "application/json");
        if let Some(value) = header {
            request = request.header(USER_ID_HEADER, value);
        }
        let (status, body) = app
            .send(request.body(Body::from(payload.clone())).unwrap())
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    let (status, _) = app.get("/api/v1/units").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_transaction_lifecycle_over_http() {
    let app = test_app().await;
    let (unit_id, account_id) = app.seed_ledger().await;

    let created = app.create_transaction(unit_id, account_id).await;
    let today = Utc::now().date_naive().format("%Y%m%d");
    assert_eq!(created["reference_number"], format!("EXP-{today}-0001"));
    assert_eq!(created["status"], "draft");
    assert_eq!(decimal(&created["amount"]), dec!(150000.51));
    let id = created["id"].as_i64().unwrap();

    let (status, page) = app.get("/api/v1/transactions?type=expense").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["meta"]["per_page"], 15);
    assert_eq!(page["data"][0]["unit_name"], "Instalasi Gawat Darurat");

    let (status, shown) = app.get(&format!("/api/v1/transactions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["account_code"], "5.1");
    assert_eq!(shown["created_by_name"], "Administrator");

    let (status, approved) = app
        .post(&format!("/api/v1/transactions/{id}/approve"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["approved_by"], app.user_id);

    let (status, locked) = app
        .post(&format!("/api/v1/transactions/{id}/lock"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["status"], "locked");

    let (status, body) = app
        .write(
            "PATCH",
            &format!("/api/v1/transactions/{id}"),
            &json!({
                "transaction_date": "2024-03-16",
                "journal_date": "2024-03-16",
                "account_id": account_id,
                "unit_id": unit_id,
                "type": "expense",
                "amount": 1,
                "description": "Changed",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
    assert_eq!(body["message"], "Cannot update locked transaction.");

    let (status, body) = app
        .write("DELETE", &format!("/api/v1/transactions/{id}"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Cannot delete locked transaction.");

    let (status, _) = app
        .send(
            Request::get(format!("/api/v1/transactions/{id}/edit"))
                .header(USER_ID_HEADER, app.user_id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_validation_errors_are_reported_per_field() {
    let app = test_app().await;

    let (status, body) = app.post("/api/v1/transactions", &json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_FIELDS");
    assert_eq!(
        body["fields"]["transaction_date"][0],
        "Transaction date is required."
    );
    assert_eq!(body["fields"]["description"][0], "Description is required.");

    let (status, body) = app
        .post(
            "/api/v1/transactions",
            &json!({
                "transaction_date": "2024-03-15",
                "journal_date": "2024-03-15",
                "account_id": 41,
                "unit_id": 42,
                "type": "expense",
                "amount": 10,
                "description": "Nothing to point at",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["account_id"][0], "Selected BAS Account is invalid.");

    let (status, body) = app.get("/api/v1/transactions?status=pending").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["status"].is_array());

    let (status, body) = app.get("/api/v1/dashboard?year=2024&month=13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_proof_upload() {
    let app = test_app().await;
    let (unit_id, account_id) = app.seed_ledger().await;
    let created = app.create_transaction(unit_id, account_id).await;
    let id = created["id"].as_i64().unwrap();

    let upload = |filename: &str, bytes: &[u8]| {
        Request::post(format!("/api/v1/transactions/{id}/proof"))
            .header(USER_ID_HEADER, app.user_id.to_string())
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart(filename, bytes)))
            .unwrap()
    };

    let (status, body) = app.send(upload("notes.txt", b"plain text")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["fields"]["proof_file"][0],
        "Proof file must be a PDF or image file."
    );

    let (status, body) = app.send(upload("nota (1).png", PNG)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let key = body["proof_file"].as_str().unwrap();
    assert!(key.starts_with(&format!("transactions/{id}/")));
    assert!(key.ends_with("-nota__1_.png"));
}

#[tokio::test]
async fn test_budget_and_dashboard_over_http() {
    let app = test_app().await;
    let (unit_id, account_id) = app.seed_ledger().await;

    let (status, budget) = app
        .post(
            "/api/v1/budgets",
            &json!({
                "fiscal_year": 2024,
                "account_id": account_id,
                "unit_id": unit_id,
                "type": "initial",
                "amount": 3000000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(budget["status"], "draft");
    let id = budget["id"].as_i64().unwrap();

    let (status, _) = app
        .post(&format!("/api/v1/budgets/{id}/approve"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, page) = app.get("/api/v1/budgets?fiscal_year=2024&status=approved").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);

    let (status, view) = app.get("/api/v1/dashboard?year=2024&month=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["year"], 2024);
    assert_eq!(view["monthly_trend"].as_array().unwrap().len(), 12);
    assert_eq!(decimal(&view["summary"]["total_budget"]), dec!(3000000));

    let (status, body) = app
        .write("DELETE", &format!("/api/v1/units/{unit_id}"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_account_delete_reports_whole_subtree() {
    let app = test_app().await;
    let (_, child_id) = app.seed_ledger().await;

    let (status, leaf) = app
        .post(
            "/api/v1/accounts",
            &json!({
                "code": "5.1.1",
                "name": "Belanja Pegawai",
                "type": "expense",
                "parent_id": child_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(leaf["level"], 3);

    let (status, body) = app
        .write("DELETE", &format!("/api/v1/accounts/{child_id}"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (status, _) = app.get(&format!("/api/v1/accounts/{}", leaf["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
