//! Router tests against an in-memory `SqliteStore`.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use jal_core::{
  activity::{ImportBatch, ImportKind},
  hierarchy::Hierarchy,
  scheme::{NewScheme, SchemeCounters},
  store::{ImportCounts, SchemeStore, WriteMode},
};
use jal_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;
use crate::{import::content_sha256, translate::TranslateError};

struct EchoTranslator;

impl Translator for EchoTranslator {
  async fn translate(
    &self,
    text: String,
    source: String,
    target: String,
  ) -> Result<String, TranslateError> {
    Ok(format!("[{source}->{target}] {text}"))
  }
}

struct DownTranslator;

impl Translator for DownTranslator {
  async fn translate(&self, _: String, _: String, _: String) -> Result<String, TranslateError> {
    Err(TranslateError::Status { status: 503, body: "unavailable".into() })
  }
}

async fn make_state<T>(translator: T) -> AppState<SqliteStore, T> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();

  let config = ServerConfig {
    store_path: PathBuf::from(":memory:"),
    admin_password_hash: hash,
    ..ServerConfig::default()
  };
  AppState::new(store, config, translator)
}

fn admin_auth() -> String { format!("Basic {}", B64.encode("admin:secret")) }

async fn send<T: Translator + 'static>(
  state: AppState<SqliteStore, T>,
  req: Request<Body>,
) -> (StatusCode, Value, Option<String>) {
  let resp = router(state).oneshot(req).await.unwrap();
  let status = resp.status();
  let challenge = resp
    .headers()
    .get(header::WWW_AUTHENTICATE)
    .map(|v| v.to_str().unwrap().to_owned());
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, body, challenge)
}

fn post(uri: &str, auth: Option<&str>, body: impl Into<Body>) -> Request<Body> {
  let mut builder = Request::builder().method("POST").uri(uri);
  if let Some(a) = auth {
    builder = builder.header(header::AUTHORIZATION, a);
  }
  builder.body(body.into()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

// ─── Health & read API ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let state = make_state(EchoTranslator).await;
  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let (status, body, _) = send(state, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn read_api_is_nested_under_api() {
  let state = make_state(EchoTranslator).await;
  let req = Request::builder().uri("/api/regions").body(Body::empty()).unwrap();
  let (status, body, _) = send(state, req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_require_credentials() {
  let state = make_state(EchoTranslator).await;
  let wrong = format!("Basic {}", B64.encode("admin:nope"));

  for uri in [
    "/api/admin/import/schemes",
    "/api/admin/import/water-data",
    "/api/admin/repair-urls",
    "/api/admin/refresh-regions",
  ] {
    let (status, body, challenge) = send(state.clone(), post(uri, None, "x")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    assert_eq!(challenge.as_deref(), Some("Basic realm=\"jal\""));
    assert_eq!(body["error"], "unauthorized");

    let (status, _, _) = send(state.clone(), post(uri, Some(&wrong), "x")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
  }
}

#[tokio::test]
async fn garbage_upload_is_a_bad_request() {
  let state = make_state(EchoTranslator).await;
  let (status, body, _) = send(
    state.clone(),
    post("/api/admin/import/schemes", Some(&admin_auth()), "definitely not xlsx"),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("workbook"));

  let (status, _, _) =
    send(state, post("/api/admin/import/water-data", Some(&admin_auth()), "")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_upload_conflicts() {
  let state = make_state(EchoTranslator).await;
  let bytes = b"previously imported workbook".to_vec();
  state
    .store
    .record_import(ImportBatch {
      batch_id:       Uuid::new_v4(),
      kind:           ImportKind::SchemeStatus,
      file_name:      Some("march.xlsx".into()),
      content_sha256: content_sha256(&bytes),
      rows_read:      10,
      counts:         ImportCounts { inserted: 10, ..ImportCounts::default() },
      invalid_rows:   0,
      imported_at:    chrono::Utc::now(),
    })
    .await
    .unwrap();

  let (status, body, _) = send(
    state.clone(),
    post("/api/admin/import/schemes", Some(&admin_auth()), bytes.clone()),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("already imported"));

  let (status, _, _) = send(
    state,
    post("/api/admin/import/schemes?force=true", Some(&admin_auth()), bytes),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repair_and_refresh_over_http() {
  let state = make_state(EchoTranslator).await;
  state
    .store
    .upsert_scheme(
      NewScheme {
        scheme_id:         "S1".into(),
        scheme_name:       "Wagholi RR".into(),
        hierarchy:         Hierarchy {
          region:       "Pune".into(),
          circle:       "Pune".into(),
          division:     "Pune".into(),
          sub_division: "Haveli".into(),
          block:        "Haveli".into(),
        },
        reported_hierarchy: None,
        agency:            None,
        counters:          SchemeCounters {
          total_villages: 3,
          villages_integrated: 2,
          ..SchemeCounters::default()
        },
        functional_status: Default::default(),
      },
      WriteMode::Skip,
    )
    .await
    .unwrap();

  let (status, body, _) = send(
    state.clone(),
    post("/api/admin/repair-urls?dry_run=true", Some(&admin_auth()), Body::empty()),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["schemes"]["missing"], 1);
  assert_eq!(body["schemes"]["rewritten"], 0);

  let (_, body, _) = send(
    state.clone(),
    post("/api/admin/repair-urls", Some(&admin_auth()), Body::empty()),
  )
  .await;
  assert_eq!(body["schemes"]["rewritten"], 1);

  let (status, body, _) = send(
    state,
    post("/api/admin/refresh-regions", Some(&admin_auth()), Body::empty()),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["region_name"], "Pune");
  assert_eq!(body[0]["total_villages_integrated"], 2);
}

// ─── Translation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn translate_relays_to_the_translator() {
  let state = make_state(EchoTranslator).await;
  let (status, body, _) = send(
    state,
    post_json("/api/translate", json!({ "text": "पाणी", "target": "en" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["translated"], "[auto->en] पाणी");
}

#[tokio::test]
async fn translate_rejects_long_text() {
  let state = make_state(EchoTranslator).await;
  let text = "a".repeat(5001);
  let (status, _, _) = send(
    state,
    post_json("/api/translate", json!({ "text": text, "source": "en", "target": "mr" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn translate_upstream_failure_is_bad_gateway() {
  let state = make_state(DownTranslator).await;
  let (status, body, _) = send(
    state,
    post_json("/api/translate", json!({ "text": "hello", "target": "mr" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].as_str().unwrap().contains("503"));
}
