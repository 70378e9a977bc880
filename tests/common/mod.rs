//! Shared fixtures for integration tests: in-memory SQLite, in-memory storage,
//! seed data and tokens.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use omni_saude_server::config::{sync_schema, AppConfig, AppEnv, RateLimitConfig, UploadConfig};
use omni_saude_server::domain::event::dto::EventRequest;
use omni_saude_server::domain::event::entity::health_event::EventType;
use omni_saude_server::domain::file::entity::file_info::{self, FileSlot};
use omni_saude_server::domain::file::storage::{
    storage_key, DeleteOutcome, FileStorage, StorageError, StoredFile,
};
use omni_saude_server::domain::professional::entity::professional;
use omni_saude_server::domain::user::entity::user::{self, UserRole};
use omni_saude_server::utils::jwt::encode_token;
use omni_saude_server::AppState;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const PUBLIC_BASE_URL: &str = "http://test.local";
pub const TEST_MAX_UPLOAD_BYTES: u64 = 1024;

/// Byte store kept in memory; records every delete it receives.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    deletes: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn contains(&self, url: &str) -> bool {
        self.objects.lock().unwrap().contains_key(url)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn deleted_urls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn put(&self, url: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let key = storage_key(original_name);
        let url = format!("{}/uploads/{}", PUBLIC_BASE_URL, key);
        self.put(&url, bytes);
        Ok(StoredFile { key, url })
    }

    async fn delete(&self, url: &str) -> Result<DeleteOutcome, StorageError> {
        self.deletes.lock().unwrap().push(url.to_string());
        match self.objects.lock().unwrap().remove(url) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

pub struct TestContext {
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
}

impl TestContext {
    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }
}

pub fn test_config(rate_limit: RateLimitConfig) -> AppConfig {
    AppConfig {
        server_port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        app_env: AppEnv::Development,
        upload: UploadConfig {
            max_bytes: TEST_MAX_UPLOAD_BYTES,
            upload_dir: std::env::temp_dir()
                .join("omni-saude-test-uploads")
                .to_string_lossy()
                .into_owned(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
        rate_limit,
    }
}

/// One pooled connection: every `sqlite::memory:` connection is its own database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(3600))
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite connect");
    sync_schema(&db).await.expect("schema sync");
    db
}

pub async fn setup() -> TestContext {
    setup_with_rate_limit(RateLimitConfig {
        enabled: false,
        ..RateLimitConfig::default()
    })
    .await
}

pub async fn setup_with_rate_limit(rate_limit: RateLimitConfig) -> TestContext {
    let db = setup_db().await;
    let storage = Arc::new(MemoryStorage::default());
    let state = AppState::new(db, test_config(rate_limit), storage.clone());
    TestContext { state, storage }
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
}

pub async fn seed_professional(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> professional::Model {
    let now = Utc::now().naive_utc();
    professional::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        specialty: Set("Cardiologia".to_string()),
        contact: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed professional")
}

/// Inserts a file row attached to `event_id` and puts its bytes in `storage`.
pub async fn seed_event_file(
    ctx: &TestContext,
    user_id: i64,
    event_id: i64,
    professional_id: i64,
    slot: FileSlot,
) -> file_info::Model {
    let stored = ctx
        .storage
        .save("resultado.pdf", b"%PDF-1.4 test")
        .await
        .expect("save bytes");

    file_info::ActiveModel {
        user_id: Set(user_id),
        slot: Set(slot),
        name: Set("resultado.pdf".to_string()),
        url: Set(stored.url),
        mime_type: Set("application/pdf".to_string()),
        size_bytes: Set(13),
        uploaded_at: Set(Utc::now().naive_utc()),
        expires_at: Set(None),
        professional_id: Set(Some(professional_id)),
        event_id: Set(Some(event_id)),
        is_orphaned: Set(false),
        orphaned_reason: Set(None),
        ..Default::default()
    }
    .insert(ctx.db())
    .await
    .expect("seed file")
}

pub fn event_request(
    title: &str,
    date: &str,
    start: &str,
    end: &str,
    professional_id: i64,
) -> EventRequest {
    EventRequest {
        title: title.to_string(),
        description: None,
        date: date.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        event_type: EventType::Consulta,
        professional_id,
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

pub fn bearer(user_id: i64, role: UserRole) -> String {
    let token = encode_token(user_id, role, JWT_SECRET, 3600).expect("token");
    format!("Bearer {}", token)
}

pub const MULTIPART_BOUNDARY: &str = "----omni-saude-test-boundary";

/// One file part plus optional text fields, encoded as `multipart/form-data`.
pub fn multipart_body(
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    fields: &[(&str, &str)],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            MULTIPART_BOUNDARY, file_name, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn upload_request(authorization: Option<&str>, client_ip: &str, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/files")
        .header("x-forwarded-for", client_ip)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        );
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body)).expect("request")
}
