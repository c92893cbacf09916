//! Reusable test helpers.
//!
//! In-memory stand-ins for the data gateway, object store and message
//! composer, plus `TestApp` for sending requests through the full axum router
//! via `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

use huddle_server::api::{create_router, AppState};
use huddle_server::auth::issue_session_token;
use huddle_server::config::Config;
use huddle_server::db::check_supported;
use huddle_server::dispatch::CommandDispatcher;
use huddle_server::gateway::{
    ComposerError, DataGateway, Filter, GatewayError, MessageComposer, MessageRecord,
    ObjectStore, Patch, PublicUrl, PutOptions, Record, StoreError, Table, UserRecord,
};
use huddle_server::moderation::ModerationExecutor;
use huddle_server::session::{Role, Session};
use huddle_server::uploads::{UploadGatekeeper, UploadPolicy};

/// Smallest byte prefix `infer` recognises as PNG.
pub const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

// ============================================================================
// Sessions
// ============================================================================

pub fn session(username: &str, role: Role) -> Session {
    Session::new(Uuid::now_v7(), username, capitalize(username), role)
}

pub fn owner() -> Session {
    session("alice", Role::Owner)
}

pub fn admin() -> Session {
    session("dave", Role::Admin)
}

pub fn member() -> Session {
    session("carol", Role::User)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// ============================================================================
// Data gateway
// ============================================================================

/// Table rows kept in memory, with switches for failure injection.
#[derive(Default)]
pub struct InMemoryGateway {
    records: Mutex<Vec<Record>>,
    pub fail_message_inserts: AtomicBool,
    pub fail_updates: AtomicBool,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub selects: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Gateway seeded with the given users.
    pub fn with_users(users: &[(&str, Role)]) -> Arc<Self> {
        let gateway = Self::default();
        {
            let mut records = gateway.records.lock().unwrap();
            for (username, role) in users {
                records.push(Record::User(UserRecord {
                    username: (*username).to_string(),
                    role: *role,
                    online: true,
                }));
            }
        }
        Arc::new(gateway)
    }

    pub fn seed_message(&self, room: &str, text: &str) {
        self.records.lock().unwrap().push(Record::Message(MessageRecord::new(
            Uuid::now_v7(),
            "Someone",
            room,
            text,
        )));
    }

    pub fn user(&self, username: &str) -> Option<UserRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .filter_map(Record::into_user)
            .find(|u| u.username == username)
    }

    pub fn messages(&self) -> Vec<MessageRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.as_message().cloned())
            .collect()
    }

    pub fn messages_in(&self, room: &str) -> Vec<MessageRecord> {
        self.messages().into_iter().filter(|m| m.room == room).collect()
    }

    /// Messages posted by the system sender.
    pub fn system_messages(&self) -> Vec<MessageRecord> {
        self.messages()
            .into_iter()
            .filter(|m| m.sender_name.starts_with("System"))
            .collect()
    }

    pub fn announcements(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.table() == Table::Announcements)
            .count()
    }

    pub fn mutations(&self) -> usize {
        self.inserts.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn insert(&self, record: Record) -> Result<Record, GatewayError> {
        if record.table() == Table::Messages && self.fail_message_inserts.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend("messages insert refused".into()));
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, GatewayError> {
        check_supported(table, filter, patch)?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend("update refused".into()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut rows = 0;
        for record in self.records.lock().unwrap().iter_mut() {
            if record.table() == table && filter.matches(record) && patch.apply(record) {
                rows += 1;
            }
        }
        Ok(rows)
    }

    async fn select_one(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<Record>, GatewayError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.table() == table && filter.matches(r))
            .cloned())
    }
}

// ============================================================================
// Object store
// ============================================================================

/// Object store kept in memory. Can hold writes until released.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, PutOptions)>>,
    pub puts: AtomicUsize,
    /// Every write fails as a key collision.
    pub collide: AtomicBool,
    /// Writes wait for [`InMemoryStore::release`] before completing.
    pub hold: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding() -> Arc<Self> {
        let store = Self::default();
        store.hold.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    /// Wait until a write has started.
    pub async fn wait_for_put(&self) {
        self.entered.notified().await;
    }

    /// Let a held write complete.
    pub fn release(&self) {
        self.released.notify_one();
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn options(&self, key: &str) -> Option<PutOptions> {
        self.objects.lock().unwrap().get(key).map(|(_, o)| o.clone())
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        if self.hold.load(Ordering::SeqCst) {
            self.released.notified().await;
        }

        if self.collide.load(Ordering::SeqCst) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) && !options.overwrite {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), (bytes, options));
        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<PublicUrl, StoreError> {
        Ok(PublicUrl(format!("http://store.test/chat-images/{key}")))
    }
}

// ============================================================================
// Message composer
// ============================================================================

/// A composed message: room, text and attachment URL.
pub type Composed = (String, String, Option<String>);

#[derive(Default)]
pub struct RecordingComposer {
    pub posted: Mutex<Vec<Composed>>,
    pub fail: AtomicBool,
}

impl RecordingComposer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn posted(&self) -> Vec<Composed> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageComposer for RecordingComposer {
    async fn post(
        &self,
        _session: &Session,
        room: &str,
        text: &str,
        attachment_url: Option<&str>,
    ) -> Result<(), ComposerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ComposerError::Gateway(GatewayError::Backend(
                "composer offline".into(),
            )));
        }
        self.posted.lock().unwrap().push((
            room.to_string(),
            text.to_string(),
            attachment_url.map(String::from),
        ));
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub fn executor(gateway: &Arc<InMemoryGateway>) -> ModerationExecutor {
    ModerationExecutor::new(gateway.clone(), "public")
}

pub fn gatekeeper(store: &Arc<InMemoryStore>, composer: &Arc<RecordingComposer>) -> UploadGatekeeper {
    UploadGatekeeper::new(store.clone(), composer.clone(), UploadPolicy::default())
}

pub fn dispatcher(
    gateway: &Arc<InMemoryGateway>,
    uploads: Option<(&Arc<InMemoryStore>, &Arc<RecordingComposer>)>,
) -> CommandDispatcher {
    CommandDispatcher::new(
        executor(gateway),
        uploads.map(|(store, composer)| Arc::new(gatekeeper(store, composer))),
    )
}

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub config: Arc<Config>,
}

impl TestApp {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        let config = Config::default_for_test();
        let router = create_router(AppState::new(config.clone(), dispatcher));

        Self {
            router,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Bearer token for `session`, signed with the app's secret.
    pub fn token(&self, session: &Session) -> String {
        issue_session_token(session, &self.config.jwt_secret, 900)
            .expect("Failed to issue test token")
    }

    /// JSON request authenticated as `session`.
    pub fn json_request(
        &self,
        method: Method,
        uri: &str,
        session: &Session,
        body: &serde_json::Value,
    ) -> Request<Body> {
        Self::request(method, uri)
            .header("Authorization", format!("Bearer {}", self.token(session)))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Multipart body with one `file` part and an optional `room` part.
pub fn multipart_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
    room: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(room) = room {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"room\"\r\n\r\n{room}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
