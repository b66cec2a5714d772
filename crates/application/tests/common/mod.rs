//! Shared fakes for the application integration tests.
//!
//! `MockTransport` plays the API server: protected paths accept only the
//! currently valid access token, and the refresh endpoint can be held
//! behind a gate so tests can pile requests up behind an in-flight
//! exchange. Both fakes write to one journal so tests can assert the
//! relative order of storage writes, requests and sign-outs.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use ignite_application::auth::REFRESH_PATH;
use ignite_application::use_cases::SESSIONS_PATH;
use ignite_application::{
    AuthenticatedClient, RefreshConfig, SessionManager, SignOutRegistration, StorageError,
    TokenStore, Transport, TransportError,
};
use ignite_domain::{ApiRequest, ApiResponse, Credentials, RequestBody, SessionUser};

/// Ordered record of everything the fakes observed.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Index of the first entry matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&str) -> bool) -> Option<usize> {
        self.0.lock().iter().position(|e| predicate(e))
    }

    pub fn count(&self, predicate: impl Fn(&str) -> bool) -> usize {
        self.0.lock().iter().filter(|e| predicate(e)).count()
    }
}

pub const PASSWORD: &str = "secret";
pub const BAD_CREDENTIALS: &str = "E-mail e/ou senha incorreta.";

pub struct MockTransport {
    journal: Journal,
    accepted: Mutex<Option<String>>,
    refresh_reply: Mutex<Result<ApiResponse, TransportError>>,
    rotates: AtomicBool,
    gate: Semaphore,
    refreshes: AtomicUsize,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// A server that accepts no token yet and renews to `T2`/`R2`.
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            accepted: Mutex::new(None),
            refresh_reply: Mutex::new(Ok(ApiResponse::json(
                200,
                &json!({"token": "T2", "refresh_token": "R2"}),
            ))),
            rotates: AtomicBool::new(true),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
            refreshes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Holds every refresh exchange until [`release`](Self::release).
    pub fn gated(mut self) -> Self {
        self.gate = Semaphore::new(0);
        self
    }

    pub fn refresh_reply(self, reply: Result<ApiResponse, TransportError>) -> Self {
        *self.refresh_reply.lock() = reply;
        self
    }

    /// A successful refresh no longer makes the new token valid.
    pub fn without_rotation(self) -> Self {
        self.rotates.store(false, Ordering::SeqCst);
        self
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Makes the server reject every token it currently accepts.
    pub fn expire_sessions(&self) {
        *self.accepted.lock() = None;
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    async fn refresh(&self) -> Result<ApiResponse, TransportError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| TransportError::Cancelled)?;
        self.refreshes.fetch_add(1, Ordering::SeqCst);

        let reply = self.refresh_reply.lock().clone();
        if let Ok(response) = &reply
            && response.is_success()
            && self.rotates.load(Ordering::SeqCst)
        {
            let body: Value = response.decode().unwrap_or_default();
            *self.accepted.lock() = body["token"].as_str().map(str::to_string);
        }
        reply
    }

    fn sign_in(&self, request: &ApiRequest) -> ApiResponse {
        let RequestBody::Json(body) = &request.body else {
            return ApiResponse::new(400, "");
        };
        if body["password"] != PASSWORD {
            return ApiResponse::json(401, &json!({"status": "error", "message": BAD_CREDENTIALS}));
        }
        *self.accepted.lock() = Some("T1".to_string());
        ApiResponse::json(
            200,
            &json!({
                "user": {"id": 1, "name": "Ana", "email": body["email"]},
                "token": "T1",
                "refresh_token": "R1"
            }),
        )
    }

    fn protected(&self, request: &ApiRequest) -> ApiResponse {
        let accepted = self.accepted.lock().clone();
        match (request.bearer_token(), accepted) {
            (Some(sent), Some(valid)) if sent == valid => {
                ApiResponse::json(200, &json!({"path": request.path, "token": sent}))
            }
            _ => ApiResponse::json(401, &json!({"status": "error", "message": "token.expired"})),
        }
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.journal.push(format!(
            "{} {} {}",
            request.method,
            request.path,
            request.bearer_token().unwrap_or("-")
        ));
        self.requests.lock().push(request.clone());

        match request.path.as_str() {
            REFRESH_PATH => self.refresh().await,
            SESSIONS_PATH => Ok(self.sign_in(request)),
            "/offline" => Err(TransportError::ConnectionFailed("connection refused".to_string())),
            "/missing" => Ok(ApiResponse::json(
                404,
                &json!({"status": "error", "message": "Resource not found"}),
            )),
            "/banned" => Ok(ApiResponse::json(
                401,
                &json!({"status": "error", "message": "user.blocked"}),
            )),
            _ => Ok(self.protected(request)),
        }
    }
}

pub struct MemoryStore {
    journal: Journal,
    credentials: Mutex<Option<Credentials>>,
    user: Mutex<Option<SessionUser>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            credentials: Mutex::new(None),
            user: Mutex::new(None),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn with_credentials(self, credentials: Credentials) -> Self {
        *self.credentials.lock() = Some(credentials);
        self
    }

    pub fn with_user(self, user: SessionUser) -> Self {
        *self.user.lock() = Some(user);
        self
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.lock().clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.user.lock().clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn get_credentials(&self) -> Result<Option<Credentials>, StorageError> {
        Ok(self.credentials.lock().clone())
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.check_writable()?;
        self.journal.push(format!(
            "save credentials {}/{}",
            credentials.access_token, credentials.refresh_token
        ));
        *self.credentials.lock() = Some(credentials.clone());
        Ok(())
    }

    async fn remove_credentials(&self) -> Result<(), StorageError> {
        self.journal.push("remove credentials");
        *self.credentials.lock() = None;
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<SessionUser>, StorageError> {
        Ok(self.user.lock().clone())
    }

    async fn save_user(&self, user: &SessionUser) -> Result<(), StorageError> {
        self.check_writable()?;
        self.journal.push(format!("save user {}", user.name));
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    async fn remove_user(&self) -> Result<(), StorageError> {
        self.journal.push("remove user");
        *self.user.lock() = None;
        Ok(())
    }
}

pub type TestClient = AuthenticatedClient<MockTransport, MemoryStore>;

/// A client signed in with `T1`/`R1` whose access token the server has
/// already expired.
pub struct Fixture {
    pub journal: Journal,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
    pub client: TestClient,
    sign_outs: Arc<AtomicUsize>,
    _registration: SignOutRegistration,
}

impl Fixture {
    pub fn new(configure: impl FnOnce(MockTransport) -> MockTransport) -> Self {
        Self::with_config(configure, RefreshConfig::default())
    }

    pub fn with_config(
        configure: impl FnOnce(MockTransport) -> MockTransport,
        config: RefreshConfig,
    ) -> Self {
        Self::build(
            configure,
            |store| store.with_credentials(Credentials::new("T1", "R1")),
            config,
        )
    }

    pub fn build(
        configure: impl FnOnce(MockTransport) -> MockTransport,
        seed: impl FnOnce(MemoryStore) -> MemoryStore,
        config: RefreshConfig,
    ) -> Self {
        let journal = Journal::default();
        let transport = Arc::new(configure(MockTransport::new(&journal)));
        let store = Arc::new(seed(MemoryStore::new(&journal)));
        let client = AuthenticatedClient::new(Arc::clone(&transport), Arc::clone(&store), config);
        client.set_access_token("T1");

        let sign_outs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&sign_outs);
        let log = journal.clone();
        let registration = client.register_sign_out_handler(move || {
            let counter = Arc::clone(&counter);
            let log = log.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                log.push("sign-out");
            }
        });

        Self {
            journal,
            transport,
            store,
            client,
            sign_outs,
            _registration: registration,
        }
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    /// Spawns `GET path` and records its completion in the journal.
    pub fn spawn_get(
        &self,
        path: &str,
    ) -> tokio::task::JoinHandle<ignite_application::ClientResult<ApiResponse>> {
        let client = self.client.clone();
        let journal = self.journal.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            let result = client.get(&path).await;
            journal.push(format!("done {path}"));
            result
        })
    }
}

pub type Session = (
    SessionManager<MockTransport, MemoryStore>,
    Arc<MockTransport>,
    Arc<MemoryStore>,
    Journal,
);

/// A signed-out session manager over a fresh server and store.
pub fn session_manager(seed: impl FnOnce(MemoryStore) -> MemoryStore) -> Session {
    session_manager_with(|t| t, seed)
}

pub fn session_manager_with(
    configure: impl FnOnce(MockTransport) -> MockTransport,
    seed: impl FnOnce(MemoryStore) -> MemoryStore,
) -> Session {
    let journal = Journal::default();
    let transport = Arc::new(configure(MockTransport::new(&journal)));
    let store = Arc::new(seed(MemoryStore::new(&journal)));
    let client = AuthenticatedClient::new(
        Arc::clone(&transport),
        Arc::clone(&store),
        RefreshConfig::default(),
    );
    let manager = SessionManager::new(client, Arc::clone(&store));
    (manager, transport, store, journal)
}

/// Yields to the runtime until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
