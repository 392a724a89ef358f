//! In-memory notes API used by the unit tests.
//!
//! Mirrors the REST contract of the real server closely enough to drive the
//! session and note components end to end: accounts, bearer tokens, notes
//! with server-assigned ids, plus switches for outages, forced statuses and
//! holding a request in flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tokio::sync::Notify;

use crate::auth::{NavigationSink, Route};
use crate::models::{Note, NoteFields, NoteId, User};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct FakeState {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    notes: Vec<Note>,
    next_user: u64,
    next_token: u64,
    next_note: u64,
    requests: Vec<RecordedRequest>,
    offline: bool,
    forced_status: Option<StatusCode>,
    forced_route: Option<(Method, String, StatusCode)>,
}

#[derive(Default)]
struct Gate {
    held: AtomicBool,
    arrived: Notify,
    release: Notify,
}

#[derive(Default)]
pub struct FakeNotesServer {
    state: Mutex<FakeState>,
    gate: Gate,
}

impl FakeNotesServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake server state poisoned")
    }

    pub fn add_account(&self, username: &str, password: &str) -> User {
        self.lock().create_account(username, password)
    }

    /// Hand out a token as if the user had logged in earlier.
    pub fn issue_token(&self, username: &str) -> String {
        let mut state = self.lock();
        let user_id = state
            .accounts
            .iter()
            .find(|account| account.user.username == username)
            .map(|account| account.user.id.clone())
            .expect("unknown account");
        state.issue_token(user_id)
    }

    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    pub fn insert_note(&self, title: &str, content: &str) -> Note {
        self.lock().create_note(NoteFields::new(title, content))
    }

    /// Simulate a deletion made somewhere else.
    pub fn remove_note(&self, id: &str) {
        self.lock().notes.retain(|note| note.id.as_str() != id);
    }

    pub fn notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn fail_next(&self, status: StatusCode) {
        self.lock().forced_status = Some(status);
    }

    /// Fail the next request to `method path` only; other routes keep working.
    pub fn fail_next_on(&self, method: Method, path: &str, status: StatusCode) {
        self.lock().forced_route = Some((method, path.to_string(), status));
    }

    /// Park the next request until [`FakeNotesServer::release`] is called.
    pub fn hold_requests(&self) {
        self.gate.held.store(true, Ordering::SeqCst);
    }

    pub async fn wait_for_held_request(&self) {
        self.gate.arrived.notified().await;
    }

    pub fn release(&self) {
        self.gate.held.store(false, Ordering::SeqCst);
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl HttpTransport for FakeNotesServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if self.gate.held.load(Ordering::SeqCst) {
            self.gate.arrived.notify_one();
            self.gate.release.notified().await;
        }

        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method: request.method().clone(),
            path: request.path().to_string(),
            bearer: request.bearer_token().map(str::to_string),
        });
        if state.offline {
            return Err(TransportError::Unreachable(
                "connection refused".to_string(),
            ));
        }
        let route_hit = state.forced_route.as_ref().is_some_and(|(method, path, _)| {
            method == request.method() && path == request.path()
        });
        let forced = if route_hit {
            state.forced_route.take().map(|(_, _, status)| status)
        } else {
            state.forced_status.take()
        };
        if let Some(status) = forced {
            return Ok(ApiResponse::json(
                status,
                &json!({ "message": "Forced failure" }),
            ));
        }
        Ok(state.route(&request))
    }
}

impl FakeState {
    fn create_account(&mut self, username: &str, password: &str) -> User {
        self.next_user += 1;
        let user = User {
            id: format!("u{}", self.next_user),
            username: username.to_string(),
        };
        self.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    fn issue_token(&mut self, user_id: String) -> String {
        self.next_token += 1;
        let token = format!("t{}", self.next_token);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn create_note(&mut self, fields: NoteFields) -> Note {
        self.next_note += 1;
        let note = Note {
            id: NoteId::new(format!("n{}", self.next_note)),
            title: fields.title,
            content: fields.content,
        };
        self.notes.push(note.clone());
        note
    }

    fn route(&mut self, request: &ApiRequest) -> ApiResponse {
        match (request.method(), request.path()) {
            (&Method::POST, "/auth/register") => self.register(request),
            (&Method::POST, "/auth/login") => self.login(request),
            (&Method::GET, "/auth/me") => match self.authorize(request) {
                Ok(user) => ApiResponse::json(StatusCode::OK, &json!({ "user": user })),
                Err(response) => response,
            },
            (method, path) => {
                if let Err(response) = self.authorize(request) {
                    return response;
                }
                self.route_notes(method, path, request)
            }
        }
    }

    fn route_notes(&mut self, method: &Method, path: &str, request: &ApiRequest) -> ApiResponse {
        let note_id = path
            .strip_prefix("/notes/")
            .and_then(|raw| urlencoding::decode(raw).ok())
            .map(|id| id.into_owned());

        match (method, path, note_id) {
            (&Method::GET, "/notes", _) => ApiResponse::json(StatusCode::OK, &json!(self.notes)),
            (&Method::POST, "/notes", _) => match note_fields(request) {
                Some(fields) => {
                    let note = self.create_note(fields);
                    ApiResponse::json(StatusCode::CREATED, &json!(note))
                }
                None => bad_request("Title and content are required"),
            },
            (&Method::PUT, _, Some(id)) => {
                let Some(fields) = note_fields(request) else {
                    return bad_request("Title and content are required");
                };
                match self.notes.iter_mut().find(|note| note.id.as_str() == id) {
                    Some(note) => {
                        note.title = fields.title;
                        note.content = fields.content;
                        ApiResponse::json(StatusCode::OK, &json!(note))
                    }
                    None => not_found("Note not found"),
                }
            }
            (&Method::DELETE, _, Some(id)) => {
                let before = self.notes.len();
                self.notes.retain(|note| note.id.as_str() != id);
                if self.notes.len() == before {
                    not_found("Note not found")
                } else {
                    ApiResponse::json(StatusCode::OK, &json!({ "message": "Note deleted" }))
                }
            }
            _ => not_found("Route not found"),
        }
    }

    fn register(&mut self, request: &ApiRequest) -> ApiResponse {
        let Some((username, password)) = credentials(request) else {
            return bad_request("Username and password are required");
        };
        if self
            .accounts
            .iter()
            .any(|account| account.user.username == username)
        {
            return ApiResponse::json(
                StatusCode::CONFLICT,
                &json!({ "message": "Username already exists" }),
            );
        }
        let user = self.create_account(&username, &password);
        ApiResponse::json(
            StatusCode::CREATED,
            &json!({ "message": "User registered successfully", "user": user }),
        )
    }

    fn login(&mut self, request: &ApiRequest) -> ApiResponse {
        let Some((username, password)) = credentials(request) else {
            return bad_request("Username and password are required");
        };
        let user = self
            .accounts
            .iter()
            .find(|account| account.user.username == username && account.password == password)
            .map(|account| account.user.clone());
        match user {
            Some(user) => {
                let token = self.issue_token(user.id.clone());
                ApiResponse::json(StatusCode::OK, &json!({ "token": token, "user": user }))
            }
            None => ApiResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({ "message": "Invalid credentials" }),
            ),
        }
    }

    fn authorize(&self, request: &ApiRequest) -> Result<User, ApiResponse> {
        let unauthorized = || {
            ApiResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({ "message": "Invalid or expired token" }),
            )
        };
        let token = request.bearer_token().ok_or_else(unauthorized)?;
        let user_id = self.tokens.get(token).ok_or_else(unauthorized)?;
        self.accounts
            .iter()
            .find(|account| &account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or_else(unauthorized)
    }
}

fn credentials(request: &ApiRequest) -> Option<(String, String)> {
    let body = request.body()?;
    let username = body.get("username")?.as_str()?.to_string();
    let password = body.get("password")?.as_str()?.to_string();
    Some((username, password))
}

fn note_fields(request: &ApiRequest) -> Option<NoteFields> {
    let fields: NoteFields = serde_json::from_value(request.body()?.clone()).ok()?;
    if fields.title.trim().is_empty() || fields.content.trim().is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn bad_request(message: &str) -> ApiResponse {
    ApiResponse::json(StatusCode::BAD_REQUEST, &json!({ "message": message }))
}

fn not_found(message: &str) -> ApiResponse {
    ApiResponse::json(StatusCode::NOT_FOUND, &json!({ "message": message }))
}

/// Navigation sink that remembers every route it was sent to.
#[derive(Default)]
pub struct RecordingNavigation {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("navigation log poisoned").clone()
    }
}

impl NavigationSink for RecordingNavigation {
    fn navigate(&self, route: Route) {
        self.routes
            .lock()
            .expect("navigation log poisoned")
            .push(route);
    }
}
