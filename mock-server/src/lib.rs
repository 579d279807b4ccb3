//! In-memory stand-in for the slice of the Watson REST APIs the client
//! covers: Visual Recognition v3 classifiers, Assistant v1 workspaces and
//! Assistant v2 sessions.
//!
//! Every route requires an `Authorization` header and a non-empty `version`
//! query parameter, and errors use the `{"error", "code"}` body shape of the
//! real service.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_CLASSES: &[(&str, f64)] = &[("fruit", 0.92), ("banana", 0.79), ("yellow color", 0.64), ("food", 0.41)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStatus {
    Ready,
    Training,
    Retraining,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub classifier_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub status: ClassifierStatus,
    pub classes: Vec<Class>,
}

impl Classifier {
    /// A ready classifier owned by `mock-owner`.
    pub fn new(classifier_id: impl Into<String>, name: impl Into<String>, classes: &[&str]) -> Self {
        Self {
            classifier_id: classifier_id.into(),
            name: name.into(),
            owner: Some("mock-owner".to_string()),
            status: ClassifierStatus::Ready,
            classes: classes
                .iter()
                .map(|class| Class {
                    class: class.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub workspace_id: String,
    pub name: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_opt_out: Option<bool>,
    pub status: String,
}

impl Workspace {
    pub fn new(workspace_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            name: name.into(),
            language: "en".to_string(),
            description: None,
            metadata: None,
            learning_opt_out: None,
            status: "Available".to_string(),
        }
    }
}

struct StoredClassifier {
    classifier: Classifier,
    /// GETs left before a training classifier turns ready.
    pending_polls: Option<u32>,
}

struct Session {
    assistant_id: String,
    turns: u64,
}

#[derive(Default)]
struct Inner {
    classifiers: HashMap<String, StoredClassifier>,
    workspaces: HashMap<String, Workspace>,
    sessions: HashMap<String, Session>,
}

/// Shared server state. Clones share the same store, so a test can keep a
/// handle and seed or inspect it while the server runs.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<RwLock<Inner>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_classifier(&self, classifier: Classifier) {
        let id = classifier.classifier_id.clone();
        self.inner.write().await.classifiers.insert(
            id,
            StoredClassifier {
                classifier,
                pending_polls: None,
            },
        );
    }

    /// Seed a classifier that reports `training` for the first
    /// `polls_until_ready` fetches and `ready` afterwards.
    pub async fn seed_training_classifier(&self, mut classifier: Classifier, polls_until_ready: u32) {
        classifier.status = ClassifierStatus::Training;
        let id = classifier.classifier_id.clone();
        self.inner.write().await.classifiers.insert(
            id,
            StoredClassifier {
                classifier,
                pending_polls: Some(polls_until_ready),
            },
        );
    }

    pub async fn seed_workspace(&self, workspace: Workspace) {
        let id = workspace.workspace_id.clone();
        self.inner.write().await.workspaces.insert(id, workspace);
    }

    pub async fn workspace(&self, workspace_id: &str) -> Option<Workspace> {
        self.inner.read().await.workspaces.get(workspace_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Resource not found: {what}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message, "code": self.status.as_u16() });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;
type Params = Query<HashMap<String, String>>;

pub fn app() -> Router {
    app_with_state(MockState::default())
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/v3/classify", get(classify))
        .route("/v3/detect_faces", get(detect_faces))
        .route("/v3/classifiers", get(list_classifiers))
        .route(
            "/v3/classifiers/{classifier_id}",
            get(get_classifier).delete(delete_classifier),
        )
        .route("/v1/workspaces", get(list_workspaces))
        .route(
            "/v1/workspaces/{workspace_id}",
            get(get_workspace).post(update_workspace).delete(delete_workspace),
        )
        .route("/v1/workspaces/{workspace_id}/message", post(message_v1))
        .route("/v2/assistants/{assistant_id}/sessions", post(create_session))
        .route(
            "/v2/assistants/{assistant_id}/sessions/{session_id}",
            delete(delete_session),
        )
        .route(
            "/v2/assistants/{assistant_id}/sessions/{session_id}/message",
            post(message_v2),
        )
        .route("/v2/assistants/{assistant_id}/message", post(message_v2_stateless))
        .layer(middleware::from_fn(require_version_and_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, MockState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn require_version_and_auth(request: Request, next: Next) -> Response {
    if !request.headers().contains_key(header::AUTHORIZATION) {
        return ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    let has_version = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(params)| params.get("version").is_some_and(|v| !v.is_empty()))
        .unwrap_or(false);
    if !has_version {
        return ApiError::bad_request("Missing required query parameter 'version'").into_response();
    }
    debug!(method = %request.method(), uri = %request.uri(), "mock request");
    next.run(request).await
}

fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params.get(name).is_some_and(|v| v == "true")
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> ApiResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing required query parameter '{name}'")))
}

/// Optional JSON object body; an empty body reads as `{}`.
fn object_body(body: &Bytes) -> ApiResult<Value> {
    if body.is_empty() {
        return Ok(json!({}));
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?;
    if !value.is_object() {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    }
    Ok(value)
}

fn custom_score(index: usize) -> f64 {
    (0.9 - 0.1 * index as f64).max(0.1)
}

// --- visual recognition ---

async fn classify(State(state): State<MockState>, Query(params): Params) -> ApiResult<Json<Value>> {
    let url = required(&params, "url")?;
    let threshold = match params.get("threshold") {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| ApiError::bad_request(format!("Invalid threshold '{raw}'")))?,
        None => DEFAULT_THRESHOLD,
    };
    let mut ids: Vec<&str> = params
        .get("classifier_ids")
        .map(|raw| raw.split(',').map(str::trim).filter(|id| !id.is_empty()).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        ids.push("default");
    }

    let inner = state.inner.read().await;
    let mut results = Vec::with_capacity(ids.len());
    let mut custom_classes = 0;
    for id in ids {
        let (name, scored): (String, Vec<(String, f64)>) = if id == "default" {
            let scored = DEFAULT_CLASSES.iter().map(|&(class, score)| (class.to_string(), score)).collect();
            ("default".to_string(), scored)
        } else {
            let stored = inner
                .classifiers
                .get(id)
                .ok_or_else(|| ApiError::not_found(format!("classifier {id}")))?;
            custom_classes += stored.classifier.classes.len();
            let scored = stored
                .classifier
                .classes
                .iter()
                .enumerate()
                .map(|(i, c)| (c.class.clone(), custom_score(i)))
                .collect();
            (stored.classifier.name.clone(), scored)
        };
        let classes: Vec<Value> = scored
            .into_iter()
            .filter(|(_, score)| *score >= threshold)
            .map(|(class, score)| json!({ "class": class, "score": score }))
            .collect();
        results.push(json!({ "name": name, "classifier_id": id, "classes": classes }));
    }

    Ok(Json(json!({
        "images_processed": 1,
        "custom_classes": custom_classes,
        "images": [{ "source_url": url, "resolved_url": url, "classifiers": results }],
    })))
}

async fn detect_faces(Query(params): Params) -> ApiResult<Json<Value>> {
    let url = required(&params, "url")?;
    Ok(Json(json!({
        "images_processed": 1,
        "images": [{
            "source_url": url,
            "resolved_url": url,
            "faces": [{
                "age": { "min": 35, "max": 44, "score": 0.45 },
                "gender": { "gender": "MALE", "gender_label": "male", "score": 0.99 },
                "face_location": { "width": 92, "height": 159, "left": 256, "top": 64 },
            }],
        }],
    })))
}

async fn list_classifiers(State(state): State<MockState>, Query(params): Params) -> Json<Value> {
    let verbose = flag(&params, "verbose");
    let inner = state.inner.read().await;
    let mut stored: Vec<&Classifier> = inner.classifiers.values().map(|s| &s.classifier).collect();
    stored.sort_by(|a, b| a.classifier_id.cmp(&b.classifier_id));
    let classifiers: Vec<Value> = stored
        .into_iter()
        .map(|c| {
            if verbose {
                json!(c)
            } else {
                json!({ "classifier_id": c.classifier_id, "name": c.name })
            }
        })
        .collect();
    Json(json!({ "classifiers": classifiers }))
}

async fn get_classifier(
    State(state): State<MockState>,
    Path(classifier_id): Path<String>,
) -> ApiResult<Json<Classifier>> {
    let mut inner = state.inner.write().await;
    let stored = inner
        .classifiers
        .get_mut(&classifier_id)
        .ok_or_else(|| ApiError::not_found(format!("classifier {classifier_id}")))?;
    match stored.pending_polls {
        Some(0) => {
            stored.classifier.status = ClassifierStatus::Ready;
            stored.pending_polls = None;
        }
        Some(remaining) => stored.pending_polls = Some(remaining - 1),
        None => {}
    }
    Ok(Json(stored.classifier.clone()))
}

async fn delete_classifier(
    State(state): State<MockState>,
    Path(classifier_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut inner = state.inner.write().await;
    inner
        .classifiers
        .remove(&classifier_id)
        .map(|_| Json(json!({})))
        .ok_or_else(|| ApiError::not_found(format!("classifier {classifier_id}")))
}

// --- assistant v1 ---

async fn list_workspaces(State(state): State<MockState>, Query(params): Params) -> Json<Value> {
    let inner = state.inner.read().await;
    let mut workspaces: Vec<&Workspace> = inner.workspaces.values().collect();
    match params.get("sort").map(String::as_str) {
        Some("name") => workspaces.sort_by(|a, b| a.name.cmp(&b.name)),
        Some("-name") => workspaces.sort_by(|a, b| b.name.cmp(&a.name)),
        _ => workspaces.sort_by(|a, b| a.workspace_id.cmp(&b.workspace_id)),
    }
    let total = workspaces.len();
    let mut body = json!({ "workspaces": workspaces });
    if flag(&params, "include_count") {
        body["pagination"] = json!({ "refresh_url": "/v1/workspaces", "total": total });
    }
    Json(body)
}

async fn get_workspace(
    State(state): State<MockState>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<Workspace>> {
    state
        .workspace(&workspace_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("workspace {workspace_id}")))
}

async fn update_workspace(
    State(state): State<MockState>,
    Path(workspace_id): Path<String>,
    Json(update): Json<Map<String, Value>>,
) -> ApiResult<Json<Workspace>> {
    let mut inner = state.inner.write().await;
    let workspace = inner
        .workspaces
        .get_mut(&workspace_id)
        .ok_or_else(|| ApiError::not_found(format!("workspace {workspace_id}")))?;
    let mut updated = workspace.clone();
    apply_update(&mut updated, update)?;
    *workspace = updated.clone();
    Ok(Json(updated))
}

/// Apply a partial update: a missing key leaves the property alone, `null`
/// clears it. `name` and `language` cannot be cleared.
fn apply_update(workspace: &mut Workspace, update: Map<String, Value>) -> ApiResult<()> {
    for (key, value) in update {
        match key.as_str() {
            "name" => workspace.name = required_string(&key, value)?,
            "language" => workspace.language = required_string(&key, value)?,
            "description" => workspace.description = optional(&key, value)?,
            "metadata" => workspace.metadata = optional(&key, value)?,
            "learning_opt_out" => workspace.learning_opt_out = optional(&key, value)?,
            _ => {}
        }
    }
    Ok(())
}

fn required_string(key: &str, value: Value) -> ApiResult<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ApiError::bad_request(format!("Property '{key}' must be a string"))),
    }
}

fn optional<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> ApiResult<Option<T>> {
    serde_json::from_value(value).map_err(|e| ApiError::bad_request(format!("Invalid value for '{key}': {e}")))
}

async fn delete_workspace(
    State(state): State<MockState>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut inner = state.inner.write().await;
    inner
        .workspaces
        .remove(&workspace_id)
        .map(|_| Json(json!({})))
        .ok_or_else(|| ApiError::not_found(format!("workspace {workspace_id}")))
}

fn user_text(request: &Value) -> Option<&str> {
    request
        .pointer("/input/text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

fn reply_text(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("You said: {text}"),
        None => "Hello, how can I help you?".to_string(),
    }
}

fn visited_node(text: Option<&str>) -> (&'static str, &'static str) {
    if text.is_some() {
        ("node_echo", "branch_start")
    } else {
        ("node_welcome", "welcome")
    }
}

async fn message_v1(
    State(state): State<MockState>,
    Path(workspace_id): Path<String>,
    Query(params): Params,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    if state.workspace(&workspace_id).await.is_none() {
        return Err(ApiError::not_found(format!("workspace {workspace_id}")));
    }
    let request = object_body(&body)?;
    let text = user_text(&request);
    let reply = reply_text(text);
    let (node, _) = visited_node(text);

    let mut context = request
        .get("context")
        .filter(|c| c.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}));
    if context.get("conversation_id").is_none() {
        context["conversation_id"] = json!(Uuid::new_v4().to_string());
    }
    let turn = context
        .pointer("/system/dialog_turn_counter")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        + 1;
    context["system"] = json!({ "dialog_turn_counter": turn });

    let mut output = json!({
        "text": [reply],
        "nodes_visited": [node],
        "log_messages": [],
        "generic": [{ "response_type": "text", "text": reply }],
    });
    if flag(&params, "nodes_visited_details") {
        output["nodes_visited_details"] = json!([{ "dialog_node": node, "title": node }]);
    }

    Ok(Json(json!({
        "input": request.get("input").cloned().unwrap_or_else(|| json!({})),
        "intents": [],
        "entities": [],
        "context": context,
        "output": output,
    })))
}

// --- assistant v2 ---

async fn create_session(
    State(state): State<MockState>,
    Path(assistant_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let session_id = Uuid::new_v4().to_string();
    state.inner.write().await.sessions.insert(
        session_id.clone(),
        Session {
            assistant_id,
            turns: 0,
        },
    );
    (StatusCode::CREATED, Json(json!({ "session_id": session_id })))
}

async fn delete_session(
    State(state): State<MockState>,
    Path((assistant_id, session_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let mut inner = state.inner.write().await;
    let owned = inner
        .sessions
        .get(&session_id)
        .is_some_and(|session| session.assistant_id == assistant_id);
    if !owned {
        return Err(ApiError::not_found(format!("session {session_id}")));
    }
    inner.sessions.remove(&session_id);
    Ok(Json(json!({})))
}

async fn message_v2(
    State(state): State<MockState>,
    Path((assistant_id, session_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let request = object_body(&body)?;
    let mut inner = state.inner.write().await;
    let session = inner
        .sessions
        .get_mut(&session_id)
        .filter(|session| session.assistant_id == assistant_id)
        .ok_or_else(|| ApiError::not_found(format!("session {session_id}")))?;
    session.turns += 1;
    Ok(Json(v2_response(&request, session.turns, Some(&session_id))))
}

async fn message_v2_stateless(Path(_assistant_id): Path<String>, body: Bytes) -> ApiResult<Json<Value>> {
    let request = object_body(&body)?;
    let turn = request
        .pointer("/context/global/system/turn_count")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        + 1;
    Ok(Json(v2_response(&request, turn, None)))
}

/// Stateless responses always carry the context; session responses only
/// when `return_context` is set.
fn v2_response(request: &Value, turn: u64, session_id: Option<&str>) -> Value {
    let text = user_text(request);
    let reply = reply_text(text);
    let option = |name: &str| {
        request
            .pointer(&format!("/input/options/{name}"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let mut output = json!({
        "generic": [{ "response_type": "text", "text": reply }],
        "intents": [],
        "entities": [],
    });
    if option("debug") {
        let (node, reason) = visited_node(text);
        output["debug"] = json!({
            "nodes_visited": [{ "dialog_node": node, "title": node }],
            "turn_events": [{
                "event": "node_visited",
                "source": { "type": "dialog_node", "dialog_node": node },
                "reason": reason,
            }],
        });
    }

    let mut response = json!({ "output": output });
    if session_id.is_none() || option("return_context") {
        let mut global = json!({ "system": { "turn_count": turn } });
        if let Some(id) = session_id {
            global["session_id"] = json!(id);
        }
        response["context"] = json!({ "global": global });
    }
    response
}
