//! # REST Module
//!
//! Axum handlers for the administration API.
//!
//! Endpoints answer in two envelope shapes, `{data: {field}}` and
//! `{field}`, matching the production backend route for route.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::envelope::wrap;
use shared::envelope::EnvelopeShape::{self, Flat, Nested};
use shared::{
    AssignStudentRequest, BusInput, CheckpointInput, ErrorBody, ProcessChangeCheckpointRequest,
    ReplyRequest, RouteInput, StudentInput, UserInput, UserRole,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::store::{MockStore, StoreError, StoreResult};

/// Shared handle on the in-memory store
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<RwLock<MockStore>>,
}

impl AppState {
    pub fn new(store: MockStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!("❌ {}", self);
        } else {
            warn!("⚠️ {}", self);
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn respond<T: Serialize>(shape: EnvelopeShape, field: &str, result: StoreResult<T>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json::<Value>(wrap(shape, field, &payload))).into_response(),
        Err(e) => e.into_response(),
    }
}

fn created<T: Serialize>(shape: EnvelopeShape, field: &str, result: StoreResult<T>) -> Response {
    match result {
        Ok(payload) => (StatusCode::CREATED, Json::<Value>(wrap(shape, field, &payload))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/request-types", get(list_request_types))
        .route("/requests", get(list_requests))
        .route("/requests/reply", post(reply_request))
        .route("/requests/process-change-checkpoint", post(process_change_checkpoint))
        .route("/requests/:id", get(get_request))
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", get(get_student).put(update_student))
        .route("/students/:id/assignment", put(assign_student))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/buses", get(list_buses).post(create_bus))
        .route("/buses/:id", get(get_bus).put(update_bus))
        .route("/checkpoints", get(list_checkpoints).post(create_checkpoint))
        .route("/checkpoints/:id", get(get_checkpoint).put(update_checkpoint))
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/:id", get(get_route).put(update_route));

    Router::new().nest("/api", api).with_state(state)
}

// ---- requests ----

async fn list_request_types(State(state): State<AppState>) -> Response {
    info!("GET /api/request-types");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.request_types.clone());
    respond(Nested, "requestTypes", result)
}

async fn list_requests(State(state): State<AppState>) -> Response {
    info!("GET /api/requests");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.requests.clone());
    respond(Flat, "requests", result)
}

async fn get_request(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/requests/{}", id);
    respond(Nested, "request", state.store.read().await.request(&id))
}

async fn reply_request(State(state): State<AppState>, Json(body): Json<ReplyRequest>) -> Response {
    info!("POST /api/requests/reply - {} -> {}", body.request_id, body.status);
    respond(Nested, "request", state.store.write().await.reply(&body))
}

async fn process_change_checkpoint(
    State(state): State<AppState>,
    Json(body): Json<ProcessChangeCheckpointRequest>,
) -> Response {
    info!("POST /api/requests/process-change-checkpoint - {}", body.request_id);
    let result = state
        .store
        .write()
        .await
        .process_change_checkpoint(&body.request_id);
    respond(Flat, "request", result)
}

// ---- students ----

async fn list_students(State(state): State<AppState>) -> Response {
    info!("GET /api/students");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.students.clone());
    respond(Nested, "students", result)
}

async fn get_student(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/students/{}", id);
    respond(Flat, "student", state.store.read().await.student(&id))
}

async fn create_student(State(state): State<AppState>, Json(input): Json<StudentInput>) -> Response {
    info!("POST /api/students - {}", input.roll_number);
    created(Nested, "student", state.store.write().await.create_student(&input))
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StudentInput>,
) -> Response {
    info!("PUT /api/students/{}", id);
    respond(Flat, "student", state.store.write().await.update_student(&id, &input))
}

async fn assign_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignStudentRequest>,
) -> Response {
    info!("PUT /api/students/{}/assignment - bus {:?}, checkpoint {:?}", id, body.bus_id, body.checkpoint_id);
    respond(Nested, "student", state.store.write().await.assign_student(&id, &body))
}

// ---- users ----

#[derive(Debug, Deserialize)]
struct UserQuery {
    role: Option<UserRole>,
}

async fn list_users(State(state): State<AppState>, Query(query): Query<UserQuery>) -> Response {
    info!("GET /api/users - {:?}", query);
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.users(query.role));
    respond(Flat, "users", result)
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/users/{}", id);
    respond(Nested, "user", state.store.read().await.user(&id))
}

async fn create_user(State(state): State<AppState>, Json(input): Json<UserInput>) -> Response {
    info!("POST /api/users - {} ({})", input.username, input.role);
    created(Nested, "user", state.store.write().await.create_user(&input))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UserInput>,
) -> Response {
    info!("PUT /api/users/{}", id);
    respond(Flat, "user", state.store.write().await.update_user(&id, &input))
}

// ---- buses ----

async fn list_buses(State(state): State<AppState>) -> Response {
    info!("GET /api/buses");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.buses.clone());
    respond(Flat, "buses", result)
}

async fn get_bus(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/buses/{}", id);
    respond(Nested, "bus", state.store.read().await.bus(&id))
}

async fn create_bus(State(state): State<AppState>, Json(input): Json<BusInput>) -> Response {
    info!("POST /api/buses - {}", input.license_plate);
    created(Nested, "bus", state.store.write().await.create_bus(&input))
}

async fn update_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<BusInput>,
) -> Response {
    info!("PUT /api/buses/{}", id);
    respond(Nested, "bus", state.store.write().await.update_bus(&id, &input))
}

// ---- checkpoints ----

async fn list_checkpoints(State(state): State<AppState>) -> Response {
    info!("GET /api/checkpoints");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.checkpoints.clone());
    respond(Nested, "checkpoints", result)
}

async fn get_checkpoint(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/checkpoints/{}", id);
    respond(Flat, "checkpoint", state.store.read().await.checkpoint(&id))
}

async fn create_checkpoint(
    State(state): State<AppState>,
    Json(input): Json<CheckpointInput>,
) -> Response {
    info!("POST /api/checkpoints - {} at {}, {}", input.name, input.latitude, input.longitude);
    created(Flat, "checkpoint", state.store.write().await.create_checkpoint(&input))
}

async fn update_checkpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CheckpointInput>,
) -> Response {
    info!("PUT /api/checkpoints/{}", id);
    respond(Flat, "checkpoint", state.store.write().await.update_checkpoint(&id, &input))
}

// ---- routes ----

async fn list_routes(State(state): State<AppState>) -> Response {
    info!("GET /api/routes");
    let store = state.store.read().await;
    let result = store.ensure_lists_available().map(|_| store.routes.clone());
    respond(Flat, "routes", result)
}

async fn get_route(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("GET /api/routes/{}", id);
    respond(Nested, "route", state.store.read().await.route(&id))
}

async fn create_route(State(state): State<AppState>, Json(input): Json<RouteInput>) -> Response {
    info!("POST /api/routes - {}", input.code);
    created(Nested, "route", state.store.write().await.create_route(&input))
}

async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RouteInput>,
) -> Response {
    info!("PUT /api/routes/{}", id);
    respond(Nested, "route", state.store.write().await.update_route(&id, &input))
}
