//! REST surface over the laneboard store. JSON in, JSON out; store errors
//! map onto 400/404/500 with an `{"error": message}` body.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use laneboard::model::{Lanes, Project, ProjectWithTasks, Status, Task};
use laneboard::{ops, Error};

/// Shared handler state: one connection guarded by a mutex. SQLite serializes
/// writers anyway, and every store operation is a short synchronous call.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Sqlite(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/with-tasks", get(get_project_with_tasks))
        .route("/tasks", post(create_task))
        .route("/tasks/project/{project_id}", get(list_project_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/move", put(move_task))
        .with_state(state)
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize)]
struct CreateProjectBody {
    name: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct UpdateProjectBody {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody {
    title: String,
    description: Option<String>,
    status: Option<Status>,
    project_id: i64,
}

#[derive(Deserialize)]
struct UpdateTaskBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<Status>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveTaskBody {
    status: Status,
    position: i64,
    project_id: Option<i64>,
}

async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let conn = state.conn();
    let projects = ops::list_projects(&conn, query.search.as_deref())?;
    Ok(Json(projects))
}

async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let conn = state.conn();
    let project = ops::create_project(&conn, &body.name, body.description.as_deref().unwrap_or(""))?;
    log::info!("created project {} '{}'", project.id, project.name);
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    let conn = state.conn();
    Ok(Json(ops::get_project(&conn, id)?))
}

async fn get_project_with_tasks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectWithTasks>, ApiError> {
    let conn = state.conn();
    Ok(Json(ops::get_project_with_tasks(&conn, id)?))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProjectBody>,
) -> Result<Json<Project>, ApiError> {
    let conn = state.conn();
    let project = ops::update_project(&conn, id, body.name.as_deref(), body.description.as_deref())?;
    log::info!("updated project {id}");
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn();
    ops::delete_project(&conn, id)?;
    log::info!("deleted project {id} and its tasks");
    Ok(Json(
        json!({ "message": "Project and all related tasks deleted successfully" }),
    ))
}

async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Lanes>, ApiError> {
    let conn = state.conn();
    Ok(Json(ops::list_by_project(&conn, project_id)?))
}

async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let conn = state.conn();
    let task = ops::create_task(
        &conn,
        body.project_id,
        &body.title,
        body.description.as_deref().unwrap_or(""),
        body.status.unwrap_or(Status::Todo),
    )?;
    log::info!(
        "created task {} in project {} lane {}",
        task.id,
        task.project_id,
        task.status
    );
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let conn = state.conn();
    Ok(Json(ops::get_task(&conn, id)?))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Task>, ApiError> {
    let conn = state.conn();
    let task = ops::update_task(
        &conn,
        id,
        body.title.as_deref(),
        body.description.as_deref(),
        body.status,
    )?;
    log::info!("updated task {id}");
    Ok(Json(task))
}

async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<MoveTaskBody>,
) -> Result<Json<Task>, ApiError> {
    let conn = state.conn();
    let task = ops::move_task(&conn, id, body.status, body.position, body.project_id)?;
    log::info!(
        "moved task {id} to ({}, {}, {})",
        task.project_id,
        task.status,
        task.position
    );
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn();
    ops::delete_task(&conn, id)?;
    log::info!("deleted task {id}");
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}
