use crate::SharedRepository;
use crate::auth::ApiKey;
use crate::command::{self, ApiFailure, Command};
use crate::types::{ApiError, RequestPayload, StatusMessage};
use rocket::{
    Request, State, catch, get,
    http::Status,
    post,
    serde::json::{self, Json},
};
use serde_json::Value;

type ApiResult = Result<Json<Value>, (Status, Json<ApiError>)>;
type JsonBody<'r> = Result<Json<RequestPayload>, json::Error<'r>>;

pub const HEALTH_MESSAGE: &str = "Repository content proxy is running";

async fn run(repo: &State<SharedRepository>, command: Result<Command, ApiFailure>) -> ApiResult {
    let command = command?;
    Ok(Json(command::execute(repo.inner().as_ref(), command).await?))
}

/// Unpacks a POST body. An empty body reads as an empty payload; anything
/// that is not a payload object is a validation error.
fn payload(body: JsonBody<'_>) -> Result<RequestPayload, ApiFailure> {
    match body {
        Ok(json) => Ok(json.into_inner()),
        Err(json::Error::Parse(raw, _)) if raw.trim().is_empty() => Ok(RequestPayload::default()),
        Err(e) => Err(ApiFailure::Validation(format!("Invalid JSON body: {}", e))),
    }
}

/// Health check, no key required
#[get("/")]
pub fn health() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// List the contents at `path` (repository root when omitted)
#[get("/list?<path>")]
pub async fn list(
    _key: ApiKey,
    repo: &State<SharedRepository>,
    path: Option<String>,
) -> ApiResult {
    run(repo, Ok(Command::list(path))).await
}

/// Delete a file, or every file directly inside a directory
#[post("/delete", data = "<body>")]
pub async fn delete(
    _key: ApiKey,
    repo: &State<SharedRepository>,
    body: JsonBody<'_>,
) -> ApiResult {
    run(repo, payload(body).and_then(Command::delete)).await
}

/// Create a file or replace its contents
#[post("/create", data = "<body>")]
pub async fn create(
    _key: ApiKey,
    repo: &State<SharedRepository>,
    body: JsonBody<'_>,
) -> ApiResult {
    run(repo, payload(body).and_then(Command::create)).await
}

/// Combined endpoint selecting list, delete or create by `action`
#[post("/claude", data = "<body>")]
pub async fn dispatch(
    _key: ApiKey,
    repo: &State<SharedRepository>,
    body: JsonBody<'_>,
) -> ApiResult {
    run(repo, payload(body).and_then(Command::from_action)).await
}

fn error_body(message: impl Into<String>) -> Json<ApiError> {
    Json(ApiError {
        error: message.into(),
    })
}

#[catch(401)]
pub fn unauthorized() -> Json<ApiError> {
    error_body(ApiFailure::Unauthorized.to_string())
}

#[catch(400)]
pub fn bad_request() -> Json<ApiError> {
    error_body("Invalid request body")
}

#[catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<ApiError> {
    error_body(format!("No route for {} {}", request.method(), request.uri()))
}

#[catch(default)]
pub fn internal(status: Status, _request: &Request<'_>) -> Json<ApiError> {
    error_body(status.reason_lossy())
}
