//! The list/delete/create logic shared by every route.
//!
//! Routes only turn a request into a [`Command`]; everything else happens in
//! [`execute`], so `/api/claude` answers exactly like the dedicated routes.

use crate::github::{GitHubError, Repository};
use crate::types::{
    ApiError, ApiResponse, BatchResponse, ContentEntry, ContentListing, OperationResult,
    RequestPayload,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use rocket::{http::Status, serde::json::Json};
use serde_json::Value;
use thiserror::Error;

pub const INVALID_ACTION: &str = "Invalid action. Use 'list', 'delete', or 'create'";
pub const UNAUTHORIZED: &str = "Unauthorized - Invalid API key";

#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("{}", UNAUTHORIZED)]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Remote(String),
}

impl ApiFailure {
    pub fn status(&self) -> Status {
        match self {
            ApiFailure::Unauthorized => Status::Unauthorized,
            ApiFailure::Validation(_) => Status::BadRequest,
            ApiFailure::NotFound(_) => Status::NotFound,
            ApiFailure::Remote(_) => Status::InternalServerError,
        }
    }
}

impl From<GitHubError> for ApiFailure {
    fn from(err: GitHubError) -> Self {
        ApiFailure::Remote(err.to_string())
    }
}

impl From<ApiFailure> for (Status, Json<ApiError>) {
    fn from(failure: ApiFailure) -> Self {
        (
            failure.status(),
            Json(ApiError {
                error: failure.to_string(),
            }),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        path: String,
    },
    Delete {
        path: String,
        message: Option<String>,
    },
    Create {
        path: String,
        content: String,
        message: Option<String>,
    },
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Command {
    pub fn list(path: Option<String>) -> Self {
        Command::List {
            path: path.unwrap_or_default(),
        }
    }

    pub fn delete(payload: RequestPayload) -> Result<Self, ApiFailure> {
        let path = present(payload.path)
            .ok_or_else(|| ApiFailure::Validation("Path is required".to_string()))?;
        Ok(Command::Delete {
            path,
            message: present(payload.message),
        })
    }

    pub fn create(payload: RequestPayload) -> Result<Self, ApiFailure> {
        match (present(payload.path), present(payload.content)) {
            (Some(path), Some(content)) => Ok(Command::Create {
                path,
                content,
                message: present(payload.message),
            }),
            _ => Err(ApiFailure::Validation(
                "Path and content are required".to_string(),
            )),
        }
    }

    /// Picks the command named by `payload.action`.
    pub fn from_action(payload: RequestPayload) -> Result<Self, ApiFailure> {
        let action = payload.action.clone();
        match action.as_deref() {
            Some("list") => Ok(Command::list(payload.path)),
            Some("delete") => Command::delete(payload),
            Some("create") => Command::create(payload),
            _ => Err(ApiFailure::Validation(INVALID_ACTION.to_string())),
        }
    }
}

pub async fn execute(repo: &dyn Repository, command: Command) -> Result<Value, ApiFailure> {
    match command {
        Command::List { path } => list(repo, &path).await,
        Command::Delete { path, message } => delete(repo, &path, message).await,
        Command::Create {
            path,
            content,
            message,
        } => create(repo, &path, &content, message).await,
    }
}

async fn list(repo: &dyn Repository, path: &str) -> Result<Value, ApiFailure> {
    let listing = repo.get_content(path).await?;
    to_json(&listing)
}

async fn delete(
    repo: &dyn Repository,
    path: &str,
    message: Option<String>,
) -> Result<Value, ApiFailure> {
    let listing = repo
        .get_content(path)
        .await
        .map_err(|e| ApiFailure::NotFound(e.to_string()))?;

    match listing {
        ContentListing::Directory(entries) => {
            let results = delete_files(repo, &entries).await;
            info!("Processed {} files in directory {}", results.len(), path);
            to_json(&BatchResponse {
                success: true,
                message: format!("Processed {} files in {}", results.len(), path),
                results,
            })
        }
        ContentListing::Entry(entry) => {
            let message = message.unwrap_or_else(|| format!("Delete {}", path));
            repo.delete_file(path, &entry.sha, &message).await?;
            info!("Deleted file {}", path);
            to_json(&ApiResponse {
                success: true,
                message: format!("Deleted file {}", path),
            })
        }
    }
}

/// Deletes the files of one directory level in order. A failed file is
/// recorded and the rest still run.
async fn delete_files(repo: &dyn Repository, entries: &[ContentEntry]) -> Vec<OperationResult> {
    let mut results = Vec::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        let commit = format!("Delete {}", entry.path);
        let result = match repo.delete_file(&entry.path, &entry.sha, &commit).await {
            Ok(()) => OperationResult {
                success: true,
                path: entry.path.clone(),
                message: format!("Deleted {}", entry.path),
                error: None,
            },
            Err(err) => {
                warn!("Failed to delete {}: {}", entry.path, err);
                OperationResult {
                    success: false,
                    path: entry.path.clone(),
                    message: format!("Failed to delete {}", entry.path),
                    error: Some(err.to_string()),
                }
            }
        };
        results.push(result);
    }
    results
}

async fn create(
    repo: &dyn Repository,
    path: &str,
    content: &str,
    message: Option<String>,
) -> Result<Value, ApiFailure> {
    let sha = current_sha(repo, path).await?;
    let encoded = STANDARD.encode(content.as_bytes());
    let message = message.unwrap_or_else(|| format!("Update {}", path));

    repo.create_or_update_file(path, &encoded, &message, sha.as_deref())
        .await?;
    info!(
        "{} {}",
        if sha.is_some() { "Updated" } else { "Created" },
        path
    );

    to_json(&ApiResponse {
        success: true,
        message: format!("Updated {}", path),
    })
}

/// Sha of the file currently at `path`. A lookup miss means the file is new.
async fn current_sha(repo: &dyn Repository, path: &str) -> Result<Option<String>, ApiFailure> {
    match repo.get_content(path).await {
        Ok(ContentListing::Entry(entry)) => Ok(Some(entry.sha)),
        Ok(ContentListing::Directory(_)) => Ok(None),
        Err(GitHubError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiFailure> {
    serde_json::to_value(value).map_err(|e| ApiFailure::Remote(e.to_string()))
}
