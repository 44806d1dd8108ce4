use crate::config::AppConfig;
use crate::types::ContentListing;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USER_AGENT: &str = concat!("repo-content-proxy/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Failure reported by the hosting API or the transport. `Display` is the
/// remote message as-is.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Remote { status: StatusCode, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API base URL: {0}")]
    InvalidPath(String),
}

/// Content operations against the configured repository.
#[rocket::async_trait]
pub trait Repository: Send + Sync {
    /// Fetches the entry at `path`, or the listing when `path` is a directory.
    async fn get_content(&self, path: &str) -> Result<ContentListing, GitHubError>;

    async fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<(), GitHubError>;

    /// Writes base64 `content` to `path`. Without `sha` the file is created;
    /// with the current sha it is replaced.
    async fn create_or_update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), GitHubError>;
}

#[derive(Serialize)]
struct WriteFileBody<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteFileBody<'a> {
    message: &'a str,
    sha: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Contents API client bound to one owner/repo.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base: Url,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(config: &AppConfig) -> Result<Self, GitHubError> {
        Self::with_http(config, Client::new())
    }

    pub fn with_http(config: &AppConfig, http: Client) -> Result<Self, GitHubError> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| GitHubError::InvalidPath(format!("{}: {}", config.api_base, e)))?;
        if base.cannot_be_a_base() {
            return Err(GitHubError::InvalidPath(config.api_base.clone()));
        }

        Ok(Self {
            http,
            base,
            token: config.token.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> Result<Url, GitHubError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidPath(self.base.to_string()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);

        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, GitHubError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = remote_message(status, &body);
        debug!("GitHub returned {}: {}", status, message);

        if status == StatusCode::NOT_FOUND {
            Err(GitHubError::NotFound(message))
        } else {
            Err(GitHubError::Remote { status, message })
        }
    }
}

fn remote_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

#[rocket::async_trait]
impl Repository for GitHubClient {
    async fn get_content(&self, path: &str) -> Result<ContentListing, GitHubError> {
        let url = self.contents_url(path)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<(), GitHubError> {
        let url = self.contents_url(path)?;
        let body = DeleteFileBody { message, sha };
        self.send(self.request(Method::DELETE, url).json(&body))
            .await?;
        Ok(())
    }

    async fn create_or_update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), GitHubError> {
        let url = self.contents_url(path)?;
        let body = WriteFileBody {
            message,
            content,
            sha,
        };
        self.send(self.request(Method::PUT, url).json(&body)).await?;
        Ok(())
    }
}
