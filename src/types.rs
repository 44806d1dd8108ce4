use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a contents API entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One record returned by the contents API.
///
/// Fields the proxy does not act on are kept in `rest` so a listing is
/// returned to the caller exactly as GitHub sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Contents of a path: a directory listing or a single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentListing {
    Directory(Vec<ContentEntry>),
    Entry(ContentEntry),
}

/// JSON body accepted by the POST routes.
#[derive(Debug, Default, Deserialize)]
pub struct RequestPayload {
    pub action: Option<String>,
    pub path: Option<String>,
    pub content: Option<String>,
    pub message: Option<String>,
}

/// Outcome of one file inside a directory delete.
#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<OperationResult>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}
