//! HTTP client for the document extraction service's REST API.
//!
//! Every operation logs in afresh; tokens are never cached or refreshed.

use std::path::Path;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{ClientConfig, ClientError};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    key: String,
}

/// What the service returned for an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Identifier assigned by the service, if the response carried one.
    pub document_id: Option<String>,
    /// Full response body.
    pub response: Value,
}

impl UploadReceipt {
    pub fn from_response(response: Value) -> Self {
        let document_id = match response.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Self {
            document_id,
            response,
        }
    }
}

/// Caller-owned client for one service queue.
pub struct DocumentClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl DocumentClient {
    /// Create a client. Fails if any setting in `config` is empty.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/v1/auth/login", self.config.base_url)
    }

    /// `{base}/api/v1/uploads/{file_name}?queue={queue_id}`, with the file name
    /// percent-encoded as a single path segment.
    pub fn upload_url(&self, file_name: &str) -> Result<Url, ClientError> {
        let raw = format!("{}/api/v1/uploads", self.config.base_url);
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: raw.clone(),
            reason,
        };
        let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".into()))?
            .push(file_name);
        url.query_pairs_mut()
            .append_pair("queue", &self.config.queue_id);
        Ok(url)
    }

    pub fn export_url(&self) -> String {
        format!(
            "{}/api/v1/queues/{}/export?format=json&status=exported",
            self.config.base_url, self.config.queue_id
        )
    }

    /// Log in and return the API token.
    pub async fn authenticate(&self) -> Result<String, ClientError> {
        let url = self.login_url();
        debug!(url = %url, username = %self.config.username, "authenticating");
        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: &self.config.username,
                password: &self.config.password,
            })
            .send()
            .await?;
        let login: LoginResponse = check_status(resp).await?.json().await?;
        info!("authenticated");
        Ok(login.key)
    }

    /// Upload a document from disk under its own file name.
    pub async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::NoFileName(path.to_path_buf()))?;
        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(file_name, bytes).await
    }

    /// Upload raw document bytes as `file_name`.
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ClientError> {
        let url = self.upload_url(file_name)?;
        let token = self.authenticate().await?;

        info!(url = %url, bytes = bytes.len(), "uploading document");
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Token {token}"))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        let body: Value = check_status(resp).await?.json().await?;
        let receipt = UploadReceipt::from_response(body);
        info!(document_id = ?receipt.document_id, "upload complete");
        Ok(receipt)
    }

    /// Fetch the queue's exported annotations as raw JSON.
    pub async fn export_annotations(&self) -> Result<Value, ClientError> {
        let url = self.export_url();
        let token = self.authenticate().await?;

        info!(url = %url, "exporting annotations");
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Token {token}"))
            .send()
            .await?;
        let text = check_status(resp).await?.text().await?;
        let payload: Value = serde_json::from_str(&text)?;
        let results = payload
            .get("results")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        info!(results, "export complete");
        Ok(payload)
    }
}

async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Server {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> DocumentClient {
        DocumentClient::new(ClientConfig::new(
            "https://example.rossum.app/",
            "user@example.com",
            "secret",
            "1234",
        ))
        .unwrap()
    }

    #[test]
    fn rejects_incomplete_config() {
        let result = DocumentClient::new(ClientConfig::new("https://x", "", "p", "1"));
        assert!(matches!(result, Err(ClientError::MissingConfig(_))));
    }

    #[test]
    fn login_url() {
        assert_eq!(
            client().login_url(),
            "https://example.rossum.app/api/v1/auth/login"
        );
    }

    #[test]
    fn export_url_filters_exported_json() {
        assert_eq!(
            client().export_url(),
            "https://example.rossum.app/api/v1/queues/1234/export?format=json&status=exported"
        );
    }

    #[test]
    fn upload_url_encodes_file_name() {
        let url = client().upload_url("receipt 20240320.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.rossum.app/api/v1/uploads/receipt%2020240320.jpg?queue=1234"
        );
    }

    #[test]
    fn upload_url_rejects_unparseable_base() {
        let client =
            DocumentClient::new(ClientConfig::new("not a url", "u", "p", "1")).unwrap();
        assert!(matches!(
            client.upload_url("a.jpg"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn login_request_shape() {
        let body = serde_json::to_value(LoginRequest {
            username: "u",
            password: "p",
        })
        .unwrap();
        assert_eq!(body, json!({"username": "u", "password": "p"}));
    }

    #[test]
    fn login_response_reads_key() {
        let login: LoginResponse =
            serde_json::from_str(r#"{"key": "abc123", "domain": "x"}"#).unwrap();
        assert_eq!(login.key, "abc123");
    }

    #[test]
    fn upload_receipt_reads_numeric_or_string_id() {
        let numeric = UploadReceipt::from_response(json!({"id": 315777, "url": "x"}));
        assert_eq!(numeric.document_id.as_deref(), Some("315777"));
        let text = UploadReceipt::from_response(json!({"id": "abc"}));
        assert_eq!(text.document_id.as_deref(), Some("abc"));
        let none = UploadReceipt::from_response(json!({"results": []}));
        assert_eq!(none.document_id, None);
    }

    fn response(status: u16, body: &'static str) -> Response {
        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Response::from(resp)
    }

    #[tokio::test]
    async fn error_status_becomes_server_error() {
        let err = check_status(response(500, "queue not found"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Server { status: 500, ref body } if body == "queue not found"
        ));
        assert_eq!(err.to_string(), "server returned 500: queue not found");
    }

    #[tokio::test]
    async fn success_status_passes_response_through() {
        let resp = check_status(response(200, r#"{"key": "abc"}"#))
            .await
            .unwrap();
        let login: LoginResponse = resp.json().await.unwrap();
        assert_eq!(login.key, "abc");
    }

    #[tokio::test]
    async fn upload_without_file_name_fails_before_network() {
        let err = client().upload_document(Path::new("/")).await.unwrap_err();
        assert!(matches!(err, ClientError::NoFileName(_)));
    }

    #[tokio::test]
    async fn upload_of_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = client()
            .upload_document(&dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
