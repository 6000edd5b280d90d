//! Anthropic API client: Messages, Files and Skills endpoints over `reqwest`

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::ModelProvider;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use skillgate_types::{FileMetadata, MessagesRequest, ProviderSkill, UploadFile};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest provider error body echoed into logs
const MAX_ERROR_BODY: usize = 512;

/// Paged list envelope used by the files and skills endpoints
#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
}

/// HTTP client for the Anthropic API
pub struct AnthropicClient {
    http: Client,
    base_url: String,
}

impl AnthropicClient {
    /// Create a client from config. A missing API key is allowed; calls will
    /// then fail upstream with 401.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("No provider API key configured, upstream calls will be rejected");
        }

        let http = Client::builder()
            .default_headers(default_headers(config)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Provider client initialized for {} (model {})",
            config.base_url, config.model
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        debug!(
            status = status.as_u16(),
            body = %truncate(&body, MAX_ERROR_BODY),
            "Provider call failed"
        );
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.http.get(self.url(path))).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<Value> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending Messages request"
        );
        let response = self
            .send(self.http.post(self.url("messages")).json(request))
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn list_files(&self) -> Result<Vec<Value>> {
        let page: ListPage<Value> = self.get_json("files").await?;
        Ok(page.data)
    }

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        self.get_json(&format!("files/{}", path_segment(file_id)?))
            .await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.delete(&format!("files/{}", path_segment(file_id)?))
            .await
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let url = self.url(&format!("files/{}/content", path_segment(file_id)?));
        let response = self.send(self.http.get(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn list_skills(&self) -> Result<Vec<ProviderSkill>> {
        let page: ListPage<ProviderSkill> = self.get_json("skills").await?;
        Ok(page.data)
    }

    async fn get_skill(&self, skill_id: &str) -> Result<Value> {
        self.get_json(&format!("skills/{}", path_segment(skill_id)?))
            .await
    }

    async fn create_skill(
        &self,
        display_title: Option<&str>,
        files: &[UploadFile],
    ) -> Result<ProviderSkill> {
        let form = skill_form(display_title, files)?;
        let response = self
            .send(self.http.post(self.url("skills")).multipart(form))
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn create_skill_version(&self, skill_id: &str, files: &[UploadFile]) -> Result<Value> {
        let url = self.url(&format!("skills/{}/versions", path_segment(skill_id)?));
        let form = skill_form(None, files)?;
        let response = self.send(self.http.post(url).multipart(form)).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete_skill(&self, skill_id: &str) -> Result<()> {
        self.delete(&format!("skills/{}", path_segment(skill_id)?))
            .await
    }

    async fn list_skill_versions(&self, skill_id: &str) -> Result<Vec<Value>> {
        let page: ListPage<Value> = self
            .get_json(&format!("skills/{}/versions", path_segment(skill_id)?))
            .await?;
        Ok(page.data)
    }

    async fn delete_skill_version(&self, skill_id: &str, version: &str) -> Result<()> {
        self.delete(&format!(
            "skills/{}/versions/{}",
            path_segment(skill_id)?,
            path_segment(version)?
        ))
        .await
    }
}

fn default_headers(config: &ProviderConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", header_value("api_key", &config.api_key)?);
    headers.insert(
        "anthropic-version",
        header_value("api_version", &config.api_version)?,
    );
    if !config.beta.trim().is_empty() {
        headers.insert("anthropic-beta", header_value("beta", config.beta.trim())?);
    }
    Ok(headers)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| ProviderError::Config(format!("{} is not a valid header value", field)))?;
    header.set_sensitive(field == "api_key");
    Ok(header)
}

fn skill_form(display_title: Option<&str>, files: &[UploadFile]) -> Result<Form> {
    let mut form = Form::new();
    if let Some(title) = display_title {
        form = form.text("display_title", title.to_string());
    }
    for file in files {
        let part = Part::bytes(file.content.clone())
            .file_name(file.path.clone())
            .mime_str(&file.mime_type)?;
        form = form.part("files[]", part);
    }
    Ok(form)
}

/// Accept ids made of ASCII letters, digits, `-`, `_` and `.` (but not `.`/`..`)
fn path_segment(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(id)
    } else {
        Err(ProviderError::InvalidId(id.to_string()))
    }
}

/// Pull `error.message` out of a provider error body
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use skillgate_types::Tool;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> AnthropicClient {
        AnthropicClient::new(&ProviderConfig {
            api_key: "sk-test".to_string(),
            base_url,
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_path_segment() {
        assert_eq!(
            path_segment("file_011CNha8iCJcU1wXNR6q4V8w").unwrap(),
            "file_011CNha8iCJcU1wXNR6q4V8w"
        );
        assert_eq!(path_segment("1759178010641129").unwrap(), "1759178010641129");
        assert!(path_segment("").is_err());
        assert!(path_segment("..").is_err());
        assert!(path_segment("a/b").is_err());
        assert!(path_segment("a?b=c").is_err());
    }

    #[test]
    fn test_api_error_message() {
        let body =
            r#"{"type":"error","error":{"type":"not_found_error","message":"File not found"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("File not found"));
        assert_eq!(api_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("日本語です", 2), "日本");
    }

    #[test]
    fn test_invalid_header_value_is_config_error() {
        let config = ProviderConfig {
            api_key: "bad\nkey".to_string(),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            AnthropicClient::new(&config),
            Err(ProviderError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_create_message_sends_headers_and_body() {
        let router = Router::new().route(
            "/v1/messages",
            axum::routing::post(|headers: AxumHeaders, Json(body): Json<Value>| async move {
                let echo = json!({
                    "api_key": headers.get("x-api-key").and_then(|v| v.to_str().ok()),
                    "version": headers.get("anthropic-version").and_then(|v| v.to_str().ok()),
                    "beta": headers.get("anthropic-beta").and_then(|v| v.to_str().ok()),
                    "body": body,
                });
                Json(json!({"id": "msg_1", "type": "message", "echo": echo}))
            }),
        );
        let provider = client(serve(router).await);

        let request = MessagesRequest::new(
            "claude-haiku-4-5-20251001",
            1000,
            vec![json!({"role": "user", "content": "hello"})],
        )
        .with_system("be brief")
        .with_tools(vec![Tool::code_execution()]);

        let message = provider.create_message(&request).await.unwrap();
        let echo = &message["echo"];
        assert_eq!(echo["api_key"], "sk-test");
        assert_eq!(echo["version"], "2023-06-01");
        assert!(echo["beta"].as_str().unwrap().contains("files-api-2025-04-14"));
        assert_eq!(echo["body"]["system"], "be brief");
        assert_eq!(echo["body"]["max_tokens"], 1000);
        assert_eq!(echo["body"]["tools"][0]["type"], "code_execution_20250825");
    }

    #[tokio::test]
    async fn test_list_and_error_mapping() {
        let router = Router::new()
            .route(
                "/v1/files",
                get(|| async {
                    Json(json!({"data": [{"id": "f1"}, {"id": "f2"}], "has_more": false}))
                }),
            )
            .route(
                "/v1/files/{id}",
                get(|Path(id): Path<String>| async move {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({
                            "type": "error",
                            "error": {"message": format!("{} not found", id)}
                        })),
                    )
                }),
            );
        let provider = client(serve(router).await);

        let files = provider.list_files().await.unwrap();
        assert_eq!(files.len(), 2);

        match provider.get_file("f9").await {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "f9 not found");
            }
            other => panic!("expected API error, got {:?}", other.map(|m| m.id)),
        }
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_the_network() {
        let provider = client("http://127.0.0.1:9".to_string());
        assert!(matches!(
            provider.delete_file("../skills").await,
            Err(ProviderError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_create_skill_version_posts_multipart() {
        let router = Router::new().route(
            "/v1/skills/{id}/versions",
            axum::routing::post(|Path(id): Path<String>, headers: AxumHeaders| async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "id": "skillver_1",
                    "skill_id": id,
                    "version": "1759178010641129",
                    "created_at": "2025-10-02T00:00:00Z",
                    "content_type": content_type,
                }))
            }),
        );
        let provider = client(serve(router).await);

        let files = vec![UploadFile::new(
            "pdf-tools/SKILL.md",
            "text/markdown",
            b"---\nname: pdf-tools\n---\n".to_vec(),
        )];
        let version = provider
            .create_skill_version("skill_01", &files)
            .await
            .unwrap();
        assert_eq!(version["skill_id"], "skill_01");
        assert!(version["content_type"]
            .as_str()
            .unwrap()
            .starts_with("multipart/form-data"));

        assert!(matches!(
            provider.create_skill_version("a/b", &files).await,
            Err(ProviderError::InvalidId(_))
        ));
    }
}
