//! reqwest client for the backend draft endpoints.

use super::types::{LoadResponse, SaveResponse};
use super::DraftBackend;
use async_trait::async_trait;
use invitra_core::{
    ConfigError, Draft, DraftContent, DraftKey, SaveDraftRequest, SaveError, SaveResult,
    SAVE_TIMEOUT,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;

/// Connection settings for [`HttpDraftBackend`].
#[derive(Clone)]
pub struct BackendSettings {
    /// Backend root, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Path of the save endpoint, relative to `base_url`.
    pub save_path: String,
    /// Path of the load endpoint, relative to `base_url`.
    pub load_path: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
    /// Transport-level timeout for each request.
    pub timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            save_path: "save_bulk_draft.php".to_string(),
            load_path: "get_bulk_draft.php".to_string(),
            api_key: None,
            timeout: SAVE_TIMEOUT,
        }
    }

    pub fn with_paths(mut self, save_path: impl Into<String>, load_path: impl Into<String>) -> Self {
        self.save_path = save_path.into();
        self.load_path = load_path.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("save_path", &self.save_path)
            .field("load_path", &self.load_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Draft backend reached over HTTP.
pub struct HttpDraftBackend {
    client: Client,
    save_url: String,
    load_url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpDraftBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "backend",
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            save_url: join_url(&settings.base_url, &settings.save_path),
            load_url: join_url(&settings.base_url, &settings.load_path),
            headers: build_headers(settings.api_key.as_deref())?,
            timeout: settings.timeout,
        })
    }

    pub fn save_url(&self) -> &str {
        &self.save_url
    }

    pub fn load_url(&self) -> &str {
        &self.load_url
    }

    fn transport_error(&self, err: reqwest::Error) -> SaveError {
        if err.is_timeout() {
            SaveError::Timeout {
                after: self.timeout,
            }
        } else if err.is_decode() {
            SaveError::network(format!("Malformed backend response: {}", err))
        } else {
            SaveError::network(format!("HTTP request failed: {}", err))
        }
    }

    async fn read_body(&self, response: Response) -> SaveResult<String> {
        response.text().await.map_err(|e| self.transport_error(e))
    }
}

#[async_trait]
impl DraftBackend for HttpDraftBackend {
    async fn save(&self, key: &DraftKey, content: &DraftContent) -> SaveResult<()> {
        let body = SaveDraftRequest::new(key, content);
        let response = self
            .client
            .post(&self.save_url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            // The body is best effort here; the status alone decides the outcome.
            let message = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<SaveResponse>(&text).ok())
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(SaveError::rejected(Some(message)));
        }

        let text = self.read_body(response).await?;
        let parsed = serde_json::from_str::<SaveResponse>(&text)
            .map_err(|e| SaveError::network(format!("Malformed backend response: {}", e)))?;
        if parsed.is_success() {
            Ok(())
        } else {
            Err(SaveError::rejected(parsed.message))
        }
    }

    async fn load(&self, key: &DraftKey) -> SaveResult<Option<Draft>> {
        let response = self
            .client
            .get(&self.load_url)
            .headers(self.headers.clone())
            .query(&[
                ("user_id", key.user_id()),
                ("invitation_title", key.invitation_title()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SaveError::rejected(Some(format!("HTTP {}", status.as_u16()))));
        }

        let text = self.read_body(response).await?;
        let parsed = serde_json::from_str::<LoadResponse>(&text)
            .map_err(|e| SaveError::network(format!("Malformed backend response: {}", e)))?;
        if parsed.is_success() {
            Ok(parsed.data)
        } else {
            Err(SaveError::rejected(parsed.message))
        }
    }
}

impl std::fmt::Debug for HttpDraftBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDraftBackend")
            .field("save_url", &self.save_url)
            .field("load_url", &self.load_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn build_headers(api_key: Option<&str>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ConfigError::InvalidValue {
                field: "backend.api_key",
                reason: e.to_string(),
            })?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        serve_raw_once(format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        ))
        .await
    }

    /// Write `response` verbatim to the first connection.
    async fn serve_raw_once(response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    fn key() -> DraftKey {
        DraftKey::new("1", "wedding-a").unwrap()
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://api/", "/save.php"), "http://api/save.php");
        assert_eq!(join_url("http://api", "save.php"), "http://api/save.php");
    }

    #[test]
    fn test_new_builds_endpoint_urls() {
        let settings = BackendSettings::new("https://api.example.com/v1/")
            .with_paths("/drafts/save", "drafts/load");
        let backend = HttpDraftBackend::new(&settings).unwrap();
        assert_eq!(backend.save_url(), "https://api.example.com/v1/drafts/save");
        assert_eq!(backend.load_url(), "https://api.example.com/v1/drafts/load");
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let settings = BackendSettings::new("https://api.example.com").with_api_key("bad\nkey");
        let err = HttpDraftBackend::new(&settings).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "backend.api_key",
                ..
            }
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = BackendSettings::new("https://api.example.com").with_api_key("secret-123");
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("secret-123"));
        assert!(printed.contains("REDACTED"));
    }

    #[tokio::test]
    async fn test_save_success_sends_json_body() {
        let (base_url, request_rx) = serve_once("HTTP/1.1 200 OK", r#"{"status":"success"}"#).await;
        let settings = BackendSettings::new(base_url).with_api_key("k-1");
        let backend = HttpDraftBackend::new(&settings).unwrap();

        let content = DraftContent::new("Alice,Bob", "T1");
        backend.save(&key(), &content).await.unwrap();

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /save_bulk_draft.php"));
        assert!(request.to_ascii_lowercase().contains("x-api-key: k-1"));
        assert!(request.contains(r#""invitation_title":"wedding-a""#));
        assert!(request.contains(r#""names_list":"Alice,Bob""#));
    }

    #[tokio::test]
    async fn test_save_status_error_is_rejected() {
        let (base_url, _rx) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status":"error","message":"Invitation not found"}"#,
        )
        .await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let err = backend
            .save(&key(), &DraftContent::new("Alice", "T1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SaveError::Rejected {
                message: "Invitation not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_save_http_error_is_rejected() {
        let (base_url, _rx) = serve_once("HTTP/1.1 500 Internal Server Error", "oops").await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let err = backend
            .save(&key(), &DraftContent::new("Alice", "T1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SaveError::Rejected {
                message: "HTTP 500".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_save_http_error_with_truncated_body_is_rejected() {
        // Announces more body than it sends, so reading the body fails.
        let (base_url, _rx) = serve_raw_once(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Type: application/json\r\nContent-Length: 64\r\nConnection: close\r\n\r\n{\"status\":"
                .to_string(),
        )
        .await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let err = backend
            .save(&key(), &DraftContent::new("Alice", "T1"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SaveError::Rejected {
                message: "HTTP 502".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_save_malformed_body_is_network_error() {
        let (base_url, _rx) = serve_once("HTTP/1.1 200 OK", "<html>maintenance</html>").await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let err = backend
            .save(&key(), &DraftContent::new("Alice", "T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Network { .. }));
    }

    #[tokio::test]
    async fn test_load_sends_key_as_query() {
        let (base_url, request_rx) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"status":"success","data":{"names_list":"Alice","template_text":"T1"}}"#,
        )
        .await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let draft = backend.load(&key()).await.unwrap().unwrap();
        assert_eq!(draft.names_list, "Alice");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("GET /get_bulk_draft.php?user_id=1&invitation_title=wedding-a"));
    }

    #[tokio::test]
    async fn test_load_status_error_is_rejected() {
        let (base_url, _rx) = serve_once("HTTP/1.1 200 OK", r#"{"status":"error"}"#).await;
        let backend = HttpDraftBackend::new(&BackendSettings::new(base_url)).unwrap();

        let err = backend.load(&key()).await.unwrap_err();
        assert!(matches!(err, SaveError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend =
            HttpDraftBackend::new(&BackendSettings::new(format!("http://{}", addr))).unwrap();
        let err = backend
            .save(&key(), &DraftContent::new("Alice", "T1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Network { .. }));
    }
}
