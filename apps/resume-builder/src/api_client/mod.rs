//! REST backend client. Every backend call goes through here.
//!
//! Every request carries the static `x-api-key` header; authenticated calls add
//! `Authorization: Bearer <token>`. Responses use the JSON envelope
//! `{success, data, error?, message?, pagination?}`.
//!
//! No retries: a failed call is surfaced to the caller as-is.
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod alerts;
pub mod auth;
pub mod resumes;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API response is missing `{0}`")]
    MissingData(&'static str),
}

impl ApiError {
    /// Message reported by the backend, if the failure came from the backend.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// True when the backend refused a login because the email is not verified yet.
    pub fn is_unverified(&self) -> bool {
        self.server_message()
            .map(|m| m.to_lowercase().contains("not verified"))
            .unwrap_or(false)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    message: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

/// Decoded response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<EnvelopeError>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl Envelope {
    /// Deserializes `data[key]`.
    pub fn take<T: DeserializeOwned>(&mut self, key: &'static str) -> ApiResult<T> {
        let value = self
            .data
            .as_mut()
            .and_then(|d| d.get_mut(key))
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or(ApiError::MissingData(key))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Takes `data[key]` as raw JSON.
    pub fn take_value(&mut self, key: &'static str) -> ApiResult<Value> {
        self.data
            .as_mut()
            .and_then(|d| d.get_mut(key))
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or(ApiError::MissingData(key))
    }
}

/// HTTP client for the job board / resume backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BackendClient {
    pub fn new(base_url: &str, api_key: String) -> ApiResult<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Sends one request and decodes the envelope. Non-2xx statuses and
    /// `success: false` bodies become `ApiError::Api`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResult<Envelope> {
        debug!("{} {}", method, path);

        let mut request = self
            .client
            .request(method, self.url(path))
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        decode_envelope(status, &text)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> ApiResult<Envelope> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ApiResult<Envelope> {
        self.send(Method::POST, path, token, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ApiResult<Envelope> {
        self.send(Method::PUT, path, token, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> ApiResult<Envelope> {
        self.send(Method::DELETE, path, token, None).await
    }
}

/// Maps a raw HTTP status and body onto the envelope contract.
fn decode_envelope(status: StatusCode, body: &str) -> ApiResult<Envelope> {
    let parsed = serde_json::from_str::<Envelope>(body);

    if !status.is_success() {
        let message = match &parsed {
            Ok(envelope) => envelope
                .error
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
            Err(_) => format!("API request failed with status: {}", status.as_u16()),
        };
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope = parsed?;
    if !envelope.success {
        let (status, message) = match &envelope.error {
            Some(e) => (
                e.status_code.unwrap_or(status.as_u16()),
                e.message.clone().unwrap_or_else(|| "Request failed".to_string()),
            ),
            None => (status.as_u16(), "Request failed".to_string()),
        };
        return Err(ApiError::Api { status, message });
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, Uri},
        Json, Router,
    };
    use serde_json::json;
    use tokio::sync::Mutex;

    use crate::alerts::{AlertBackend, UnsubscribeRequest};
    use crate::auth::session::AuthBackend;
    use crate::models::resume::EntryKind;
    use crate::resume::store::ResumeBackend;

    #[derive(Debug)]
    struct Recorded {
        method: String,
        path: String,
        headers: HeaderMap,
        body: Value,
    }

    struct Recorder {
        reply: Value,
        requests: Mutex<Vec<Recorded>>,
    }

    async fn record(
        State(recorder): State<Arc<Recorder>>,
        method: axum::http::Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Json<Value> {
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        recorder.requests.lock().await.push(Recorded {
            method: method.to_string(),
            path: uri.path().to_string(),
            headers,
            body,
        });
        Json(recorder.reply.clone())
    }

    /// Local backend answering every request with `reply`.
    async fn recording_backend(reply: Value) -> (BackendClient, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(record).with_state(recorder.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = BackendClient::new(&format!("http://{addr}/"), "test-key".to_string()).unwrap();
        (client, recorder)
    }

    async fn only_request(recorder: &Recorder) -> Recorded {
        let mut requests = recorder.requests.lock().await;
        assert_eq!(requests.len(), 1);
        requests.remove(0)
    }

    #[tokio::test]
    async fn test_login_sends_api_key_and_credentials() {
        let (client, recorder) = recording_backend(json!({
            "success": true,
            "data": {
                "user": { "id": 7, "full_name": "Jane Doe", "email": "jane@example.com", "is_verified": true },
                "token": "tok-1"
            }
        }))
        .await;

        let payload = client.login("jane@example.com", "secret").await.unwrap();
        assert_eq!(payload.token, "tok-1");
        assert_eq!(payload.user.id, 7);

        let request = only_request(&recorder).await;
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/auth/login");
        assert_eq!(request.headers["x-api-key"], "test-key");
        assert!(request.headers.get("authorization").is_none());
        assert_eq!(request.headers["content-type"], "application/json");
        assert_eq!(
            request.body,
            json!({ "email": "jane@example.com", "password": "secret" })
        );
    }

    #[tokio::test]
    async fn test_entry_create_is_authenticated() {
        let (client, recorder) = recording_backend(json!({
            "success": true,
            "data": { "skill": { "id": 4, "resume_id": 1, "skill_name": "Rust" } }
        }))
        .await;

        let created = client
            .create_entry("tok-1", 1, EntryKind::Skill, json!({ "skill_name": "Rust" }))
            .await
            .unwrap();
        assert_eq!(created["id"], 4);

        let request = only_request(&recorder).await;
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/resumes/1/skills");
        assert_eq!(request.headers["x-api-key"], "test-key");
        assert_eq!(request.headers["authorization"], "Bearer tok-1");
        assert_eq!(request.body, json!({ "skill_name": "Rust" }));
    }

    #[tokio::test]
    async fn test_unsubscribe_by_token_body() {
        let (client, recorder) =
            recording_backend(json!({ "success": true, "message": "Unsubscribed" })).await;

        let message = client
            .unsubscribe(&UnsubscribeRequest::Token("abc123".into()))
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Unsubscribed"));

        let request = only_request(&recorder).await;
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/job-alerts/unsubscribe");
        assert_eq!(request.headers["x-api-key"], "test-key");
        assert!(request.headers.get("authorization").is_none());
        assert_eq!(request.body, json!({ "token": "abc123" }));
    }

    #[tokio::test]
    async fn test_subscribe_body() {
        let (client, recorder) =
            recording_backend(json!({ "success": true, "message": "Subscribed" })).await;

        client.subscribe("jane@example.com", 3).await.unwrap();

        let request = only_request(&recorder).await;
        assert_eq!(request.path, "/api/job-alerts/subscribe");
        assert_eq!(
            request.body,
            json!({ "email": "jane@example.com", "category_id": 3 })
        );
    }

    #[test]
    fn test_decode_success_envelope() {
        let mut envelope = decode_envelope(
            StatusCode::OK,
            r#"{"success":true,"data":{"skill":{"id":4,"resume_id":1,"skill_name":"Rust"}},"timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let skill: crate::models::resume::Skill = envelope.take("skill").unwrap();
        assert_eq!(skill.skill_name, "Rust");
    }

    #[test]
    fn test_decode_error_uses_server_message() {
        let err = decode_envelope(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"error":{"message":"Email not verified","statusCode":401}}"#,
        )
        .unwrap_err();
        assert_eq!(err.server_message(), Some("Email not verified"));
        assert!(err.is_unverified());
    }

    #[test]
    fn test_decode_error_without_message_falls_back_to_status() {
        let err = decode_envelope(StatusCode::BAD_GATEWAY, r#"{"success":false}"#).unwrap_err();
        assert_eq!(err.server_message(), Some("HTTP error! status: 502"));
    }

    #[test]
    fn test_decode_unparseable_error_body() {
        let err = decode_envelope(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").unwrap_err();
        assert_eq!(
            err.server_message(),
            Some("API request failed with status: 500")
        );
    }

    #[test]
    fn test_success_false_with_ok_status_is_an_error() {
        let err = decode_envelope(
            StatusCode::OK,
            r#"{"success":false,"error":{"message":"Invalid token","statusCode":400}}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_take_missing_key() {
        let mut envelope = decode_envelope(StatusCode::OK, r#"{"success":true,"data":{}}"#).unwrap();
        let err = envelope.take::<String>("resume").unwrap_err();
        assert!(matches!(err, ApiError::MissingData("resume")));
    }

    #[test]
    fn test_top_level_message_is_kept() {
        let envelope = decode_envelope(
            StatusCode::OK,
            r#"{"success":true,"message":"Unsubscribed"}"#,
        )
        .unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Unsubscribed"));
    }
}
