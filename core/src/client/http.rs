use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::traits::MissionApi;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{
    Activity, Agent, CommentRequest, DeleteRequest, Task, TaskUpdate, UpdateRequest,
};

pub const API_KEY_HEADER: &str = "x-api-key";

const BODY_PREVIEW_LIMIT: usize = 512;

/// Per-call options. Headers here replace the client defaults with the same name.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_body<B: Serialize>(body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode {
            url: String::new(),
            message: format!("failed to encode request body: {e}"),
        })?;
        Ok(Self {
            body: Some(body),
            ..Self::default()
        })
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout_ms: Option<u64>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(cfg: &ApiConfig) -> anyhow::Result<Self> {
        Self::new(&cfg.base_url, &cfg.api_key, cfg.timeout_ms)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key).map_err(|e| invalid_header("api key", e))?;
        map.insert(HeaderName::from_static(API_KEY_HEADER), key);

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid_header(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid_header(name.as_str(), e))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Issue one request and decode the JSON response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(
            target: "mission.client",
            stage = "request.in",
            method = %method,
            url = %url,
            params = opts.params.len(),
            has_body = opts.body.is_some()
        );

        let mut req = self
            .http
            .request(method.clone(), &url)
            .headers(self.headers(&opts.headers)?);
        if !opts.params.is_empty() {
            req = req.query(&opts.params);
        }
        if let Some(body) = &opts.body {
            req = req.body(body.to_string());
        }

        let resp = req.send().await.map_err(|err| {
            tracing::debug!(target: "mission.client", stage = "request.err", url = %url, error = %err);
            ApiError::transport(&err, &url)
        })?;
        let status = resp.status();
        let out = parse_json_response(resp, &url).await;
        tracing::debug!(
            target: "mission.client",
            stage = "request.out",
            method = %method,
            url = %url,
            status = %status,
            ok = out.is_ok()
        );
        out
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let opts = RequestOptions::with_params(params.iter().map(|(k, v)| (*k, v.clone())));
        self.request(Method::GET, path, opts).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, RequestOptions::with_body(body)?)
            .await
    }
}

#[async_trait]
impl MissionApi for ApiClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        let agents: Vec<Agent> = self.get("/agents", &[]).await?;
        for agent in &agents {
            agent.validate()?;
        }
        Ok(agents)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get("/tasks", &[]).await
    }

    async fn list_activities(&self, limit: u32) -> Result<Vec<Activity>, ApiError> {
        self.get("/activities", &[("limit", limit.to_string())])
            .await
    }

    async fn add_comment(&self, task_id: &str, author: &str, text: &str) -> Result<(), ApiError> {
        let body = CommentRequest {
            task_id,
            author,
            text,
        };
        let _: Value = self.post("/tasks/comment", &body).await?;
        Ok(())
    }

    async fn update_task(&self, task_id: &str, updates: &TaskUpdate) -> Result<(), ApiError> {
        let body = UpdateRequest { task_id, updates };
        let _: Value = self.post("/tasks/update", &body).await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        let _: Value = self.post("/tasks/delete", &DeleteRequest { task_id }).await?;
        Ok(())
    }
}

fn invalid_header(name: &str, err: impl std::fmt::Display) -> ApiError {
    ApiError::Transport {
        kind: crate::error::TransportKind::Request,
        url: String::new(),
        message: format!("invalid header {name}: {err}"),
    }
}

/// Backend `error` field if present and non-empty, otherwise `HTTP <status>`.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

async fn parse_json_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    url: &str,
) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|err| ApiError::transport(&err, url))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        });
    }

    let text = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str::<T>(text).map_err(|err| ApiError::Decode {
        url: url.to_string(),
        message: format!("{err} | body={}", preview_body(&body)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AgentStatus;
    use mockito::{Matcher, Server};

    const AGENTS_JSON: &str = r#"[{"id":"jarvis","name":"Jarvis","role":"Squad Lead",
        "status":"active","currentTaskId":null,"sessionKey":"agent:main:main","heartbeatMinute":0}]"#;

    #[test]
    fn test_error_message_prefers_backend_field() {
        assert_eq!(error_message(404, r#"{"error":"Task not found"}"#), "Task not found");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(502, "bad gateway"), "HTTP 502");
        assert_eq!(error_message(500, ""), "HTTP 500");
        assert_eq!(error_message(400, r#"{"message":"nope"}"#), "HTTP 400");
        assert_eq!(error_message(400, r#"{"error":""}"#), "HTTP 400");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview_body("  "), "<empty body>");
    }

    #[tokio::test]
    async fn test_list_agents_sends_api_key_and_content_type() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/agents")
            .match_header("x-api-key", "secret-key")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(AGENTS_JSON)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "secret-key", None).unwrap();
        let agents = client.list_agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn test_list_activities_serializes_limit() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/activities")
            .match_query(Matcher::UrlEncoded("limit".into(), "20".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        assert!(client.list_activities(20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_error_uses_backend_message() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/tasks/delete")
            .with_status(404)
            .with_body(r#"{"error":"Task not found"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        let err = client.delete_task("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Task not found");
    }

    #[tokio::test]
    async fn test_status_error_without_body_uses_http_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(503)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        let err = client.list_tasks().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[tokio::test]
    async fn test_update_task_posts_partial_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/tasks/update")
            .match_body(Matcher::Json(serde_json::json!({
                "taskId": "t1",
                "updates": {"assignee": null, "status": "inbox"}
            })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        client
            .update_task("t1", &TaskUpdate::unassign())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_comment_accepts_empty_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/tasks/comment")
            .match_body(Matcher::Json(serde_json::json!({
                "taskId": "t1", "author": "khayal", "text": "ship it"
            })))
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        client.add_comment("t1", "khayal", "ship it").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_heartbeat_is_rejected_at_boundary() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/agents")
            .with_status(200)
            .with_body(AGENTS_JSON.replace(r#""heartbeatMinute":0"#, r#""heartbeatMinute":75"#))
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        let err = client.list_agents().await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid { entity: "agent", .. }));
    }

    #[tokio::test]
    async fn test_unknown_status_is_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_body(
                r#"[{"id":"t","title":"x","status":"archived","priority":"low",
                "createdAt":"2026-01-01T00:00:00Z","updatedAt":"2026-01-01T00:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "", None).unwrap();
        let err = client.list_tasks().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_header_override_replaces_default() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tasks")
            .match_header("x-api-key", "override")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), "default", None).unwrap();
        let opts = RequestOptions::default().header("X-API-Key", "override");
        let tasks: Vec<crate::model::Task> = client.request(Method::GET, "/tasks", opts).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:1", "", Some(500)).unwrap();
        let err = client.list_agents().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
