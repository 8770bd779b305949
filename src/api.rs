//! Transport client for the task REST API.
//!
//! `TaskApi` is the seam between the list lifecycle and the network: the page
//! controller and the mutation actions only ever talk to this trait.
//! `HttpClient` is the reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ServerConfig;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::task::{IdsPayload, NewTask, Priority, Task, TaskId, TaskPage, TaskPatch};

/// Parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub is_done: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskQuery {
    /// Query-string pairs; unset filters are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(search) = self.search.as_ref() {
            pairs.push(("search", search.clone()));
        }
        if let Some(is_done) = self.is_done {
            pairs.push(("is_done", is_done.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        pairs
    }
}

pub trait TaskApi {
    fn list(&self, query: &TaskQuery) -> impl Future<Output = Result<TaskPage>> + Send;

    /// Create a task. The created record is returned when the server's
    /// response body carries a full task.
    fn create(&self, task: &NewTask) -> impl Future<Output = Result<Option<Task>>> + Send;

    fn update(&self, id: TaskId, patch: &TaskPatch) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, id: TaskId) -> impl Future<Output = Result<()>> + Send;

    fn bulk_done(&self, ids: &[TaskId]) -> impl Future<Output = Result<()>> + Send;

    fn bulk_delete(&self, ids: &[TaskId]) -> impl Future<Output = Result<()>> + Send;
}

/// reqwest-backed client bound to one server origin.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("todo/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoints: Endpoints::new(&config.origin),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl TaskApi for HttpClient {
    async fn list(&self, query: &TaskQuery) -> Result<TaskPage> {
        tracing::debug!(?query, "listing tasks");
        let resp = self
            .http
            .get(&self.endpoints.tasks)
            .query(&query.to_pairs())
            .send()
            .await?;
        let resp = check_response(resp).await?;
        Ok(resp.json::<TaskPage>().await?)
    }

    async fn create(&self, task: &NewTask) -> Result<Option<Task>> {
        tracing::debug!(title = %task.title, "creating task");
        let resp = self
            .http
            .post(&self.endpoints.tasks)
            .json(task)
            .send()
            .await?;
        let body = check_response(resp).await?.text().await?;
        Ok(serde_json::from_str::<Task>(&body).ok())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        tracing::debug!(%id, "updating task");
        let resp = self
            .http
            .patch(self.endpoints.task(id))
            .json(patch)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        tracing::debug!(%id, "deleting task");
        let resp = self.http.delete(self.endpoints.task(id)).send().await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn bulk_done(&self, ids: &[TaskId]) -> Result<()> {
        tracing::debug!(count = ids.len(), "bulk marking tasks done");
        let resp = self
            .http
            .post(&self.endpoints.bulk_done)
            .json(&IdsPayload { ids: ids.to_vec() })
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[TaskId]) -> Result<()> {
        tracing::debug!(count = ids.len(), "bulk deleting tasks");
        let resp = self
            .http
            .post(&self.endpoints.bulk_delete)
            .json(&IdsPayload { ids: ids.to_vec() })
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}

/// Error body shape used by the server (`{"detail": ..., "blocked_for_seconds": ...}`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    blocked_for_seconds: Option<u64>,
}

/// Map non-success statuses to typed errors.
///
/// - **429** → [`Error::RateLimited`] carrying the server's `detail` text,
///   with the wait taken from `blocked_for_seconds` or `Retry-After`.
/// - any other non-2xx → [`Error::Api`] with `detail` or the raw body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = parse_retry_after(&resp);
    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

    if status.as_u16() == 429 {
        let retry_after_secs = body.blocked_for_seconds.or(retry_after);
        let detail = body
            .detail
            .filter(|detail| !detail.trim().is_empty())
            .unwrap_or_else(|| match retry_after_secs {
                Some(secs) => format!("Too many requests. Try again in {secs} seconds."),
                None => "Too many requests. Try again later.".to_string(),
            });
        tracing::warn!(%detail, "rate limited by server");
        return Err(Error::RateLimited {
            detail,
            retry_after_secs,
        });
    }

    let message = body.detail.unwrap_or_else(|| text.trim().to_string());
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn query_omits_unset_filters() {
        let query = TaskQuery {
            page: 1,
            page_size: 5,
            search: None,
            is_done: None,
            priority: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "1".to_string()), ("page_size", "5".to_string())]
        );
    }

    #[test]
    fn query_includes_set_filters() {
        let query = TaskQuery {
            page: 2,
            page_size: 10,
            search: Some("milk".to_string()),
            is_done: Some(false),
            priority: Some(Priority::High),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_string()),
                ("page_size", "10".to_string()),
                ("search", "milk".to_string()),
                ("is_done", "false".to_string()),
                ("priority", "High".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn rate_limit_surfaces_server_detail() {
        let resp = mock_response(
            429,
            r#"{"detail": "Too many requests. IP blocked for 5 seconds.", "blocked_for_seconds": 5}"#,
        );
        let err = check_response(resp).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too many requests. IP blocked for 5 seconds."
        );
        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: Some(5),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn rate_limit_without_body_uses_retry_after() {
        let resp = mock_response_with_retry_after(429, "30");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: Some(30),
                ..
            }
        ));
        assert!(err.to_string().contains("30 seconds"));
    }

    #[tokio::test]
    async fn api_error_prefers_detail_field() {
        let resp = mock_response(404, r#"{"detail": "No Tasks matches the given query."}"#);
        let err = check_response(resp).await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No Tasks matches the given query.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_falls_back_to_body() {
        let resp = mock_response(500, "Internal Server Error");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, ref message } if message == "Internal Server Error"));
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = mock_response(200, "[]");
        assert!(check_response(resp).await.is_ok());
    }

    #[test]
    fn client_builds_from_config() {
        let client = HttpClient::new(&ServerConfig::default()).expect("client");
        assert_eq!(
            client.endpoints().tasks,
            "http://localhost:8000/api/tasks/"
        );
    }
}
