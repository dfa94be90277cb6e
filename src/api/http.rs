//! REST client for the kanban backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::auth::{Credentials, LoginResponse, ProfileUpdate, Registration};
use super::BoardApi;
use crate::core::{
    Column, ColumnId, ColumnUpdate, NewColumn, NewProject, NewTask, Placement, Project, ProjectId,
    ProjectSnapshot, Task, TaskId, TaskPatch, User, UserId,
};
use crate::{klog_debug, klog_trace, Error, Result};

#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBoardApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        klog_trace!("{} {}", method, url);
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Send a request whose response body is ignored.
    async fn send_unit(&self, method: Method, path: &str) -> Result<()> {
        let response = self.request(method, path).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(status, &body))
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| {
            Error::InvalidResponse(format!("{} ({})", e, crate::util::truncate(&body, 120)))
        })
    }

    fn status_error(status: StatusCode, body: &str) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }
        let detail = format_error_body(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        klog_debug!("Backend returned {}: {}", status, detail);
        Error::Api {
            status: status.as_u16(),
            detail,
        }
    }

    // ========== Auth ==========

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.send_json(Method::POST, "/auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<Value> {
        self.send_json(Method::POST, "/auth/register", registration)
            .await
    }

    pub async fn me(&self) -> Result<User> {
        self.get("/auth/me").await
    }

    pub async fn logout(&self) -> Result<()> {
        self.send_unit(Method::POST, "/auth/logout").await
    }

    pub async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> Result<User> {
        self.send_json(Method::PATCH, &format!("/users/profile/{}", user_id), update)
            .await
    }

    pub async fn fetch_project(&self, project_id: ProjectId) -> Result<Project> {
        self.get(&format!("/projects/{}", project_id))
            .await
            .map_err(|e| match e {
                Error::Api { status: 404, .. } => Error::ProjectNotFound(project_id),
                other => other,
            })
    }

    pub async fn fetch_columns(&self, project_id: ProjectId) -> Result<Vec<Column>> {
        self.get(&format!("/columns?project_id={}", project_id)).await
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn fetch_project_snapshot(&self, project_id: ProjectId) -> Result<ProjectSnapshot> {
        let (project, columns, tasks) = tokio::try_join!(
            self.fetch_project(project_id),
            self.fetch_columns(project_id),
            self.fetch_tasks(project_id),
        )?;
        Ok(ProjectSnapshot {
            project: Some(project),
            columns,
            tasks,
        })
    }

    async fn update_task_placement(&self, task_id: TaskId, placement: Placement) -> Result<Task> {
        self.update_task(task_id, TaskPatch::placement(placement))
            .await
    }

    async fn fetch_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        self.get(&format!("/tasks?project_id={}", project_id)).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("/projects").await
    }

    async fn create_project(&self, project: NewProject) -> Result<Project> {
        self.send_json(Method::POST, "/projects", &project).await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/projects/{}", project_id))
            .await
    }

    async fn create_column(&self, column: NewColumn) -> Result<Column> {
        self.send_json(Method::POST, "/columns", &column).await
    }

    async fn update_column(&self, column_id: ColumnId, update: ColumnUpdate) -> Result<Column> {
        self.send_json(Method::PUT, &format!("/columns/{}", column_id), &update)
            .await
    }

    async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/columns/{}", column_id))
            .await
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.send_json(Method::POST, "/tasks", &task).await
    }

    async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.send_json(Method::PUT, &format!("/tasks/{}", task_id), &patch)
            .await
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/tasks/{}", task_id))
            .await
    }
}

/// Turn an error body into one readable line.
///
/// FastAPI puts the message in `detail`: a string, or a list of
/// `{loc, msg}` validation errors rendered as `body.title : field required`
/// and joined with `; `. Other JSON is returned as-is, other text trimmed.
pub fn format_error_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };
    let Some(detail) = value.get("detail") else {
        return Some(value.to_string());
    };
    Some(match detail {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(format_validation_item)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    })
}

fn format_validation_item(item: &Value) -> String {
    let msg = item.get("msg").and_then(Value::as_str);
    let loc = item.get("loc").and_then(Value::as_array).map(|parts| {
        parts
            .iter()
            .map(|p| match p {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    });
    match (loc, msg) {
        (Some(loc), Some(msg)) => format!("{} : {}", loc, msg),
        (None, Some(msg)) => msg.to_string(),
        _ => item.to_string(),
    }
}
