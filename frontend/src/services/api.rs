use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::envelope::{unwrap_field, unwrap_list};
use shared::{
    AssignStudentRequest, Bus, BusInput, Checkpoint, CheckpointInput, ErrorBody,
    ProcessChangeCheckpointRequest, ReplyRequest, Request, RequestType, Route, RouteInput, Student,
    StudentInput, User, UserInput, UserRole,
};

use crate::config::AdminConfig;
use crate::errors::{ApiError, ApiResult};
use crate::services::gateway::AdminGateway;

/// HTTP client for the administration backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    /// `<api_base_url>/api`
    base_url: Url,
}

impl ApiClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &AdminConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let base_url = Url::parse(&config.api_url("")).map_err(|e| {
            ApiError::InvalidInput(format!("Invalid API base URL '{}': {}", config.api_base_url, e))
        })?;
        Ok(Self { client, base_url })
    }

    /// Create a client for a custom base URL, e.g. a local mock backend
    pub fn with_base_url(base_url: &str) -> ApiResult<Self> {
        let config = AdminConfig {
            api_base_url: base_url.to_string(),
            ..AdminConfig::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The base URL with `segments` appended, each one percent-encoded
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidInput(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_body(&self, path: &[&str], query: &[(&str, String)]) -> ApiResult<Value> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        Self::read_body(response).await
    }

    async fn send_body<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> ApiResult<Value> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let response = self.client.request(method, url).json(body).send().await?;
        Self::read_body(response).await
    }

    /// Turn a response into its JSON body, or an error carrying the server's message
    async fn read_body(response: Response) -> ApiResult<Value> {
        let status = response.status();
        if status.is_success() {
            if status == reqwest::StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            return Ok(response.json::<Value>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                if text.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    text
                }
            });
        warn!("❌ Backend returned {}: {}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
        field: &str,
    ) -> ApiResult<Vec<T>> {
        let body = self.get_body(path, query).await?;
        Ok(unwrap_list(&body, field)?)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &[&str], field: &str) -> ApiResult<T> {
        let body = self.get_body(path, &[]).await?;
        Ok(unwrap_field(&body, field)?)
    }

    async fn mutate<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
        field: &str,
    ) -> ApiResult<T> {
        let body = self.send_body(method, path, body).await?;
        Ok(unwrap_field(&body, field)?)
    }
}

#[async_trait]
impl AdminGateway for ApiClient {
    async fn list_request_types(&self) -> ApiResult<Vec<RequestType>> {
        self.fetch_list(&["request-types"], &[], "requestTypes").await
    }

    async fn list_requests(&self) -> ApiResult<Vec<Request>> {
        self.fetch_list(&["requests"], &[], "requests").await
    }

    async fn get_request(&self, request_id: &str) -> ApiResult<Request> {
        self.fetch_one(&["requests", request_id], "request")
            .await
    }

    async fn reply_request(&self, reply: &ReplyRequest) -> ApiResult<Request> {
        self.mutate(Method::POST, &["requests", "reply"], reply, "request")
            .await
    }

    async fn process_change_checkpoint(&self, request_id: &str) -> ApiResult<Request> {
        let body = ProcessChangeCheckpointRequest {
            request_id: request_id.to_string(),
        };
        self.mutate(
            Method::POST,
            &["requests", "process-change-checkpoint"],
            &body,
            "request",
        )
        .await
    }

    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        self.fetch_list(&["students"], &[], "students").await
    }

    async fn get_student(&self, student_id: &str) -> ApiResult<Student> {
        self.fetch_one(&["students", student_id], "student")
            .await
    }

    async fn create_student(&self, input: &StudentInput) -> ApiResult<Student> {
        self.mutate(Method::POST, &["students"], input, "student").await
    }

    async fn update_student(&self, student_id: &str, input: &StudentInput) -> ApiResult<Student> {
        self.mutate(
            Method::PUT,
            &["students", student_id],
            input,
            "student",
        )
        .await
    }

    async fn assign_student(
        &self,
        student_id: &str,
        assignment: &AssignStudentRequest,
    ) -> ApiResult<Student> {
        self.mutate(
            Method::PUT,
            &["students", student_id, "assignment"],
            assignment,
            "student",
        )
        .await
    }

    async fn list_users(&self, role: Option<UserRole>) -> ApiResult<Vec<User>> {
        let query: Vec<(&str, String)> = role
            .map(|r| vec![("role", r.to_string())])
            .unwrap_or_default();
        self.fetch_list(&["users"], &query, "users").await
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.fetch_one(&["users", user_id], "user").await
    }

    async fn create_user(&self, input: &UserInput) -> ApiResult<User> {
        self.mutate(Method::POST, &["users"], input, "user").await
    }

    async fn update_user(&self, user_id: &str, input: &UserInput) -> ApiResult<User> {
        self.mutate(Method::PUT, &["users", user_id], input, "user")
            .await
    }

    async fn list_buses(&self) -> ApiResult<Vec<Bus>> {
        self.fetch_list(&["buses"], &[], "buses").await
    }

    async fn get_bus(&self, bus_id: &str) -> ApiResult<Bus> {
        self.fetch_one(&["buses", bus_id], "bus").await
    }

    async fn create_bus(&self, input: &BusInput) -> ApiResult<Bus> {
        self.mutate(Method::POST, &["buses"], input, "bus").await
    }

    async fn update_bus(&self, bus_id: &str, input: &BusInput) -> ApiResult<Bus> {
        self.mutate(Method::PUT, &["buses", bus_id], input, "bus")
            .await
    }

    async fn list_checkpoints(&self) -> ApiResult<Vec<Checkpoint>> {
        self.fetch_list(&["checkpoints"], &[], "checkpoints").await
    }

    async fn get_checkpoint(&self, checkpoint_id: &str) -> ApiResult<Checkpoint> {
        self.fetch_one(&["checkpoints", checkpoint_id], "checkpoint")
            .await
    }

    async fn create_checkpoint(&self, input: &CheckpointInput) -> ApiResult<Checkpoint> {
        self.mutate(Method::POST, &["checkpoints"], input, "checkpoint")
            .await
    }

    async fn update_checkpoint(
        &self,
        checkpoint_id: &str,
        input: &CheckpointInput,
    ) -> ApiResult<Checkpoint> {
        self.mutate(
            Method::PUT,
            &["checkpoints", checkpoint_id],
            input,
            "checkpoint",
        )
        .await
    }

    async fn list_routes(&self) -> ApiResult<Vec<Route>> {
        self.fetch_list(&["routes"], &[], "routes").await
    }

    async fn get_route(&self, route_id: &str) -> ApiResult<Route> {
        self.fetch_one(&["routes", route_id], "route").await
    }

    async fn create_route(&self, input: &RouteInput) -> ApiResult<Route> {
        self.mutate(Method::POST, &["routes"], input, "route").await
    }

    async fn update_route(&self, route_id: &str, input: &RouteInput) -> ApiResult<Route> {
        self.mutate(Method::PUT, &["routes", route_id], input, "route")
            .await
    }
}
