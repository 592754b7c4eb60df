//! # Gateway Trait
//!
//! Abstraction over the administration backend. Controllers only talk to
//! this trait, so the same workflow code runs against the HTTP client or an
//! in-memory implementation.
//!
//! Every method issues exactly one remote call and never retries.

use async_trait::async_trait;
use shared::{
    AssignStudentRequest, Bus, BusInput, Checkpoint, CheckpointInput, ReplyRequest, Request,
    RequestType, Route, RouteInput, Student, StudentInput, User, UserInput, UserRole,
};

use crate::errors::ApiResult;

#[async_trait]
pub trait AdminGateway: Send + Sync {
    /// The backend's request-type taxonomy
    async fn list_request_types(&self) -> ApiResult<Vec<RequestType>>;

    async fn list_requests(&self) -> ApiResult<Vec<Request>>;

    async fn get_request(&self, request_id: &str) -> ApiResult<Request>;

    /// Approve, reject or mark a request as read
    async fn reply_request(&self, reply: &ReplyRequest) -> ApiResult<Request>;

    /// Apply a pickup-change request: move the student to the requested checkpoint
    async fn process_change_checkpoint(&self, request_id: &str) -> ApiResult<Request>;

    async fn list_students(&self) -> ApiResult<Vec<Student>>;

    async fn get_student(&self, student_id: &str) -> ApiResult<Student>;

    async fn create_student(&self, input: &StudentInput) -> ApiResult<Student>;

    async fn update_student(&self, student_id: &str, input: &StudentInput) -> ApiResult<Student>;

    async fn assign_student(
        &self,
        student_id: &str,
        assignment: &AssignStudentRequest,
    ) -> ApiResult<Student>;

    /// Users, optionally restricted to one role
    async fn list_users(&self, role: Option<UserRole>) -> ApiResult<Vec<User>>;

    async fn get_user(&self, user_id: &str) -> ApiResult<User>;

    async fn create_user(&self, input: &UserInput) -> ApiResult<User>;

    async fn update_user(&self, user_id: &str, input: &UserInput) -> ApiResult<User>;

    async fn list_buses(&self) -> ApiResult<Vec<Bus>>;

    async fn get_bus(&self, bus_id: &str) -> ApiResult<Bus>;

    async fn create_bus(&self, input: &BusInput) -> ApiResult<Bus>;

    async fn update_bus(&self, bus_id: &str, input: &BusInput) -> ApiResult<Bus>;

    async fn list_checkpoints(&self) -> ApiResult<Vec<Checkpoint>>;

    async fn get_checkpoint(&self, checkpoint_id: &str) -> ApiResult<Checkpoint>;

    async fn create_checkpoint(&self, input: &CheckpointInput) -> ApiResult<Checkpoint>;

    async fn update_checkpoint(
        &self,
        checkpoint_id: &str,
        input: &CheckpointInput,
    ) -> ApiResult<Checkpoint>;

    async fn list_routes(&self) -> ApiResult<Vec<Route>>;

    async fn get_route(&self, route_id: &str) -> ApiResult<Route>;

    async fn create_route(&self, input: &RouteInput) -> ApiResult<Route>;

    async fn update_route(&self, route_id: &str, input: &RouteInput) -> ApiResult<Route>;
}
