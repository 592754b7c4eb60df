//! In-memory gateway and fixtures for controller tests.
//!
//! Every trait call is appended to a call log so tests can assert exact
//! call sequences.

use async_trait::async_trait;
use shared::{
    AssignStudentRequest, Bus, BusInput, BusStatus, Checkpoint, CheckpointInput, EntityStatus,
    Gender, ReplyRequest, Request, RequestStatus, RequestType, Route, RouteInput, Student,
    StudentInput, User, UserInput, UserRole,
};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::errors::{ApiError, ApiResult};
use crate::services::gateway::AdminGateway;

#[derive(Default)]
pub struct FakeData {
    pub request_types: Vec<RequestType>,
    pub requests: Vec<Request>,
    pub students: Vec<Student>,
    pub users: Vec<User>,
    pub buses: Vec<Bus>,
    pub checkpoints: Vec<Checkpoint>,
    pub routes: Vec<Route>,
    /// IDs whose mutations answer 500
    pub failing_ids: HashSet<String>,
    /// Make every list call fail
    pub lists_fail: bool,
    /// IDs whose mutations never answer
    pub stalled_ids: HashSet<String>,
    pub(crate) next_id: usize,
}

#[derive(Default)]
pub struct FakeGateway {
    pub data: Mutex<FakeData>,
    calls: Mutex<Vec<String>>,
}

fn not_found(what: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

fn server_error(id: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: format!("Could not update {}", id),
    }
}

impl FakeGateway {
    pub fn with_data(data: FakeData) -> Self {
        Self {
            data: Mutex::new(data),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose log entry starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn list<T: Clone>(&self, call: &str, pick: impl Fn(&FakeData) -> &Vec<T>) -> ApiResult<Vec<T>> {
        self.record(call);
        let data = self.data.lock().unwrap();
        if data.lists_fail {
            return Err(ApiError::Status {
                status: 503,
                message: "Backend unavailable".to_string(),
            });
        }
        Ok(pick(&*data).clone())
    }

    async fn stall_if_asked(&self, id: &str) {
        let stalled = self.data.lock().unwrap().stalled_ids.contains(id);
        if stalled {
            std::future::pending::<()>().await;
        }
    }

    fn check_failing(data: &FakeData, id: &str) -> ApiResult<()> {
        if data.failing_ids.contains(id) {
            Err(server_error(id))
        } else {
            Ok(())
        }
    }
}

impl FakeData {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-new-{}", prefix, self.next_id)
    }
}

#[async_trait]
impl AdminGateway for FakeGateway {
    async fn list_request_types(&self) -> ApiResult<Vec<RequestType>> {
        self.list("list_request_types", |d| &d.request_types)
    }

    async fn list_requests(&self) -> ApiResult<Vec<Request>> {
        self.list("list_requests", |d| &d.requests)
    }

    async fn get_request(&self, request_id: &str) -> ApiResult<Request> {
        self.record(format!("get_request {}", request_id));
        let data = self.data.lock().unwrap();
        data.requests
            .iter()
            .find(|r| r.request_id == request_id)
            .cloned()
            .ok_or_else(|| not_found("Request", request_id))
    }

    async fn reply_request(&self, reply: &ReplyRequest) -> ApiResult<Request> {
        self.record(format!(
            "reply_request {} {} {}",
            reply.request_id,
            reply.status,
            reply.reply.as_deref().unwrap_or("-")
        ));
        self.stall_if_asked(&reply.request_id).await;
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, &reply.request_id)?;
        let request = data
            .requests
            .iter_mut()
            .find(|r| r.request_id == reply.request_id)
            .ok_or_else(|| not_found("Request", &reply.request_id))?;
        request.status = reply.status;
        request.reply = reply.reply.clone();
        Ok(request.clone())
    }

    async fn process_change_checkpoint(&self, request_id: &str) -> ApiResult<Request> {
        self.record(format!("process_change_checkpoint {}", request_id));
        self.stall_if_asked(request_id).await;
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, request_id)?;
        let request = data
            .requests
            .iter_mut()
            .find(|r| r.request_id == request_id)
            .ok_or_else(|| not_found("Request", request_id))?;
        request.status = RequestStatus::Approved;
        request.reply = Some("Pickup point updated".to_string());
        let updated = request.clone();

        if let (Some(student_id), Some(checkpoint_id)) = (&updated.student_id, &updated.checkpoint_id) {
            if let Some(student) = data.students.iter_mut().find(|s| &s.id == student_id) {
                student.checkpoint_id = Some(checkpoint_id.clone());
            }
        }
        Ok(updated)
    }

    async fn list_students(&self) -> ApiResult<Vec<Student>> {
        self.list("list_students", |d| &d.students)
    }

    async fn get_student(&self, student_id: &str) -> ApiResult<Student> {
        self.record(format!("get_student {}", student_id));
        let data = self.data.lock().unwrap();
        data.students
            .iter()
            .find(|s| s.id == student_id)
            .cloned()
            .ok_or_else(|| not_found("Student", student_id))
    }

    async fn create_student(&self, input: &StudentInput) -> ApiResult<Student> {
        self.record(format!("create_student {}", input.roll_number));
        let mut data = self.data.lock().unwrap();
        let id = data.fresh_id("stu");
        let mut created = student(&id, &input.name);
        created.roll_number = input.roll_number.clone();
        created.dob = input.dob.clone();
        created.parent_id = input.parent_id.clone();
        data.students.push(created.clone());
        Ok(created)
    }

    async fn update_student(&self, student_id: &str, input: &StudentInput) -> ApiResult<Student> {
        self.record(format!("update_student {}", student_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, student_id)?;
        let existing = data
            .students
            .iter_mut()
            .find(|s| s.id == student_id)
            .ok_or_else(|| not_found("Student", student_id))?;
        existing.name = input.name.clone();
        existing.roll_number = input.roll_number.clone();
        existing.dob = input.dob.clone();
        existing.address = input.address.clone();
        Ok(existing.clone())
    }

    async fn assign_student(
        &self,
        student_id: &str,
        assignment: &AssignStudentRequest,
    ) -> ApiResult<Student> {
        self.record(format!("assign_student {}", student_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, student_id)?;
        let existing = data
            .students
            .iter_mut()
            .find(|s| s.id == student_id)
            .ok_or_else(|| not_found("Student", student_id))?;
        existing.bus_id = assignment.bus_id.clone();
        existing.checkpoint_id = assignment.checkpoint_id.clone();
        Ok(existing.clone())
    }

    async fn list_users(&self, role: Option<UserRole>) -> ApiResult<Vec<User>> {
        let users = self.list("list_users", |d| &d.users)?;
        Ok(users
            .into_iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.record(format!("get_user {}", user_id));
        let data = self.data.lock().unwrap();
        data.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("User", user_id))
    }

    async fn create_user(&self, input: &UserInput) -> ApiResult<User> {
        self.record(format!("create_user {}", input.username));
        let mut data = self.data.lock().unwrap();
        let id = data.fresh_id("user");
        let created = User {
            id,
            username: input.username.clone(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            role: input.role,
            status: input.status,
        };
        data.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user_id: &str, input: &UserInput) -> ApiResult<User> {
        self.record(format!("update_user {}", user_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, user_id)?;
        let existing = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("User", user_id))?;
        existing.full_name = input.full_name.clone();
        existing.phone = input.phone.clone();
        existing.email = input.email.clone();
        Ok(existing.clone())
    }

    async fn list_buses(&self) -> ApiResult<Vec<Bus>> {
        self.list("list_buses", |d| &d.buses)
    }

    async fn get_bus(&self, bus_id: &str) -> ApiResult<Bus> {
        self.record(format!("get_bus {}", bus_id));
        let data = self.data.lock().unwrap();
        data.buses
            .iter()
            .find(|b| b.id == bus_id)
            .cloned()
            .ok_or_else(|| not_found("Bus", bus_id))
    }

    async fn create_bus(&self, input: &BusInput) -> ApiResult<Bus> {
        self.record(format!("create_bus {}", input.license_plate));
        let mut data = self.data.lock().unwrap();
        let id = data.fresh_id("bus");
        let mut created = bus(&id, &input.name, input.max_capacity);
        created.license_plate = input.license_plate.clone();
        data.buses.push(created.clone());
        Ok(created)
    }

    async fn update_bus(&self, bus_id: &str, input: &BusInput) -> ApiResult<Bus> {
        self.record(format!("update_bus {}", bus_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, bus_id)?;
        let existing = data
            .buses
            .iter_mut()
            .find(|b| b.id == bus_id)
            .ok_or_else(|| not_found("Bus", bus_id))?;
        existing.name = input.name.clone();
        existing.max_capacity = input.max_capacity;
        existing.bus_status = input.bus_status;
        Ok(existing.clone())
    }

    async fn list_checkpoints(&self) -> ApiResult<Vec<Checkpoint>> {
        self.list("list_checkpoints", |d| &d.checkpoints)
    }

    async fn get_checkpoint(&self, checkpoint_id: &str) -> ApiResult<Checkpoint> {
        self.record(format!("get_checkpoint {}", checkpoint_id));
        let data = self.data.lock().unwrap();
        data.checkpoints
            .iter()
            .find(|c| c.id == checkpoint_id)
            .cloned()
            .ok_or_else(|| not_found("Checkpoint", checkpoint_id))
    }

    async fn create_checkpoint(&self, input: &CheckpointInput) -> ApiResult<Checkpoint> {
        self.record(format!("create_checkpoint {}", input.name));
        let mut data = self.data.lock().unwrap();
        let id = data.fresh_id("cp");
        let created = Checkpoint {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            latitude: input.latitude.clone(),
            longitude: input.longitude.clone(),
            status: input.status,
            created_at: None,
            updated_at: None,
        };
        data.checkpoints.push(created.clone());
        Ok(created)
    }

    async fn update_checkpoint(
        &self,
        checkpoint_id: &str,
        input: &CheckpointInput,
    ) -> ApiResult<Checkpoint> {
        self.record(format!("update_checkpoint {}", checkpoint_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, checkpoint_id)?;
        let existing = data
            .checkpoints
            .iter_mut()
            .find(|c| c.id == checkpoint_id)
            .ok_or_else(|| not_found("Checkpoint", checkpoint_id))?;
        existing.name = input.name.clone();
        existing.description = input.description.clone();
        existing.latitude = input.latitude.clone();
        existing.longitude = input.longitude.clone();
        Ok(existing.clone())
    }

    async fn list_routes(&self) -> ApiResult<Vec<Route>> {
        self.list("list_routes", |d| &d.routes)
    }

    async fn get_route(&self, route_id: &str) -> ApiResult<Route> {
        self.record(format!("get_route {}", route_id));
        let data = self.data.lock().unwrap();
        data.routes
            .iter()
            .find(|r| r.id == route_id)
            .cloned()
            .ok_or_else(|| not_found("Route", route_id))
    }

    async fn create_route(&self, input: &RouteInput) -> ApiResult<Route> {
        self.record(format!("create_route {}", input.code));
        let mut data = self.data.lock().unwrap();
        let id = data.fresh_id("route");
        let created = Route {
            id,
            code: input.code.clone(),
            description: input.description.clone(),
            path: input.path.clone(),
            period_start: input.period_start.clone(),
            period_end: input.period_end.clone(),
        };
        data.routes.push(created.clone());
        Ok(created)
    }

    async fn update_route(&self, route_id: &str, input: &RouteInput) -> ApiResult<Route> {
        self.record(format!("update_route {}", route_id));
        let mut data = self.data.lock().unwrap();
        Self::check_failing(&data, route_id)?;
        let existing = data
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or_else(|| not_found("Route", route_id))?;
        existing.code = input.code.clone();
        existing.description = input.description.clone();
        existing.path = input.path.clone();
        existing.period_start = input.period_start.clone();
        existing.period_end = input.period_end.clone();
        Ok(existing.clone())
    }
}

pub fn request_types() -> Vec<RequestType> {
    [
        ("t-leave", "Xin nghỉ học (Leave)"),
        ("t-pickup", "Đổi điểm đón (Pickup change)"),
        ("t-other", "Khác (Other)"),
    ]
    .into_iter()
    .map(|(id, name)| RequestType {
        request_type_id: id.to_string(),
        request_type_name: name.to_string(),
    })
    .collect()
}

pub fn request(id: &str, type_id: &str, status: RequestStatus) -> Request {
    Request {
        request_id: id.to_string(),
        request_type_id: type_id.to_string(),
        send_by_user_id: "parent-1".to_string(),
        student_id: Some("stu-1".to_string()),
        student_name: Some("Nguyễn Văn An".to_string()),
        checkpoint_id: Some("cp-2".to_string()),
        checkpoint_name: None,
        from_date: None,
        to_date: None,
        reason: "Gia đình chuyển nhà".to_string(),
        reply: match status {
            RequestStatus::Approved | RequestStatus::Rejected => Some("OK".to_string()),
            _ => None,
        },
        status,
        created_at: Some("2024-09-02T07:00:00Z".to_string()),
    }
}

pub fn student(id: &str, name: &str) -> Student {
    Student {
        id: id.to_string(),
        roll_number: format!("HS-{}", id),
        name: name.to_string(),
        dob: "2015-04-12".to_string(),
        address: "12 Láng Hạ".to_string(),
        gender: Gender::Male,
        status: EntityStatus::Active,
        parent_id: Some("parent-1".to_string()),
        parent: None,
        bus_id: None,
        bus_name: None,
        checkpoint_id: Some("cp-1".to_string()),
        checkpoint_name: None,
    }
}

pub fn bus(id: &str, name: &str, max_capacity: u32) -> Bus {
    Bus {
        id: id.to_string(),
        license_plate: format!("29B-{}", id),
        name: name.to_string(),
        driver_id: None,
        driver_name: None,
        assistant_id: None,
        assistant_name: None,
        route_id: None,
        max_capacity,
        registered_count: 0,
        bus_status: BusStatus::Active,
    }
}

pub fn checkpoint(id: &str, name: &str, lat: f64, lng: f64) -> Checkpoint {
    Checkpoint {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        latitude: lat.to_string(),
        longitude: lng.to_string(),
        status: EntityStatus::Active,
        created_at: None,
        updated_at: None,
    }
}

pub fn parent(id: &str, full_name: &str) -> User {
    User {
        id: id.to_string(),
        username: id.to_string(),
        full_name: full_name.to_string(),
        email: None,
        phone: Some("0912345678".to_string()),
        address: None,
        role: UserRole::Parent,
        status: EntityStatus::Active,
    }
}
