//! # Store Module
//!
//! In-memory records behind the mock API, with the same business rules the
//! real backend enforces.
//!
//! ## Responsibilities:
//! - Hold request types, requests, students, users, buses, checkpoints and routes
//! - Apply reply transitions (PENDING to APPROVED, REJECTED or READ, once)
//! - Apply pickup-change requests to the student's checkpoint
//! - Keep denormalised names (bus, checkpoint, parent) in step on writes

use chrono::Utc;
use shared::{
    AssignStudentRequest, Bus, BusInput, Checkpoint, CheckpointInput, ReplyRequest, Request,
    RequestStatus, RequestType, Route, RouteInput, Student, StudentInput, User, UserInput,
    UserRole,
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Reply text stored when a pickup change is applied automatically
pub const AUTO_PROCESS_REPLY: &str = "Pickup point updated automatically";

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Invalid(String),

    #[error("{0} is temporarily unavailable")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockStore {
    pub request_types: Vec<RequestType>,
    pub requests: Vec<Request>,
    pub students: Vec<Student>,
    pub users: Vec<User>,
    pub buses: Vec<Bus>,
    pub checkpoints: Vec<Checkpoint>,
    pub routes: Vec<Route>,
    /// Record IDs whose writes fail with a server error
    pub unavailable: HashSet<String>,
    /// Every list endpoint fails while set
    pub lists_unavailable: bool,
}

impl MockStore {
    /// Make writes to `id` fail until cleared
    pub fn make_unavailable(&mut self, id: &str) {
        self.unavailable.insert(id.to_string());
    }

    fn ensure_available(&self, id: &str) -> StoreResult<()> {
        if self.unavailable.contains(id) {
            return Err(StoreError::Unavailable(id.to_string()));
        }
        Ok(())
    }

    pub fn ensure_lists_available(&self) -> StoreResult<()> {
        if self.lists_unavailable {
            return Err(StoreError::Unavailable("The list".to_string()));
        }
        Ok(())
    }

    fn fresh_id(prefix: &str) -> String {
        format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
    }

    // ---- requests ----

    pub fn request(&self, id: &str) -> StoreResult<Request> {
        self.requests
            .iter()
            .find(|r| r.request_id == id)
            .cloned()
            .ok_or_else(|| not_found("Request", id))
    }

    fn request_mut(&mut self, id: &str) -> StoreResult<&mut Request> {
        self.requests
            .iter_mut()
            .find(|r| r.request_id == id)
            .ok_or_else(|| not_found("Request", id))
    }

    pub fn reply(&mut self, body: &ReplyRequest) -> StoreResult<Request> {
        self.ensure_available(&body.request_id)?;
        let request = self.request_mut(&body.request_id)?;
        if !request.status.can_transition_to(body.status) {
            return Err(StoreError::Invalid(format!(
                "Request {} is {} and cannot become {}",
                request.request_id, request.status, body.status
            )));
        }
        let reply = body
            .reply
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        if body.status.requires_reply() && reply.is_none() {
            return Err(StoreError::Invalid(format!(
                "A reply is required to mark a request {}",
                body.status
            )));
        }

        request.status = body.status;
        request.reply = if body.status.requires_reply() { reply } else { None };
        info!("Request {} is now {}", request.request_id, request.status);
        Ok(request.clone())
    }

    /// Move the student to the requested checkpoint and approve the request
    pub fn process_change_checkpoint(&mut self, request_id: &str) -> StoreResult<Request> {
        self.ensure_available(request_id)?;
        let request = self.request(request_id)?;
        if !request.is_pending() {
            return Err(StoreError::Invalid(format!(
                "Request {} was already handled",
                request_id
            )));
        }
        let checkpoint_id = request.checkpoint_id.clone().ok_or_else(|| {
            StoreError::Invalid(format!("Request {} names no checkpoint", request_id))
        })?;
        let checkpoint_name = self.checkpoint(&checkpoint_id)?.name;
        let student_id = request.student_id.clone().ok_or_else(|| {
            StoreError::Invalid(format!("Request {} names no student", request_id))
        })?;

        let student = self.student_mut(&student_id)?;
        student.checkpoint_id = Some(checkpoint_id);
        student.checkpoint_name = Some(checkpoint_name);

        let request = self.request_mut(request_id)?;
        request.status = RequestStatus::Approved;
        request.reply = Some(AUTO_PROCESS_REPLY.to_string());
        info!("Pickup change {} applied to student {}", request_id, student_id);
        Ok(request.clone())
    }

    // ---- students ----

    pub fn student(&self, id: &str) -> StoreResult<Student> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found("Student", id))
    }

    fn student_mut(&mut self, id: &str) -> StoreResult<&mut Student> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Student", id))
    }

    pub fn create_student(&mut self, input: &StudentInput) -> StoreResult<Student> {
        if self.students.iter().any(|s| s.roll_number == input.roll_number) {
            return Err(StoreError::Invalid(format!(
                "Roll number {} is already taken",
                input.roll_number
            )));
        }
        let parent = self.parent_of(input.parent_id.as_deref())?;
        let student = Student {
            id: Self::fresh_id("stu"),
            roll_number: input.roll_number.clone(),
            name: input.name.clone(),
            dob: input.dob.clone(),
            address: input.address.clone(),
            gender: input.gender,
            status: input.status,
            parent_id: input.parent_id.clone(),
            parent,
            bus_id: None,
            bus_name: None,
            checkpoint_id: None,
            checkpoint_name: None,
        };
        self.students.push(student.clone());
        Ok(student)
    }

    pub fn update_student(&mut self, id: &str, input: &StudentInput) -> StoreResult<Student> {
        self.ensure_available(id)?;
        let parent = self.parent_of(input.parent_id.as_deref())?;
        let student = self.student_mut(id)?;
        student.roll_number = input.roll_number.clone();
        student.name = input.name.clone();
        student.dob = input.dob.clone();
        student.address = input.address.clone();
        student.gender = input.gender;
        student.status = input.status;
        student.parent_id = input.parent_id.clone();
        student.parent = parent;
        Ok(student.clone())
    }

    pub fn assign_student(&mut self, id: &str, body: &AssignStudentRequest) -> StoreResult<Student> {
        self.ensure_available(id)?;
        let bus_name = match body.bus_id.as_deref() {
            Some(bus_id) => Some(self.bus(bus_id)?.name),
            None => None,
        };
        let checkpoint_name = match body.checkpoint_id.as_deref() {
            Some(checkpoint_id) => Some(self.checkpoint(checkpoint_id)?.name),
            None => None,
        };
        let student = self.student_mut(id)?;
        student.bus_id = body.bus_id.clone();
        student.bus_name = bus_name;
        student.checkpoint_id = body.checkpoint_id.clone();
        student.checkpoint_name = checkpoint_name;
        Ok(student.clone())
    }

    fn parent_of(&self, parent_id: Option<&str>) -> StoreResult<Option<User>> {
        parent_id.map(|id| self.user(id)).transpose()
    }

    // ---- users ----

    pub fn users(&self, role: Option<UserRole>) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect()
    }

    pub fn user(&self, id: &str) -> StoreResult<User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("User", id))
    }

    pub fn create_user(&mut self, input: &UserInput) -> StoreResult<User> {
        if self.users.iter().any(|u| u.username == input.username) {
            return Err(StoreError::Invalid(format!(
                "Username {} is already taken",
                input.username
            )));
        }
        let user = User {
            id: Self::fresh_id("user"),
            username: input.username.clone(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            role: input.role,
            status: input.status,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, id: &str, input: &UserInput) -> StoreResult<User> {
        self.ensure_available(id)?;
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))?;
        user.full_name = input.full_name.clone();
        user.email = input.email.clone();
        user.phone = input.phone.clone();
        user.address = input.address.clone();
        user.role = input.role;
        user.status = input.status;
        Ok(user.clone())
    }

    fn user_name(&self, id: Option<&str>) -> Option<String> {
        id.and_then(|id| self.users.iter().find(|u| u.id == id))
            .map(|u| u.full_name.clone())
    }

    // ---- buses ----

    pub fn bus(&self, id: &str) -> StoreResult<Bus> {
        self.buses
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| not_found("Bus", id))
    }

    pub fn create_bus(&mut self, input: &BusInput) -> StoreResult<Bus> {
        let bus = Bus {
            id: Self::fresh_id("bus"),
            license_plate: input.license_plate.clone(),
            name: input.name.clone(),
            driver_id: input.driver_id.clone(),
            driver_name: self.user_name(input.driver_id.as_deref()),
            assistant_id: input.assistant_id.clone(),
            assistant_name: self.user_name(input.assistant_id.as_deref()),
            route_id: input.route_id.clone(),
            max_capacity: input.max_capacity,
            registered_count: 0,
            bus_status: input.bus_status,
        };
        self.buses.push(bus.clone());
        Ok(bus)
    }

    pub fn update_bus(&mut self, id: &str, input: &BusInput) -> StoreResult<Bus> {
        self.ensure_available(id)?;
        let driver_name = self.user_name(input.driver_id.as_deref());
        let assistant_name = self.user_name(input.assistant_id.as_deref());
        let bus = self
            .buses
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found("Bus", id))?;
        bus.license_plate = input.license_plate.clone();
        bus.name = input.name.clone();
        bus.driver_id = input.driver_id.clone();
        bus.driver_name = driver_name;
        bus.assistant_id = input.assistant_id.clone();
        bus.assistant_name = assistant_name;
        bus.route_id = input.route_id.clone();
        bus.max_capacity = input.max_capacity;
        bus.bus_status = input.bus_status;
        let updated = bus.clone();

        for student in self.students.iter_mut().filter(|s| s.bus_id.as_deref() == Some(id)) {
            student.bus_name = Some(updated.name.clone());
        }
        Ok(updated)
    }

    // ---- checkpoints ----

    pub fn checkpoint(&self, id: &str) -> StoreResult<Checkpoint> {
        self.checkpoints
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Checkpoint", id))
    }

    pub fn create_checkpoint(&mut self, input: &CheckpointInput) -> StoreResult<Checkpoint> {
        let now = Utc::now().to_rfc3339();
        let checkpoint = Checkpoint {
            id: Self::fresh_id("cp"),
            name: input.name.clone(),
            description: input.description.clone(),
            latitude: input.latitude.clone(),
            longitude: input.longitude.clone(),
            status: input.status,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        self.checkpoints.push(checkpoint.clone());
        Ok(checkpoint)
    }

    pub fn update_checkpoint(&mut self, id: &str, input: &CheckpointInput) -> StoreResult<Checkpoint> {
        self.ensure_available(id)?;
        let checkpoint = self
            .checkpoints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Checkpoint", id))?;
        checkpoint.name = input.name.clone();
        checkpoint.description = input.description.clone();
        checkpoint.latitude = input.latitude.clone();
        checkpoint.longitude = input.longitude.clone();
        checkpoint.status = input.status;
        checkpoint.updated_at = Some(Utc::now().to_rfc3339());
        let updated = checkpoint.clone();

        for student in self
            .students
            .iter_mut()
            .filter(|s| s.checkpoint_id.as_deref() == Some(id))
        {
            student.checkpoint_name = Some(updated.name.clone());
        }
        Ok(updated)
    }

    // ---- routes ----

    pub fn route(&self, id: &str) -> StoreResult<Route> {
        self.routes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("Route", id))
    }

    pub fn create_route(&mut self, input: &RouteInput) -> StoreResult<Route> {
        let route = Route {
            id: Self::fresh_id("route"),
            code: input.code.clone(),
            description: input.description.clone(),
            path: input.path.clone(),
            period_start: input.period_start.clone(),
            period_end: input.period_end.clone(),
        };
        self.routes.push(route.clone());
        Ok(route)
    }

    pub fn update_route(&mut self, id: &str, input: &RouteInput) -> StoreResult<Route> {
        self.ensure_available(id)?;
        let route = self
            .routes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Route", id))?;
        route.code = input.code.clone();
        route.description = input.description.clone();
        route.path = input.path.clone();
        route.period_start = input.period_start.clone();
        route.period_end = input.period_end.clone();
        Ok(route.clone())
    }
}
