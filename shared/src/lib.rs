use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod envelope;
pub mod route_path;
pub mod taxonomy;

pub use envelope::EnvelopeError;
pub use route_path::RoutePath;
pub use taxonomy::{RequestCategory, RequestTaxonomy};

/// Lifecycle of a parent-submitted request.
///
/// `Pending` is the only non-terminal state; every other state is reached
/// exactly once and never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Read,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }

    /// Whether a request in this state may move to `next`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Pending, RequestStatus::Read)
        )
    }

    /// Statuses that must carry an admin reply
    pub fn requires_reply(self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "PENDING"),
            RequestStatus::Approved => write!(f, "APPROVED"),
            RequestStatus::Rejected => write!(f, "REJECTED"),
            RequestStatus::Read => write!(f, "READ"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "READ" => Ok(RequestStatus::Read),
            other => Err(format!("Unknown request status: {}", other)),
        }
    }
}

/// One entry of the backend's request-type taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestType {
    pub request_type_id: String,
    pub request_type_name: String,
}

/// Leave, pickup-change or free-form request sent by a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: String,
    /// Discriminant resolved through a [`RequestTaxonomy`]; unknown values are reports
    pub request_type_id: String,
    pub send_by_user_id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    /// Requested new pickup point (pickup-change requests only)
    #[serde(default)]
    pub checkpoint_id: Option<String>,
    #[serde(default)]
    pub checkpoint_name: Option<String>,
    /// First day of absence (leave requests only), `YYYY-MM-DD`
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub reply: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Request {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// `reply` is present exactly when the status demands one.
    pub fn reply_is_consistent(&self) -> bool {
        let has_reply = self
            .reply
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false);
        has_reply == self.status.requires_reply()
    }
}

/// Body of the reply endpoint used for approve, reject and mark-as-read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub request_id: String,
    pub reply: Option<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessChangeCheckpointRequest {
    pub request_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Parent,
    Driver,
    Assistant,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Parent => write!(f, "PARENT"),
            UserRole::Driver => write!(f, "DRIVER"),
            UserRole::Assistant => write!(f, "ASSISTANT"),
        }
    }
}

/// Account holder: parents, drivers, bus assistants and admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub status: EntityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    /// Human-facing student code
    pub roll_number: String,
    pub name: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,
    #[serde(default)]
    pub address: String,
    pub gender: Gender,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent: Option<User>,
    #[serde(default)]
    pub bus_id: Option<String>,
    #[serde(default)]
    pub bus_name: Option<String>,
    #[serde(default)]
    pub checkpoint_id: Option<String>,
    #[serde(default)]
    pub checkpoint_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub roll_number: String,
    pub name: String,
    pub dob: String,
    pub address: String,
    pub gender: Gender,
    pub status: EntityStatus,
    pub parent_id: Option<String>,
}

/// Body of the student assignment endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStudentRequest {
    pub bus_id: Option<String>,
    pub checkpoint_id: Option<String>,
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Bus stop; coordinates travel as decimal strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Checkpoint {
    /// Parsed position, `None` when either coordinate is not a number
    pub fn coordinates(&self) -> Option<LatLng> {
        let lat = self.latitude.trim().parse::<f64>().ok()?;
        let lng = self.longitude.trim().parse::<f64>().ok()?;
        Some(LatLng::new(lat, lng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointInput {
    pub name: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    pub status: EntityStatus,
}

impl CheckpointInput {
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Self {
        Self {
            name: checkpoint.name.clone(),
            description: checkpoint.description.clone(),
            latitude: checkpoint.latitude.clone(),
            longitude: checkpoint.longitude.clone(),
            status: checkpoint.status,
        }
    }

    /// Replace the coordinates with `position`, formatted the way the backend stores them
    pub fn with_position(mut self, position: LatLng) -> Self {
        self.latitude = format_coordinate(position.lat);
        self.longitude = format_coordinate(position.lng);
        self
    }
}

/// Coordinates are stored with seven decimals (about 1 cm)
pub fn format_coordinate(value: f64) -> String {
    format!("{:.7}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: String,
    pub license_plate: String,
    pub name: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub assistant_name: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub max_capacity: u32,
    /// Derived on the client; not authoritative
    #[serde(default)]
    pub registered_count: u32,
    #[serde(default)]
    pub bus_status: BusStatus,
}

impl Bus {
    pub fn seats_left(&self) -> u32 {
        self.max_capacity.saturating_sub(self.registered_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusInput {
    pub license_plate: String,
    pub name: String,
    pub driver_id: Option<String>,
    pub assistant_id: Option<String>,
    pub route_id: Option<String>,
    pub max_capacity: u32,
    pub bus_status: BusStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    /// Space-separated checkpoint IDs in travel order, see [`RoutePath`]
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
}

impl Route {
    pub fn checkpoint_path(&self) -> RoutePath {
        RoutePath::parse(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInput {
    pub code: String,
    pub description: String,
    pub path: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

/// Error body returned by the backend for non-2xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Parse the calendar day out of `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(status: RequestStatus, reply: Option<&str>) -> Request {
        Request {
            request_id: "req-1".to_string(),
            request_type_id: "type-leave".to_string(),
            send_by_user_id: "parent-1".to_string(),
            student_id: Some("stu-1".to_string()),
            student_name: Some("Nguyễn Văn An".to_string()),
            checkpoint_id: None,
            checkpoint_name: None,
            from_date: Some("2024-09-02".to_string()),
            to_date: Some("2024-09-03".to_string()),
            reason: "Ốm".to_string(),
            reply: reply.map(str::to_string),
            status,
            created_at: None,
        }
    }

    #[test]
    fn test_status_transitions_are_one_way() {
        let all = [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Read,
        ];

        for from in all {
            for to in all {
                let allowed = from.can_transition_to(to);
                if from.is_terminal() {
                    assert!(!allowed, "{} -> {} must be refused", from, to);
                }
                if to == RequestStatus::Pending {
                    assert!(!allowed, "nothing may return to PENDING");
                }
            }
        }
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Read));
    }

    #[test]
    fn test_reply_consistency() {
        assert!(sample_request(RequestStatus::Pending, None).reply_is_consistent());
        assert!(sample_request(RequestStatus::Approved, Some("OK")).reply_is_consistent());
        assert!(sample_request(RequestStatus::Rejected, Some("Không")).reply_is_consistent());
        assert!(sample_request(RequestStatus::Read, None).reply_is_consistent());

        assert!(!sample_request(RequestStatus::Pending, Some("early")).reply_is_consistent());
        assert!(!sample_request(RequestStatus::Approved, None).reply_is_consistent());
        assert!(!sample_request(RequestStatus::Approved, Some("   ")).reply_is_consistent());
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::json!({
            "requestId": "r-9",
            "requestTypeId": "t-1",
            "sendByUserId": "u-1",
            "reason": "Đổi điểm đón",
            "checkpointId": "cp-4",
            "status": "PENDING"
        });

        let request: Request = serde_json::from_value(json).unwrap();
        assert_eq!(request.request_id, "r-9");
        assert_eq!(request.checkpoint_id.as_deref(), Some("cp-4"));
        assert_eq!(request.reply, None);
        assert!(request.is_pending());

        let reply = ReplyRequest {
            request_id: "r-9".to_string(),
            reply: Some("Đã xác nhận".to_string()),
            status: RequestStatus::Approved,
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"requestId": "r-9", "reply": "Đã xác nhận", "status": "APPROVED"})
        );
    }

    #[test]
    fn test_checkpoint_coordinates() {
        let mut checkpoint = Checkpoint {
            id: "cp-1".to_string(),
            name: "Cổng trường".to_string(),
            description: String::new(),
            latitude: "21.0285".to_string(),
            longitude: " 105.8542 ".to_string(),
            status: EntityStatus::Active,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(checkpoint.coordinates(), Some(LatLng::new(21.0285, 105.8542)));

        checkpoint.latitude = "north".to_string();
        assert_eq!(checkpoint.coordinates(), None);

        let input = CheckpointInput::from_checkpoint(&checkpoint).with_position(LatLng::new(10.5, -20.25));
        assert_eq!(input.latitude, "10.5000000");
        assert_eq!(input.longitude, "-20.2500000");
    }

    #[test]
    fn test_parse_day() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(parse_day("2024-09-02"), Some(day));
        assert_eq!(parse_day("2024-09-02T07:30:00+07:00"), Some(day));
        assert_eq!(parse_day(" 2024-09-02 "), Some(day));
        assert_eq!(parse_day("02/09/2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_bus_seats_left() {
        let bus = Bus {
            id: "b-1".to_string(),
            license_plate: "29B-123.45".to_string(),
            name: "Xe 01".to_string(),
            driver_id: None,
            driver_name: None,
            assistant_id: None,
            assistant_name: None,
            route_id: None,
            max_capacity: 30,
            registered_count: 32,
            bus_status: BusStatus::Active,
        };
        assert_eq!(bus.seats_left(), 0);
    }
}
