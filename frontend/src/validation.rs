//! Client-side form validation.
//!
//! Runs before any create/update call; a form that fails here never reaches
//! the network.

use chrono::{Local, NaiveDate};
use shared::{BusInput, CheckpointInput, RouteInput, RoutePath, StudentInput, UserInput};
use thiserror::Error;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid form: {}", render(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        }
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(field, format!("must be at most {} characters", max));
        }
    }

    fn day(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        let day = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok();
        if day.is_none() {
            self.fail(field, "must be a date in YYYY-MM-DD format");
        }
        day
    }

    fn coordinate(&mut self, field: &'static str, value: &str, limit: f64) {
        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && (-limit..=limit).contains(&v) => {}
            Ok(_) => self.fail(field, format!("must be between -{} and {}", limit, limit)),
            Err(_) => self.fail(field, "must be a decimal number"),
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for StudentInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_student_on(self, Local::now().date_naive())
    }
}

/// Student rules with an explicit "today" for the date-of-birth check
pub fn validate_student_on(input: &StudentInput, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut check = Checker::default();
    check.required("rollNumber", &input.roll_number);
    check.required("name", &input.name);
    check.max_len("name", &input.name, 100);
    check.required("address", &input.address);
    if let Some(dob) = check.day("dob", &input.dob) {
        if dob > today {
            check.fail("dob", "cannot be in the future");
        }
    }
    check.finish()
}

impl Validate for UserInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("username", &self.username);
        check.required("fullName", &self.full_name);
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            let valid = email
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                check.fail("email", "is not a valid email address");
            }
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            let digits = phone.trim();
            if !(9..=11).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
                check.fail("phone", "must be 9 to 11 digits");
            }
        }
        check.finish()
    }
}

impl Validate for BusInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("licensePlate", &self.license_plate);
        check.required("name", &self.name);
        if self.max_capacity == 0 {
            check.fail("maxCapacity", "must be greater than zero");
        }
        if self.driver_id.is_some() && self.driver_id == self.assistant_id {
            check.fail("assistantId", "cannot be the same person as the driver");
        }
        check.finish()
    }
}

impl Validate for CheckpointInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("name", &self.name);
        check.max_len("description", &self.description, 500);
        check.coordinate("latitude", &self.latitude, 90.0);
        check.coordinate("longitude", &self.longitude, 180.0);
        check.finish()
    }
}

impl Validate for RouteInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::default();
        check.required("code", &self.code);
        if RoutePath::parse(&self.path).distinct_len() < 2 {
            check.fail("path", "must contain at least two different checkpoints");
        }
        let start = self.period_start.as_deref().map(|s| check.day("periodStart", s));
        let end = self.period_end.as_deref().map(|s| check.day("periodEnd", s));
        if let (Some(Some(start)), Some(Some(end))) = (start, end) {
            if start >= end {
                check.fail("periodEnd", "must be after the period start");
            }
        }
        check.finish()
    }
}

/// Approve and reject both need a non-blank reply
pub fn validate_reply(reply: &str) -> Result<(), ValidationErrors> {
    let mut check = Checker::default();
    check.required("reply", reply);
    check.max_len("reply", reply, 1000);
    check.finish()
}
