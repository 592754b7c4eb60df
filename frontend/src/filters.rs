//! # List Filters
//!
//! Pure projections over an already-fetched list: free-text search, exact-day
//! date match, status narrowing and the request buckets.
//!
//! ## Responsibilities:
//! - Case-insensitive search against each entity's name-or-id fallback chain
//! - Date match against the primary date, falling back to the secondary one
//! - Partitioning requests into Leave / Pickup / Other / Report
//!
//! Nothing here touches the network; every function returns a subsequence of
//! its input in the original order.

use chrono::NaiveDate;
use shared::{
    parse_day, Bus, Checkpoint, Request, RequestCategory, RequestStatus, RequestTaxonomy, Route,
    Student, User,
};

/// Fields a list can be searched and date-filtered on
pub trait Searchable {
    /// Text matched by the search box: the first non-empty key wins
    fn search_key(&self) -> &str;

    /// Day matched by the date picker, if the record has one
    fn date_key(&self) -> Option<NaiveDate> {
        None
    }
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> &'a str {
    candidates
        .iter()
        .copied()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

fn first_day(candidates: &[Option<&str>]) -> Option<NaiveDate> {
    candidates
        .iter()
        .copied()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .and_then(parse_day)
}

impl Searchable for Request {
    fn search_key(&self) -> &str {
        first_non_empty(&[
            self.student_name.as_deref(),
            self.student_id.as_deref(),
            Some(self.request_id.as_str()),
        ])
    }

    fn date_key(&self) -> Option<NaiveDate> {
        first_day(&[self.from_date.as_deref(), self.created_at.as_deref()])
    }
}

impl Searchable for Student {
    fn search_key(&self) -> &str {
        first_non_empty(&[
            Some(self.name.as_str()),
            Some(self.roll_number.as_str()),
            Some(self.id.as_str()),
        ])
    }

    fn date_key(&self) -> Option<NaiveDate> {
        parse_day(&self.dob)
    }
}

impl Searchable for Checkpoint {
    fn search_key(&self) -> &str {
        first_non_empty(&[Some(self.name.as_str()), Some(self.id.as_str())])
    }

    fn date_key(&self) -> Option<NaiveDate> {
        first_day(&[self.created_at.as_deref(), self.updated_at.as_deref()])
    }
}

impl Searchable for Bus {
    fn search_key(&self) -> &str {
        first_non_empty(&[
            Some(self.name.as_str()),
            Some(self.license_plate.as_str()),
            Some(self.id.as_str()),
        ])
    }
}

impl Searchable for Route {
    fn search_key(&self) -> &str {
        first_non_empty(&[Some(self.code.as_str()), Some(self.id.as_str())])
    }

    fn date_key(&self) -> Option<NaiveDate> {
        first_day(&[self.period_start.as_deref(), self.period_end.as_deref()])
    }
}

impl Searchable for User {
    fn search_key(&self) -> &str {
        first_non_empty(&[
            Some(self.full_name.as_str()),
            Some(self.username.as_str()),
            Some(self.id.as_str()),
        ])
    }
}

/// Predicates chosen in the UI. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub search: String,
    pub date: Option<NaiveDate>,
}

impl ListFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.date.is_none()
    }

    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !record.search_key().to_lowercase().contains(&needle) {
            return false;
        }
        match self.date {
            Some(day) => record.date_key() == Some(day),
            None => true,
        }
    }
}

/// Order-preserving subsequence of `records` accepted by `filter`
pub fn filter_records<'a, T: Searchable>(records: &'a [T], filter: &ListFilter) -> Vec<&'a T> {
    records.iter().filter(|r| filter.matches(*r)).collect()
}

/// Requests additionally narrowed by status
pub fn filter_requests<'a>(
    requests: &'a [Request],
    filter: &ListFilter,
    status: Option<RequestStatus>,
) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .filter(|r| filter.matches(*r))
        .collect()
}

/// The four request tabs; every request lands in exactly one
#[derive(Debug, Default, PartialEq)]
pub struct RequestBuckets<'a> {
    pub leave: Vec<&'a Request>,
    pub pickup: Vec<&'a Request>,
    pub other: Vec<&'a Request>,
    pub report: Vec<&'a Request>,
}

impl<'a> RequestBuckets<'a> {
    pub fn get(&self, category: RequestCategory) -> &[&'a Request] {
        match category {
            RequestCategory::Leave => &self.leave,
            RequestCategory::Pickup => &self.pickup,
            RequestCategory::Other => &self.other,
            RequestCategory::Report => &self.report,
        }
    }

    pub fn total(&self) -> usize {
        self.leave.len() + self.pickup.len() + self.other.len() + self.report.len()
    }
}

pub fn bucket_requests<'a, I>(requests: I, taxonomy: &RequestTaxonomy) -> RequestBuckets<'a>
where
    I: IntoIterator<Item = &'a Request>,
{
    let mut buckets = RequestBuckets::default();
    for request in requests {
        match taxonomy.classify(&request.request_type_id) {
            RequestCategory::Leave => buckets.leave.push(request),
            RequestCategory::Pickup => buckets.pickup.push(request),
            RequestCategory::Other => buckets.other.push(request),
            RequestCategory::Report => buckets.report.push(request),
        }
    }
    buckets
}

/// Pickup-change requests still waiting for a decision
pub fn pending_pickups<'a>(requests: &'a [Request], taxonomy: &RequestTaxonomy) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.is_pending())
        .filter(|r| taxonomy.classify(&r.request_type_id) == RequestCategory::Pickup)
        .collect()
}
