//! Request classification.
//!
//! The backend publishes its request types with opaque IDs. A
//! [`RequestTaxonomy`] is resolved once from that list (or from configured
//! IDs) and handed to whatever needs to classify requests.

use crate::RequestType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket a request is shown in. `Report` is the catch-all for any type ID
/// the taxonomy does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestCategory {
    Leave,
    Pickup,
    Other,
    Report,
}

impl RequestCategory {
    pub const ALL: [RequestCategory; 4] = [
        RequestCategory::Leave,
        RequestCategory::Pickup,
        RequestCategory::Other,
        RequestCategory::Report,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RequestCategory::Leave => "Leave",
            RequestCategory::Pickup => "Pickup change",
            RequestCategory::Other => "Other",
            RequestCategory::Report => "Report",
        }
    }
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RequestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leave" => Ok(RequestCategory::Leave),
            "pickup" => Ok(RequestCategory::Pickup),
            "other" => Ok(RequestCategory::Other),
            "report" => Ok(RequestCategory::Report),
            other => Err(format!("Unknown request category: {}", other)),
        }
    }
}

/// The three known request-type IDs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTaxonomy {
    pub leave_type_id: Option<String>,
    pub pickup_type_id: Option<String>,
    pub other_type_id: Option<String>,
}

const PICKUP_MARKERS: [&str; 4] = ["pickup", "pick-up", "checkpoint", "điểm đón"];
const LEAVE_MARKERS: [&str; 3] = ["leave", "absence", "nghỉ"];
const OTHER_MARKERS: [&str; 2] = ["other", "khác"];

impl RequestTaxonomy {
    pub fn new(
        leave_type_id: impl Into<String>,
        pickup_type_id: impl Into<String>,
        other_type_id: impl Into<String>,
    ) -> Self {
        Self {
            leave_type_id: Some(leave_type_id.into()),
            pickup_type_id: Some(pickup_type_id.into()),
            other_type_id: Some(other_type_id.into()),
        }
    }

    /// Resolve the known slots by type name. The first type whose name matches
    /// a slot takes it; unmatched types stay unknown and classify as reports.
    pub fn from_request_types(types: &[RequestType]) -> Self {
        let mut taxonomy = Self::default();
        for request_type in types {
            let name = request_type.request_type_name.to_lowercase();
            let slot = if PICKUP_MARKERS.iter().any(|m| name.contains(m)) {
                &mut taxonomy.pickup_type_id
            } else if LEAVE_MARKERS.iter().any(|m| name.contains(m)) {
                &mut taxonomy.leave_type_id
            } else if OTHER_MARKERS.iter().any(|m| name.contains(m)) {
                &mut taxonomy.other_type_id
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(request_type.request_type_id.clone());
            }
        }
        taxonomy
    }

    /// Overlay explicitly configured IDs on top of this taxonomy
    pub fn with_overrides(mut self, overrides: &RequestTaxonomy) -> Self {
        if overrides.leave_type_id.is_some() {
            self.leave_type_id = overrides.leave_type_id.clone();
        }
        if overrides.pickup_type_id.is_some() {
            self.pickup_type_id = overrides.pickup_type_id.clone();
        }
        if overrides.other_type_id.is_some() {
            self.other_type_id = overrides.other_type_id.clone();
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.leave_type_id.is_some() && self.pickup_type_id.is_some() && self.other_type_id.is_some()
    }

    pub fn classify(&self, request_type_id: &str) -> RequestCategory {
        let matches = |slot: &Option<String>| slot.as_deref() == Some(request_type_id);
        if matches(&self.leave_type_id) {
            RequestCategory::Leave
        } else if matches(&self.pickup_type_id) {
            RequestCategory::Pickup
        } else if matches(&self.other_type_id) {
            RequestCategory::Other
        } else {
            RequestCategory::Report
        }
    }

    /// Type ID of a known category; `Report` has none
    pub fn type_id(&self, category: RequestCategory) -> Option<&str> {
        match category {
            RequestCategory::Leave => self.leave_type_id.as_deref(),
            RequestCategory::Pickup => self.pickup_type_id.as_deref(),
            RequestCategory::Other => self.other_type_id.as_deref(),
            RequestCategory::Report => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_type(id: &str, name: &str) -> RequestType {
        RequestType {
            request_type_id: id.to_string(),
            request_type_name: name.to_string(),
        }
    }

    #[test]
    fn test_resolve_from_vietnamese_names() {
        let types = vec![
            request_type("t-leave", "Đơn xin nghỉ học"),
            request_type("t-pickup", "Đơn đổi điểm đón"),
            request_type("t-other", "Đơn khác"),
            request_type("t-misc", "Phản ánh"),
        ];
        let taxonomy = RequestTaxonomy::from_request_types(&types);

        assert!(taxonomy.is_complete());
        assert_eq!(taxonomy.classify("t-leave"), RequestCategory::Leave);
        assert_eq!(taxonomy.classify("t-pickup"), RequestCategory::Pickup);
        assert_eq!(taxonomy.classify("t-other"), RequestCategory::Other);
        assert_eq!(taxonomy.classify("t-misc"), RequestCategory::Report);
    }

    #[test]
    fn test_first_match_wins() {
        let types = vec![
            request_type("a", "Leave request"),
            request_type("b", "Extended leave"),
        ];
        let taxonomy = RequestTaxonomy::from_request_types(&types);
        assert_eq!(taxonomy.leave_type_id.as_deref(), Some("a"));
        assert_eq!(taxonomy.classify("b"), RequestCategory::Report);
        assert!(!taxonomy.is_complete());
    }

    #[test]
    fn test_unknown_ids_are_reports() {
        let taxonomy = RequestTaxonomy::new("l", "p", "o");
        assert_eq!(taxonomy.classify(""), RequestCategory::Report);
        assert_eq!(taxonomy.classify("P"), RequestCategory::Report);
        assert_eq!(RequestTaxonomy::default().classify("l"), RequestCategory::Report);
    }

    #[test]
    fn test_overrides_replace_only_set_slots() {
        let resolved = RequestTaxonomy::new("l", "p", "o");
        let overrides = RequestTaxonomy {
            pickup_type_id: Some("p2".to_string()),
            ..Default::default()
        };
        let merged = resolved.with_overrides(&overrides);
        assert_eq!(merged.type_id(RequestCategory::Leave), Some("l"));
        assert_eq!(merged.type_id(RequestCategory::Pickup), Some("p2"));
        assert_eq!(merged.type_id(RequestCategory::Report), None);
    }
}
