//! Error types for the administration client.
//!
//! The three failure classes of the client map onto these types:
//! network/API failures ([`ApiError`]), client-side validation
//! ([`ValidationErrors`]) and workflow misuse ([`WorkflowError`]).
//! [`AdminError`] is the umbrella returned by controllers.

use shared::EnvelopeError;
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Refusals from the review workflow, raised before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Another action is still being processed")]
    Busy,

    #[error("No request is open for review")]
    NothingOpen,

    #[error("Request {0} is no longer pending")]
    NotPending(String),

    #[error("Request {0} is not a pickup-change request")]
    NotPickup(String),

    #[error("Request {0} was not found")]
    UnknownRequest(String),

    #[error("A reply is required")]
    MissingReply,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for AdminError {
    fn from(e: csv::Error) -> Self {
        AdminError::Export(e.to_string())
    }
}

impl From<std::io::Error> for AdminError {
    fn from(e: std::io::Error) -> Self {
        AdminError::Export(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
pub type AdminResult<T> = Result<T, AdminError>;
