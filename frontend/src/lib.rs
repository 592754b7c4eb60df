//! # Bus Admin Client
//!
//! Headless administration client for a school-bus transport backend.
//!
//! ## Responsibilities:
//! - Talk to the REST backend and normalise its two response envelopes
//! - Hold per-entity stores with filtering and pagination
//! - Drive the request review workflow and bulk auto-processing
//! - Plan checkpoints and routes with geocoding and road directions
//! - Export filtered lists to CSV

pub mod batch;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod filters;
pub mod services;
pub mod state;
pub mod validation;

pub use config::AdminConfig;
pub use errors::{AdminError, AdminResult, ApiError, ApiResult, WorkflowError};
pub use services::api::ApiClient;
