//! # Review State Module
//!
//! State machine behind the request review dialog.
//!
//! ```text
//! Closed -> Viewing(request) -> Acting(request, action) -> Closed     (success)
//!                                                       -> Viewing    (failure)
//! ```
//!
//! While an action is in flight `processing` is set and every other action is
//! refused, which is the duplicate-submission guard.

use shared::{Request, RequestCategory, RequestTaxonomy};

use crate::errors::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
    MarkRead,
    AutoProcess,
}

impl ReviewAction {
    pub fn needs_reply(self) -> bool {
        matches!(self, ReviewAction::Approve | ReviewAction::Reject)
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::MarkRead => "mark as read",
            ReviewAction::AutoProcess => "auto-process",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewStage {
    Closed,
    Viewing(Request),
    Acting {
        request: Request,
        action: ReviewAction,
    },
}

#[derive(Debug, Clone)]
pub struct ReviewState {
    stage: ReviewStage,
    processing: bool,
    last_error: Option<String>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewState {
    pub fn new() -> Self {
        Self {
            stage: ReviewStage::Closed,
            processing: false,
            last_error: None,
        }
    }

    pub fn stage(&self) -> &ReviewStage {
        &self.stage
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The request shown in the dialog, if any
    pub fn current(&self) -> Option<&Request> {
        match &self.stage {
            ReviewStage::Closed => None,
            ReviewStage::Viewing(request) | ReviewStage::Acting { request, .. } => Some(request),
        }
    }

    pub fn open(&mut self, request: Request) -> Result<(), WorkflowError> {
        if self.processing {
            return Err(WorkflowError::Busy);
        }
        self.stage = ReviewStage::Viewing(request);
        self.last_error = None;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), WorkflowError> {
        if self.processing {
            return Err(WorkflowError::Busy);
        }
        self.stage = ReviewStage::Closed;
        self.last_error = None;
        Ok(())
    }

    /// Whether an action button would be enabled right now
    pub fn can_act(&self) -> bool {
        !self.processing
            && matches!(&self.stage, ReviewStage::Viewing(request) if request.is_pending())
    }

    /// Enter the action state, or refuse without side effects.
    ///
    /// Returns the request the action applies to.
    pub fn begin(
        &mut self,
        action: ReviewAction,
        reply: Option<&str>,
        taxonomy: &RequestTaxonomy,
    ) -> Result<Request, WorkflowError> {
        if self.processing {
            return Err(WorkflowError::Busy);
        }
        let request = match &self.stage {
            ReviewStage::Viewing(request) => request.clone(),
            _ => return Err(WorkflowError::NothingOpen),
        };
        if !request.is_pending() {
            return Err(WorkflowError::NotPending(request.request_id));
        }
        if action == ReviewAction::AutoProcess
            && taxonomy.classify(&request.request_type_id) != RequestCategory::Pickup
        {
            return Err(WorkflowError::NotPickup(request.request_id));
        }
        if action.needs_reply() && reply.map_or(true, |r| r.trim().is_empty()) {
            return Err(WorkflowError::MissingReply);
        }

        self.stage = ReviewStage::Acting {
            request: request.clone(),
            action,
        };
        self.processing = true;
        self.last_error = None;
        Ok(request)
    }

    /// Hold the action state until the remote call settles
    pub fn in_flight(&mut self) -> InFlight<'_> {
        InFlight { state: self }
    }

    /// Replace the request shown in the dialog with its copy from a fresh list
    pub fn sync(&mut self, requests: &[Request]) {
        if let ReviewStage::Viewing(current) = &mut self.stage {
            if let Some(fresh) = requests.iter().find(|r| r.request_id == current.request_id) {
                *current = fresh.clone();
            }
        }
    }

    /// The remote call succeeded: close the dialog
    pub fn complete_success(&mut self) {
        self.processing = false;
        self.last_error = None;
        self.stage = ReviewStage::Closed;
    }

    /// The remote call failed: back to viewing with the error kept for display
    pub fn complete_failure(&mut self, error: impl Into<String>) {
        self.processing = false;
        self.last_error = Some(error.into());
        if let ReviewStage::Acting { request, .. } = &self.stage {
            self.stage = ReviewStage::Viewing(request.clone());
        }
    }
}

/// An action whose remote call has not settled yet.
///
/// Dropping it unsettled, as happens when the caller's future is cancelled,
/// returns the dialog to viewing with `processing` cleared.
pub struct InFlight<'a> {
    state: &'a mut ReviewState,
}

impl InFlight<'_> {
    pub fn succeed(self) {
        self.state.complete_success();
    }

    pub fn fail(self, error: impl Into<String>) {
        self.state.complete_failure(error);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.state.processing {
            self.state.complete_failure("The action was cancelled before it finished");
        }
    }
}
