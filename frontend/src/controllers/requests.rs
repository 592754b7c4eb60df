//! Parent request review: the four request tabs, the review dialog and bulk
//! auto-processing of pickup changes.

use log::{info, warn};
use shared::{ReplyRequest, Request, RequestStatus, RequestTaxonomy};
use std::sync::Arc;

use super::{reload, BusyFlag};
use crate::batch::{BatchExecutor, BatchReport};
use crate::config::AdminConfig;
use crate::errors::{AdminResult, WorkflowError};
use crate::filters::{bucket_requests, filter_requests, pending_pickups, ListFilter, RequestBuckets};
use crate::services::export::{CsvExporter, ExportOutcome};
use crate::services::gateway::AdminGateway;
use crate::services::notifications::NotificationCenter;
use crate::state::{EntityStore, ReviewAction, ReviewState};
use crate::validation::validate_reply;

pub struct RequestsController<G: AdminGateway> {
    gateway: Arc<G>,
    store: EntityStore<Request>,
    taxonomy: RequestTaxonomy,
    /// Configured IDs, applied on top of whatever the backend publishes
    overrides: RequestTaxonomy,
    taxonomy_resolved: bool,
    review: ReviewState,
    executor: BatchExecutor,
    bulk_running: bool,
    exporter: CsvExporter,
    pub filter: ListFilter,
    pub status_filter: Option<RequestStatus>,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> RequestsController<G> {
    pub fn new(gateway: Arc<G>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            store: EntityStore::new("requests"),
            taxonomy: config.request_types.clone(),
            overrides: config.request_types.clone(),
            taxonomy_resolved: false,
            review: ReviewState::new(),
            executor: BatchExecutor::new(config.batch_mode),
            bulk_running: false,
            exporter: CsvExporter::new(config.export_dir.clone()),
            filter: ListFilter::default(),
            status_filter: None,
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    /// First load: resolve the taxonomy once, then fetch the list
    pub async fn load(&mut self) -> AdminResult<usize> {
        if !self.taxonomy_resolved {
            self.resolve_taxonomy().await;
        }
        self.refresh().await
    }

    async fn resolve_taxonomy(&mut self) {
        match self.gateway.list_request_types().await {
            Ok(types) => {
                self.taxonomy =
                    RequestTaxonomy::from_request_types(&types).with_overrides(&self.overrides);
                self.taxonomy_resolved = true;
                if self.taxonomy.is_complete() {
                    info!("🏷️ Request taxonomy resolved from {} types", types.len());
                } else {
                    warn!("⚠️ Request taxonomy is incomplete: {:?}", self.taxonomy);
                }
            }
            Err(e) => {
                // retried on the next load
                self.notifications
                    .error(format!("Failed to load request types: {}", e));
            }
        }
    }

    /// Re-fetch the list; an open dialog picks up the fresh copy of its request
    pub async fn refresh(&mut self) -> AdminResult<usize> {
        let count = reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_requests(),
        )
        .await?;
        self.review.sync(self.store.items());
        Ok(count)
    }

    pub fn requests(&self) -> &[Request] {
        self.store.items()
    }

    pub fn store(&self) -> &EntityStore<Request> {
        &self.store
    }

    pub fn taxonomy(&self) -> &RequestTaxonomy {
        &self.taxonomy
    }

    pub fn review(&self) -> &ReviewState {
        &self.review
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// The current list, filtered and split into the four tabs
    pub fn buckets(&self) -> RequestBuckets<'_> {
        bucket_requests(self.visible(), &self.taxonomy)
    }

    /// The current list after search, date and status filters
    pub fn visible(&self) -> Vec<&Request> {
        filter_requests(self.store.items(), &self.filter, self.status_filter)
    }

    pub fn open(&mut self, request_id: &str) -> Result<(), WorkflowError> {
        let request = self
            .store
            .items()
            .iter()
            .find(|r| r.request_id == request_id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownRequest(request_id.to_string()))?;
        self.review.open(request)
    }

    pub fn close(&mut self) -> Result<(), WorkflowError> {
        self.review.close()
    }

    pub async fn approve(&mut self, reply: &str) -> AdminResult<Request> {
        self.act(ReviewAction::Approve, Some(reply)).await
    }

    pub async fn reject(&mut self, reply: &str) -> AdminResult<Request> {
        self.act(ReviewAction::Reject, Some(reply)).await
    }

    pub async fn mark_read(&mut self) -> AdminResult<Request> {
        self.act(ReviewAction::MarkRead, None).await
    }

    pub async fn auto_process(&mut self) -> AdminResult<Request> {
        self.act(ReviewAction::AutoProcess, None).await
    }

    async fn act(&mut self, action: ReviewAction, reply: Option<&str>) -> AdminResult<Request> {
        if self.bulk_running {
            return Err(WorkflowError::Busy.into());
        }
        let target = match self.review.begin(action, reply, &self.taxonomy) {
            Ok(target) => target,
            Err(e) => {
                self.notifications.warning(e.to_string());
                return Err(e.into());
            }
        };

        let in_flight = self.review.in_flight();

        if action.needs_reply() {
            if let Err(e) = validate_reply(reply.unwrap_or_default()) {
                in_flight.fail(e.to_string());
                self.notifications.warning(e.to_string());
                return Err(e.into());
            }
        }

        let reply = reply.map(|r| r.trim().to_string());
        let result = match action {
            ReviewAction::Approve | ReviewAction::Reject | ReviewAction::MarkRead => {
                let body = ReplyRequest {
                    request_id: target.request_id.clone(),
                    reply: if action.needs_reply() { reply } else { None },
                    status: match action {
                        ReviewAction::Approve => RequestStatus::Approved,
                        ReviewAction::Reject => RequestStatus::Rejected,
                        _ => RequestStatus::Read,
                    },
                };
                self.gateway.reply_request(&body).await
            }
            ReviewAction::AutoProcess => {
                self.gateway
                    .process_change_checkpoint(&target.request_id)
                    .await
            }
        };

        match result {
            Ok(updated) => {
                in_flight.succeed();
                self.notifications.success(format!(
                    "Request {} is now {}",
                    updated.request_id, updated.status
                ));
                // a failed re-fetch is already reported; the action itself went through
                let _ = self.refresh().await;
                Ok(updated)
            }
            Err(e) => {
                in_flight.fail(e.to_string());
                self.notifications.error(format!(
                    "Failed to {} request {}: {}",
                    action.label(),
                    target.request_id,
                    e
                ));
                Err(e.into())
            }
        }
    }

    /// Auto-process every pending pickup-change request in the current list.
    ///
    /// One call per request; failures are reported per record and do not stop
    /// the rest. The list is re-fetched once if anything went through.
    pub async fn auto_process_all(&mut self) -> AdminResult<BatchReport> {
        if self.bulk_running || self.review.is_processing() {
            return Err(WorkflowError::Busy.into());
        }

        let ids: Vec<String> = pending_pickups(self.store.items(), &self.taxonomy)
            .into_iter()
            .map(|r| r.request_id.clone())
            .collect();
        if ids.is_empty() {
            self.notifications
                .info("No pending pickup-change requests to process");
            return Ok(BatchReport::default());
        }

        let report = {
            let _busy = BusyFlag::raise(&mut self.bulk_running);
            let gateway = &*self.gateway;
            self.executor
                .run(ids, move |id| async move { gateway.process_change_checkpoint(&id).await })
                .await
        };

        if report.success_count() > 0 {
            let _ = self.refresh().await;
        }

        let summary = report.summary();
        if report.is_complete_success() {
            self.notifications.success(summary);
        } else if report.success_count() > 0 {
            self.notifications.warning(summary);
        } else {
            self.notifications.error(summary);
        }
        Ok(report)
    }

    /// Write the visible requests to CSV
    pub fn export(&mut self) -> AdminResult<ExportOutcome> {
        let rows: Vec<Request> = self.visible().into_iter().cloned().collect();
        self.exporter
            .export_requests(&rows, &self.taxonomy, &mut self.notifications)
    }

    /// Fetch one request straight from the backend, bypassing the list
    pub async fn fetch_one(&mut self, request_id: &str) -> AdminResult<Request> {
        let result = self.gateway.get_request(request_id).await;
        match result {
            Ok(request) => Ok(request),
            Err(e) => {
                self.notifications
                    .error(format!("Failed to load request {}: {}", request_id, e));
                Err(e.into())
            }
        }
    }
}
