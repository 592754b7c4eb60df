//! Checkpoint planner: address search, the pending marker for a new
//! checkpoint and saving dragged positions.

use log::info;
use shared::{Checkpoint, CheckpointInput, EntityStatus, LatLng};
use std::collections::HashMap;
use std::sync::Arc;

use super::{check, notify_outcome, refuse, reload};
use crate::batch::{BatchExecutor, BatchOutcome, BatchReport};
use crate::config::AdminConfig;
use crate::errors::{AdminResult, ApiError};
use crate::filters::{filter_records, ListFilter};
use crate::services::gateway::AdminGateway;
use crate::services::geocoding::{Geocoder, SearchResult};
use crate::services::notifications::NotificationCenter;
use crate::state::{EntityStore, PlannerState};
use crate::validation::Validate;

pub struct CheckpointsController<G: AdminGateway> {
    gateway: Arc<G>,
    geocoder: Arc<dyn Geocoder>,
    store: EntityStore<Checkpoint>,
    planner: PlannerState,
    executor: BatchExecutor,
    pub filter: ListFilter,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> CheckpointsController<G> {
    pub fn new(gateway: Arc<G>, geocoder: Arc<dyn Geocoder>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            geocoder,
            store: EntityStore::new("checkpoints"),
            planner: PlannerState::new(config.default_map_center),
            executor: BatchExecutor::new(config.batch_mode),
            filter: ListFilter::default(),
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    pub async fn refresh(&mut self) -> AdminResult<usize> {
        reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_checkpoints(),
        )
        .await
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        self.store.items()
    }

    pub fn visible(&self) -> Vec<&Checkpoint> {
        filter_records(self.store.items(), &self.filter)
    }

    pub fn planner(&self) -> &PlannerState {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut PlannerState {
        &mut self.planner
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Search for `text`. Zero results leave the map where it is.
    pub async fn search_address(&mut self, text: &str) -> AdminResult<&[SearchResult]> {
        self.planner.search_text = text.to_string();
        match self.geocoder.search(text).await {
            Ok(results) => {
                if results.is_empty() {
                    self.notifications
                        .info(format!("No places found for '{}'", text.trim()));
                }
                self.planner.apply_search_results(results);
                Ok(self.planner.results())
            }
            Err(e) => {
                self.notifications
                    .error(format!("Address search failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// Drop the pending marker on search result `index`
    pub fn select_result(&mut self, index: usize) -> Option<SearchResult> {
        self.planner.select_result(index)
    }

    /// Drop the pending marker at a clicked position and look up its address
    pub async fn place_marker(&mut self, position: LatLng) -> Option<String> {
        self.planner.place_marker(position);
        match self.geocoder.reverse(position).await {
            Ok(address) => {
                self.planner.set_pending_address(address.clone());
                address
            }
            Err(e) => {
                // the marker stays; only the suggestion is missing
                self.notifications
                    .warning(format!("Could not look up the address: {}", e));
                None
            }
        }
    }

    /// Create a checkpoint at the pending marker
    pub async fn create_at_marker(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AdminResult<Checkpoint> {
        let Some(position) = self.planner.pending_marker() else {
            return Err(refuse(&mut self.notifications, "Place a marker on the map first"));
        };
        let description = description
            .map(str::to_string)
            .or_else(|| self.planner.pending_address().map(str::to_string))
            .unwrap_or_default();
        let input = CheckpointInput {
            name: name.trim().to_string(),
            description,
            latitude: String::new(),
            longitude: String::new(),
            status: EntityStatus::Active,
        }
        .with_position(position);

        check(&mut self.notifications, &input)?;
        let result = self.gateway.create_checkpoint(&input).await;
        let created = notify_outcome(&mut self.notifications, result, "create checkpoint", |c| {
            format!("Checkpoint {} created", c.name)
        })?;
        self.planner.clear_marker();
        let _ = self.refresh().await;
        Ok(created)
    }

    /// Record a drag; nothing is sent until the draft is saved
    pub fn move_checkpoint(&mut self, checkpoint_id: &str, position: LatLng) {
        self.planner.move_checkpoint(checkpoint_id, position);
    }

    /// The update a draft would send; `Err` names why it cannot be sent
    fn draft_input(&self, checkpoint_id: &str, position: LatLng) -> Result<CheckpointInput, String> {
        let checkpoint = self
            .store
            .items()
            .iter()
            .find(|c| c.id == checkpoint_id)
            .ok_or_else(|| format!("Unknown checkpoint {}", checkpoint_id))?;
        Ok(CheckpointInput::from_checkpoint(checkpoint).with_position(position))
    }

    /// Persist one dragged position
    pub async fn save_draft(&mut self, checkpoint_id: &str) -> AdminResult<Checkpoint> {
        let Some(position) = self.planner.draft(checkpoint_id) else {
            return Err(refuse(
                &mut self.notifications,
                format!("No unsaved move for {}", checkpoint_id),
            ));
        };
        let input = self
            .draft_input(checkpoint_id, position)
            .map_err(|message| refuse(&mut self.notifications, message))?;
        check(&mut self.notifications, &input)?;

        let result = self.gateway.update_checkpoint(checkpoint_id, &input).await;
        let saved = notify_outcome(&mut self.notifications, result, "move checkpoint", |c| {
            format!("Checkpoint {} moved", c.name)
        })?;
        self.planner.take_draft(checkpoint_id);
        let _ = self.refresh().await;
        Ok(saved)
    }

    /// Persist every dragged position; saved drafts are cleared, failed ones kept.
    ///
    /// A draft that cannot be sent (unknown checkpoint, invalid position) is
    /// reported as a failure of its own and the rest are still saved.
    pub async fn save_all_drafts(&mut self) -> AdminResult<BatchReport> {
        let mut inputs: HashMap<String, CheckpointInput> = HashMap::new();
        let mut unsendable: Vec<BatchOutcome> = Vec::new();
        for (id, position) in self.planner.drafts() {
            let prepared = self.draft_input(id, position).and_then(|input| {
                input.validate().map_err(|e| e.to_string())?;
                Ok(input)
            });
            match prepared {
                Ok(input) => {
                    inputs.insert(id.to_string(), input);
                }
                Err(reason) => unsendable.push(BatchOutcome {
                    id: id.to_string(),
                    result: Err(reason),
                }),
            }
        }
        let mut ids: Vec<String> = inputs.keys().cloned().collect();
        ids.sort();

        info!("📍 Saving {} moved checkpoints", ids.len());
        let gateway = &*self.gateway;
        let inputs = &inputs;
        let mut report = self
            .executor
            .run(ids, move |id| async move {
                match inputs.get(&id) {
                    Some(input) => gateway.update_checkpoint(&id, input).await,
                    None => Err(ApiError::InvalidInput(format!("No unsaved move for {}", id))),
                }
            })
            .await;
        report.outcomes.extend(unsendable);
        report.outcomes.sort_by(|a, b| a.id.cmp(&b.id));

        for id in report.succeeded() {
            self.planner.take_draft(id);
        }
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

    pub fn discard_draft(&mut self, checkpoint_id: &str) -> bool {
        self.planner.discard_draft(checkpoint_id)
    }

    pub fn discard_all_drafts(&mut self) {
        self.planner.discard_all_drafts();
    }

    /// Edit name, description or status of an existing checkpoint
    pub async fn update(&mut self, checkpoint_id: &str, input: &CheckpointInput) -> AdminResult<Checkpoint> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.update_checkpoint(checkpoint_id, input).await;
        let updated = notify_outcome(&mut self.notifications, result, "update checkpoint", |c| {
            format!("Checkpoint {} updated", c.name)
        })?;
        let _ = self.refresh().await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::{checkpoint, FakeData, FakeGateway};
    use crate::errors::ApiResult;
    use crate::services::notifications::NotificationLevel;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGeocoder {
        results: Vec<SearchResult>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.results.clone())
        }

        async fn reverse(&self, _position: LatLng) -> ApiResult<Option<String>> {
            Ok(Some("Phố Huế, Hai Bà Trưng, Hà Nội".to_string()))
        }
    }

    fn setup(geocoder: FakeGeocoder) -> (Arc<FakeGateway>, CheckpointsController<FakeGateway>) {
        let gateway = Arc::new(FakeGateway::with_data(FakeData {
            checkpoints: vec![
                checkpoint("cp-1", "Cổng trường", 21.0285, 105.8542),
                checkpoint("cp-2", "Ngã tư Sở", 21.003, 105.82),
            ],
            ..FakeData::default()
        }));
        let controller =
            CheckpointsController::new(Arc::clone(&gateway), Arc::new(geocoder), &AdminConfig::default());
        (gateway, controller)
    }

    #[tokio::test]
    async fn test_search_without_results_keeps_center() {
        let (_, mut controller) = setup(FakeGeocoder::default());
        let center = controller.planner().center();

        let results = controller.search_address("nowhere").await.unwrap();

        assert!(results.is_empty());
        assert_eq!(controller.planner().center(), center);
        assert_eq!(controller.planner().pending_marker(), None);
    }

    #[tokio::test]
    async fn test_create_from_selected_result() {
        let geocoder = FakeGeocoder {
            results: vec![SearchResult {
                display_name: "Văn Miếu, Quốc Tử Giám".to_string(),
                position: LatLng::new(21.0294, 105.8355),
            }],
            ..FakeGeocoder::default()
        };
        let (gateway, mut controller) = setup(geocoder);
        controller.refresh().await.unwrap();

        controller.search_address("Văn Miếu").await.unwrap();
        controller.select_result(0).unwrap();
        assert!(controller.planner().results().is_empty());
        assert!(controller.planner().search_text.is_empty());

        let created = controller.create_at_marker("Văn Miếu", None).await.unwrap();

        assert_eq!(created.latitude, "21.0294000");
        assert_eq!(created.description, "Văn Miếu, Quốc Tử Giám");
        assert_eq!(gateway.count("create_checkpoint"), 1);
        assert_eq!(controller.planner().pending_marker(), None);
        assert_eq!(controller.checkpoints().len(), 3);
    }

    #[tokio::test]
    async fn test_create_without_marker_is_refused() {
        let (gateway, mut controller) = setup(FakeGeocoder::default());
        assert!(controller.create_at_marker("Trạm mới", None).await.is_err());
        assert_eq!(gateway.count("create_checkpoint"), 0);

        let latest = controller.notifications().latest().unwrap();
        assert_eq!(latest.level, NotificationLevel::Warning);
        assert_eq!(latest.message, "Place a marker on the map first");
    }

    #[tokio::test]
    async fn test_saving_without_draft_is_refused() {
        let (gateway, mut controller) = setup(FakeGeocoder::default());
        controller.refresh().await.unwrap();

        assert!(controller.save_draft("cp-1").await.is_err());
        assert_eq!(gateway.count("update_checkpoint"), 0);
        assert_eq!(
            controller.notifications().latest().unwrap().message,
            "No unsaved move for cp-1"
        );

        controller.move_checkpoint("cp-gone", LatLng::new(21.0, 105.8));
        assert!(controller.save_draft("cp-gone").await.is_err());
        assert_eq!(
            controller.notifications().latest().unwrap().message,
            "Unknown checkpoint cp-gone"
        );
    }

    #[tokio::test]
    async fn test_clicked_marker_gets_address() {
        let (_, mut controller) = setup(FakeGeocoder::default());
        let address = controller.place_marker(LatLng::new(21.01, 105.85)).await;
        assert_eq!(address.as_deref(), Some("Phố Huế, Hai Bà Trưng, Hà Nội"));
        assert_eq!(controller.planner().pending_address(), address.as_deref());
    }

    #[tokio::test]
    async fn test_drafts_saved_and_failures_kept() {
        let (gateway, mut controller) = setup(FakeGeocoder::default());
        gateway.data.lock().unwrap().failing_ids.insert("cp-2".to_string());
        controller.refresh().await.unwrap();

        controller.move_checkpoint("cp-1", LatLng::new(21.03, 105.86));
        controller.move_checkpoint("cp-2", LatLng::new(21.0, 105.81));
        let report = controller.save_all_drafts().await.unwrap();

        assert_eq!(report.succeeded(), vec!["cp-1"]);
        assert_eq!(controller.planner().draft("cp-1"), None);
        assert!(controller.planner().draft("cp-2").is_some());
        let moved = controller.checkpoints().iter().find(|c| c.id == "cp-1").unwrap();
        assert_eq!(moved.coordinates(), Some(LatLng::new(21.03, 105.86)));

        assert!(controller.discard_draft("cp-2"));
        assert!(!controller.planner().has_drafts());
    }

    #[tokio::test]
    async fn test_unsendable_drafts_do_not_block_the_rest() {
        let (gateway, mut controller) = setup(FakeGeocoder::default());
        controller.refresh().await.unwrap();

        controller.move_checkpoint("cp-1", LatLng::new(21.03, 105.86));
        controller.move_checkpoint("cp-2", LatLng::new(95.0, 105.81));
        controller.move_checkpoint("cp-gone", LatLng::new(21.0, 105.8));
        let report = controller.save_all_drafts().await.unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), vec!["cp-1"]);
        let failed = report.failed();
        assert_eq!(failed[0].0, "cp-2");
        assert!(failed[0].1.contains("latitude"));
        assert_eq!(failed[1], ("cp-gone", "Unknown checkpoint cp-gone"));
        assert_eq!(gateway.count("update_checkpoint"), 1);

        assert_eq!(controller.planner().draft("cp-1"), None);
        assert!(controller.planner().draft("cp-2").is_some());
        assert!(controller.planner().draft("cp-gone").is_some());
        assert_eq!(
            controller.notifications().latest().unwrap().level,
            NotificationLevel::Warning
        );
    }
}
