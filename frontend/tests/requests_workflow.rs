mod common;

use busadmin_frontend::batch::BatchMode;
use busadmin_frontend::controllers::{RequestsController, StudentsController};
use busadmin_frontend::filters::ListFilter;
use busadmin_frontend::services::export::ExportOutcome;
use busadmin_frontend::services::gateway::AdminGateway;
use busadmin_frontend::services::notifications::NotificationLevel;
use busadmin_frontend::state::ReviewStage;
use busadmin_frontend::{AdminConfig, AdminError};
use busadmin_mock_backend::fixtures::{self, INCIDENT_TYPE_ID};
use busadmin_mock_backend::store::AUTO_PROCESS_REPLY;
use busadmin_mock_backend::MockStore;
use shared::{RequestCategory, RequestStatus};
use tempfile::TempDir;

#[tokio::test]
async fn test_load_resolves_taxonomy_and_buckets() {
    let backend = common::start().await;
    let mut controller = RequestsController::new(backend.gateway.clone(), &backend.config);

    controller.load().await.unwrap();

    assert!(controller.taxonomy().is_complete());
    let buckets = controller.buckets();
    assert_eq!(buckets.get(RequestCategory::Leave).len(), 2);
    assert_eq!(buckets.get(RequestCategory::Pickup).len(), 3);
    assert_eq!(buckets.get(RequestCategory::Other).len(), 1);
    let reports = buckets.get(RequestCategory::Report);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].request_type_id, INCIDENT_TYPE_ID);
    assert_eq!(buckets.total(), 7);
}

#[tokio::test]
async fn test_approve_replies_then_closes() {
    let backend = common::start().await;
    let mut controller = RequestsController::new(backend.gateway.clone(), &backend.config);
    controller.load().await.unwrap();

    controller.open("req-leave-1").unwrap();
    let updated = controller.approve("  Đã xác nhận ").await.unwrap();

    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.reply.as_deref(), Some("Đã xác nhận"));
    assert_eq!(controller.review().stage(), &ReviewStage::Closed);
    assert!(!controller.review().is_processing());

    let listed = controller
        .requests()
        .iter()
        .find(|r| r.request_id == "req-leave-1")
        .unwrap();
    assert_eq!(listed.status, RequestStatus::Approved);
    assert!(listed.reply_is_consistent());
}

#[tokio::test]
async fn test_mark_read_of_handled_request_is_refused_locally() {
    let backend = common::start().await;
    let mut controller = RequestsController::new(backend.gateway.clone(), &backend.config);
    controller.load().await.unwrap();

    controller.open("req-leave-2").unwrap();
    let err = controller.mark_read().await.unwrap_err();

    assert!(matches!(err, AdminError::Workflow(_)));
    let still = backend.gateway.get_request("req-leave-2").await.unwrap();
    assert_eq!(still.status, RequestStatus::Approved);
}

async fn auto_process_all(mode: BatchMode, store: MockStore) -> (common::TestBackend, RequestsController<busadmin_frontend::ApiClient>) {
    let backend = common::start_with(store).await;
    let config = AdminConfig {
        batch_mode: mode,
        ..backend.config.clone()
    };
    let mut controller = RequestsController::new(backend.gateway.clone(), &config);
    controller.load().await.unwrap();
    (backend, controller)
}

#[tokio::test]
async fn test_auto_process_all_applies_pending_pickups() {
    for mode in [BatchMode::Sequential, BatchMode::Concurrent { limit: 4 }] {
        let (backend, mut controller) = auto_process_all(mode, fixtures::seed()).await;

        let report = controller.auto_process_all().await.unwrap();

        assert_eq!(report.total(), 2);
        assert!(report.is_complete_success());
        for id in ["req-pickup-1", "req-pickup-2"] {
            let request = controller
                .requests()
                .iter()
                .find(|r| r.request_id == id)
                .unwrap();
            assert_eq!(request.status, RequestStatus::Approved);
            assert_eq!(request.reply.as_deref(), Some(AUTO_PROCESS_REPLY));
        }
        let student = backend.gateway.get_student("stu-1").await.unwrap();
        assert_eq!(student.checkpoint_id.as_deref(), Some("cp-2"));
        assert_eq!(
            controller.notifications().latest().unwrap().level,
            NotificationLevel::Success
        );
    }
}

#[tokio::test]
async fn test_auto_process_all_reports_partial_failure() {
    let mut store = fixtures::seed();
    store.make_unavailable("req-pickup-2");
    let (_backend, mut controller) = auto_process_all(BatchMode::Sequential, store).await;

    let report = controller.auto_process_all().await.unwrap();

    assert_eq!(report.succeeded(), vec!["req-pickup-1"]);
    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "req-pickup-2");
    assert!(failed[0].1.contains("503"));

    let pending: Vec<&str> = controller
        .requests()
        .iter()
        .filter(|r| r.is_pending() && r.request_id.starts_with("req-pickup"))
        .map(|r| r.request_id.as_str())
        .collect();
    assert_eq!(pending, vec!["req-pickup-2"]);
    assert_eq!(
        controller.notifications().latest().unwrap().level,
        NotificationLevel::Warning
    );
}

#[tokio::test]
async fn test_list_outage_keeps_previous_rows() {
    let backend = common::start().await;
    let mut controller = RequestsController::new(backend.gateway.clone(), &backend.config);
    controller.load().await.unwrap();

    backend.state.store.write().await.lists_unavailable = true;
    assert!(controller.refresh().await.is_err());

    assert_eq!(controller.requests().len(), 7);
    assert!(controller.store().error().is_some());
    assert_eq!(
        controller.notifications().latest().unwrap().level,
        NotificationLevel::Error
    );
}

#[tokio::test]
async fn test_student_export_writes_filtered_rows() {
    let backend = common::start().await;
    let dir = TempDir::new().unwrap();
    let config = AdminConfig {
        export_dir: dir.path().to_path_buf(),
        ..backend.config.clone()
    };
    let mut controller = StudentsController::new(backend.gateway.clone(), &config);
    controller.refresh().await.unwrap();
    controller.filter = ListFilter::search("khôi");

    let outcome = controller.export().unwrap();

    let (path, rows) = match outcome {
        ExportOutcome::Written { path, rows } => (path, rows),
        ExportOutcome::NoData => panic!("expected a file"),
    };
    assert_eq!(rows, 1);
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("Phạm Minh Khôi"));
    assert!(!content.contains("Nguyễn Văn An"));
}
