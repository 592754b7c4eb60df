mod common;

use busadmin_frontend::services::gateway::AdminGateway;
use busadmin_frontend::ApiError;
use shared::{CheckpointInput, EntityStatus, LatLng, ReplyRequest, RequestStatus, UserRole};

#[tokio::test]
async fn test_nested_and_flat_lists_decode() {
    let backend = common::start().await;

    // nested
    let types = backend.gateway.list_request_types().await.unwrap();
    assert_eq!(types.len(), 4);
    let students = backend.gateway.list_students().await.unwrap();
    assert_eq!(students.len(), 3);

    // flat
    let requests = backend.gateway.list_requests().await.unwrap();
    assert_eq!(requests.len(), 7);
    let routes = backend.gateway.list_routes().await.unwrap();
    assert_eq!(routes[0].checkpoint_path().ids(), ["cp-3", "cp-2", "cp-1"]);
}

#[tokio::test]
async fn test_single_records_in_both_shapes() {
    let backend = common::start().await;

    let request = backend.gateway.get_request("req-leave-1").await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    let student = backend.gateway.get_student("stu-1").await.unwrap();
    assert_eq!(student.checkpoint_id.as_deref(), Some("cp-1"));
    assert_eq!(student.parent.map(|p| p.full_name).as_deref(), Some("Lê Văn Cường"));
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let backend = common::start().await;

    let err = backend.gateway.get_student("stu-404").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("Student stu-404 not found"));
}

#[tokio::test]
async fn test_rejected_transition_carries_server_message() {
    let backend = common::start().await;

    let err = backend
        .gateway
        .reply_request(&ReplyRequest {
            request_id: "req-leave-2".to_string(),
            reply: Some("Không".to_string()),
            status: RequestStatus::Rejected,
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("cannot become REJECTED"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_users_filtered_by_role() {
    let backend = common::start().await;

    let parents = backend.gateway.list_users(Some(UserRole::Parent)).await.unwrap();
    assert_eq!(parents.len(), 2);
    assert!(parents.iter().all(|u| u.role == UserRole::Parent));

    let everyone = backend.gateway.list_users(None).await.unwrap();
    assert_eq!(everyone.len(), 5);
}

#[tokio::test]
async fn test_created_checkpoint_keeps_seven_decimals() {
    let backend = common::start().await;
    let input = CheckpointInput {
        name: "Chợ Hôm".to_string(),
        description: "Trước cổng chợ".to_string(),
        latitude: String::new(),
        longitude: String::new(),
        status: EntityStatus::Active,
    }
    .with_position(LatLng::new(21.0169, 105.85));

    let created = backend.gateway.create_checkpoint(&input).await.unwrap();

    assert_eq!(created.latitude, "21.0169000");
    assert_eq!(created.longitude, "105.8500000");
    let all = backend.gateway.list_checkpoints().await.unwrap();
    assert!(all.iter().any(|c| c.id == created.id));
}
