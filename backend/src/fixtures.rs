//! Seed data for the mock backend: one school in central Hanoi.

use shared::{
    format_coordinate, Bus, BusStatus, Checkpoint, EntityStatus, Gender, Request, RequestStatus,
    RequestType, Route, Student, User, UserRole,
};

use crate::store::MockStore;

pub const LEAVE_TYPE_ID: &str = "rt-1";
pub const PICKUP_TYPE_ID: &str = "rt-2";
pub const OTHER_TYPE_ID: &str = "rt-3";
/// Not one of the three known kinds, so it lands in the report bucket
pub const INCIDENT_TYPE_ID: &str = "rt-4";

pub fn seed() -> MockStore {
    let users = vec![
        user("admin-1", "Quản trị viên", UserRole::Admin),
        user("parent-1", "Lê Văn Cường", UserRole::Parent),
        user("parent-2", "Phạm Thị Dung", UserRole::Parent),
        user("driver-1", "Trần Văn Hùng", UserRole::Driver),
        user("assistant-1", "Ngô Thị Lan", UserRole::Assistant),
    ];
    let checkpoints = vec![
        checkpoint("cp-1", "Cổng trường", 21.0285, 105.8542),
        checkpoint("cp-2", "Ngã tư Sở", 21.0031, 105.8201),
        checkpoint("cp-3", "Cầu Giấy", 21.0362, 105.7906),
        checkpoint("cp-4", "Hồ Gươm", 21.0288, 105.8525),
    ];

    let mut students = vec![
        student("stu-1", "HS001", "Nguyễn Văn An", Gender::Male, "parent-1"),
        student("stu-2", "HS002", "Trần Bảo Ngọc", Gender::Female, "parent-1"),
        student("stu-3", "HS003", "Phạm Minh Khôi", Gender::Male, "parent-2"),
    ];
    seat(&mut students[0], "bus-1", "Xe 01", &checkpoints[0]);
    seat(&mut students[2], "bus-1", "Xe 01", &checkpoints[2]);
    for s in students.iter_mut() {
        s.parent = users.iter().find(|u| Some(&u.id) == s.parent_id.as_ref()).cloned();
    }

    let requests = vec![
        Request {
            from_date: Some("2024-09-09".to_string()),
            to_date: Some("2024-09-10".to_string()),
            reason: "Bị sốt, xin nghỉ hai ngày".to_string(),
            ..request("req-leave-1", LEAVE_TYPE_ID, &students[0], "2024-09-05T07:30:00Z")
        },
        Request {
            from_date: Some("2024-09-02".to_string()),
            to_date: Some("2024-09-02".to_string()),
            reason: "Về quê dự đám cưới".to_string(),
            reply: Some("Đã ghi nhận".to_string()),
            status: RequestStatus::Approved,
            ..request("req-leave-2", LEAVE_TYPE_ID, &students[2], "2024-08-30T09:00:00Z")
        },
        pickup_change("req-pickup-1", &students[0], &checkpoints[1], "2024-09-06T06:45:00Z"),
        pickup_change("req-pickup-2", &students[2], &checkpoints[3], "2024-09-06T07:10:00Z"),
        Request {
            reply: Some("Đã cập nhật".to_string()),
            status: RequestStatus::Approved,
            ..pickup_change("req-pickup-3", &students[1], &checkpoints[2], "2024-08-28T08:00:00Z")
        },
        Request {
            reason: "Xin cho cháu ngồi hàng ghế đầu".to_string(),
            ..request("req-other-1", OTHER_TYPE_ID, &students[1], "2024-09-07T10:15:00Z")
        },
        Request {
            reason: "Xe đến muộn 20 phút".to_string(),
            ..request("req-report-1", INCIDENT_TYPE_ID, &students[2], "2024-09-08T07:05:00Z")
        },
    ];

    MockStore {
        request_types: vec![
            request_type(LEAVE_TYPE_ID, "Xin nghỉ học"),
            request_type(PICKUP_TYPE_ID, "Đổi điểm đón"),
            request_type(OTHER_TYPE_ID, "Yêu cầu khác"),
            request_type(INCIDENT_TYPE_ID, "Báo cáo sự cố"),
        ],
        requests,
        students,
        users,
        buses: vec![
            Bus {
                driver_id: Some("driver-1".to_string()),
                driver_name: Some("Trần Văn Hùng".to_string()),
                assistant_id: Some("assistant-1".to_string()),
                assistant_name: Some("Ngô Thị Lan".to_string()),
                route_id: Some("route-1".to_string()),
                ..bus("bus-1", "29B-123.45", "Xe 01", 30)
            },
            Bus {
                route_id: Some("route-2".to_string()),
                ..bus("bus-2", "29B-678.90", "Xe 02", 16)
            },
        ],
        checkpoints,
        routes: vec![
            route("route-1", "T01", "Tuyến Cầu Giấy", "cp-3 cp-2 cp-1"),
            route("route-2", "T02", "Tuyến Hoàn Kiếm", "cp-4 cp-1"),
        ],
        ..MockStore::default()
    }
}

fn request_type(id: &str, name: &str) -> RequestType {
    RequestType {
        request_type_id: id.to_string(),
        request_type_name: name.to_string(),
    }
}

fn user(id: &str, full_name: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        username: id.replace('-', ""),
        full_name: full_name.to_string(),
        email: Some(format!("{}@truong.edu.vn", id)),
        phone: Some("0912345678".to_string()),
        address: None,
        role,
        status: EntityStatus::Active,
    }
}

fn checkpoint(id: &str, name: &str, lat: f64, lng: f64) -> Checkpoint {
    Checkpoint {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        latitude: format_coordinate(lat),
        longitude: format_coordinate(lng),
        status: EntityStatus::Active,
        created_at: Some("2024-08-15T08:00:00Z".to_string()),
        updated_at: Some("2024-08-15T08:00:00Z".to_string()),
    }
}

fn student(id: &str, roll_number: &str, name: &str, gender: Gender, parent_id: &str) -> Student {
    Student {
        id: id.to_string(),
        roll_number: roll_number.to_string(),
        name: name.to_string(),
        dob: "2016-05-12".to_string(),
        address: "Hà Nội".to_string(),
        gender,
        status: EntityStatus::Active,
        parent_id: Some(parent_id.to_string()),
        parent: None,
        bus_id: None,
        bus_name: None,
        checkpoint_id: None,
        checkpoint_name: None,
    }
}

fn seat(student: &mut Student, bus_id: &str, bus_name: &str, checkpoint: &Checkpoint) {
    student.bus_id = Some(bus_id.to_string());
    student.bus_name = Some(bus_name.to_string());
    student.checkpoint_id = Some(checkpoint.id.clone());
    student.checkpoint_name = Some(checkpoint.name.clone());
}

fn request(id: &str, type_id: &str, student: &Student, created_at: &str) -> Request {
    Request {
        request_id: id.to_string(),
        request_type_id: type_id.to_string(),
        send_by_user_id: student.parent_id.clone().unwrap_or_default(),
        student_id: Some(student.id.clone()),
        student_name: Some(student.name.clone()),
        checkpoint_id: None,
        checkpoint_name: None,
        from_date: None,
        to_date: None,
        reason: String::new(),
        reply: None,
        status: RequestStatus::Pending,
        created_at: Some(created_at.to_string()),
    }
}

fn pickup_change(id: &str, student: &Student, to: &Checkpoint, created_at: &str) -> Request {
    Request {
        checkpoint_id: Some(to.id.clone()),
        checkpoint_name: Some(to.name.clone()),
        reason: format!("Chuyển điểm đón sang {}", to.name),
        ..request(id, PICKUP_TYPE_ID, student, created_at)
    }
}

fn bus(id: &str, plate: &str, name: &str, max_capacity: u32) -> Bus {
    Bus {
        id: id.to_string(),
        license_plate: plate.to_string(),
        name: name.to_string(),
        driver_id: None,
        driver_name: None,
        assistant_id: None,
        assistant_name: None,
        route_id: None,
        max_capacity,
        registered_count: 0,
        bus_status: BusStatus::Active,
    }
}

fn route(id: &str, code: &str, description: &str, path: &str) -> Route {
    Route {
        id: id.to_string(),
        code: code.to_string(),
        description: description.to_string(),
        path: path.to_string(),
        period_start: Some("2024-09-01".to_string()),
        period_end: Some("2025-05-31".to_string()),
    }
}
