use shared::{AssignStudentRequest, Student, StudentInput};
use std::sync::Arc;

use super::{check, notify_outcome, reload};
use crate::config::AdminConfig;
use crate::errors::AdminResult;
use crate::filters::{filter_records, ListFilter};
use crate::services::export::{CsvExporter, ExportOutcome};
use crate::services::gateway::AdminGateway;
use crate::services::notifications::NotificationCenter;
use crate::state::EntityStore;

/// Student list with create, edit, bus/checkpoint assignment and CSV export
pub struct StudentsController<G: AdminGateway> {
    gateway: Arc<G>,
    store: EntityStore<Student>,
    exporter: CsvExporter,
    pub filter: ListFilter,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> StudentsController<G> {
    pub fn new(gateway: Arc<G>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            store: EntityStore::new("students"),
            exporter: CsvExporter::new(config.export_dir.clone()),
            filter: ListFilter::default(),
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    pub async fn refresh(&mut self) -> AdminResult<usize> {
        reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_students(),
        )
        .await
    }

    pub fn students(&self) -> &[Student] {
        self.store.items()
    }

    pub fn visible(&self) -> Vec<&Student> {
        filter_records(self.store.items(), &self.filter)
    }

    pub fn store(&self) -> &EntityStore<Student> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore<Student> {
        &mut self.store
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub async fn create(&mut self, input: &StudentInput) -> AdminResult<Student> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.create_student(input).await;
        let created = notify_outcome(&mut self.notifications, result, "create student", |s| {
            format!("Student {} created", s.name)
        })?;
        self.store.close_dialog();
        let _ = self.refresh().await;
        Ok(created)
    }

    pub async fn update(&mut self, student_id: &str, input: &StudentInput) -> AdminResult<Student> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.update_student(student_id, input).await;
        let updated = notify_outcome(&mut self.notifications, result, "update student", |s| {
            format!("Student {} updated", s.name)
        })?;
        self.store.close_dialog();
        let _ = self.refresh().await;
        Ok(updated)
    }

    /// Put a student on a bus and a pickup checkpoint; `None` clears either
    pub async fn assign(
        &mut self,
        student_id: &str,
        bus_id: Option<String>,
        checkpoint_id: Option<String>,
    ) -> AdminResult<Student> {
        let body = AssignStudentRequest {
            bus_id,
            checkpoint_id,
        };
        let result = self.gateway.assign_student(student_id, &body).await;
        let updated = notify_outcome(&mut self.notifications, result, "assign student", |s| {
            format!("Student {} assigned", s.name)
        })?;
        let _ = self.refresh().await;
        Ok(updated)
    }

    /// Export the filtered list; an empty list writes nothing
    pub fn export(&mut self) -> AdminResult<ExportOutcome> {
        let rows: Vec<Student> = self.visible().into_iter().cloned().collect();
        self.exporter.export_students(&rows, &mut self.notifications)
    }
}
