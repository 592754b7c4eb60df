use shared::{Bus, BusInput, Student};
use std::collections::HashMap;
use std::sync::Arc;

use super::{check, notify_outcome, reload};
use crate::config::AdminConfig;
use crate::errors::AdminResult;
use crate::filters::{filter_records, ListFilter};
use crate::services::gateway::AdminGateway;
use crate::services::notifications::NotificationCenter;
use crate::state::EntityStore;

/// Students per bus ID
pub fn registered_counts(students: &[Student]) -> HashMap<&str, u32> {
    let mut counts = HashMap::new();
    for bus_id in students.iter().filter_map(|s| s.bus_id.as_deref()) {
        *counts.entry(bus_id).or_insert(0) += 1;
    }
    counts
}

pub struct BusesController<G: AdminGateway> {
    gateway: Arc<G>,
    store: EntityStore<Bus>,
    pub filter: ListFilter,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> BusesController<G> {
    pub fn new(gateway: Arc<G>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            store: EntityStore::new("buses"),
            filter: ListFilter::default(),
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    /// Fetch buses, then fill in registered counts from the student list
    pub async fn refresh(&mut self) -> AdminResult<usize> {
        let count = reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_buses(),
        )
        .await?;

        match self.gateway.list_students().await {
            Ok(students) => {
                let counts = registered_counts(&students);
                for bus in self.store.items_mut() {
                    bus.registered_count = counts.get(bus.id.as_str()).copied().unwrap_or(0);
                }
            }
            Err(e) => {
                self.notifications
                    .warning(format!("Seat counts unavailable: {}", e));
            }
        }
        Ok(count)
    }

    pub fn buses(&self) -> &[Bus] {
        self.store.items()
    }

    pub fn visible(&self) -> Vec<&Bus> {
        filter_records(self.store.items(), &self.filter)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub async fn create(&mut self, input: &BusInput) -> AdminResult<Bus> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.create_bus(input).await;
        let created = notify_outcome(&mut self.notifications, result, "create bus", |b| {
            format!("Bus {} created", b.name)
        })?;
        let _ = self.refresh().await;
        Ok(created)
    }

    pub async fn update(&mut self, bus_id: &str, input: &BusInput) -> AdminResult<Bus> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.update_bus(bus_id, input).await;
        let updated = notify_outcome(&mut self.notifications, result, "update bus", |b| {
            format!("Bus {} updated", b.name)
        })?;
        let _ = self.refresh().await;
        Ok(updated)
    }
}
