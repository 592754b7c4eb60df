use shared::{Student, User, UserInput, UserRole};
use std::sync::Arc;

use super::{check, notify_outcome, reload};
use crate::config::AdminConfig;
use crate::errors::AdminResult;
use crate::filters::{filter_records, ListFilter};
use crate::services::gateway::AdminGateway;
use crate::services::notifications::NotificationCenter;
use crate::state::EntityStore;

/// Parent accounts: users with the PARENT role
pub struct ParentsController<G: AdminGateway> {
    gateway: Arc<G>,
    store: EntityStore<User>,
    pub filter: ListFilter,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> ParentsController<G> {
    pub fn new(gateway: Arc<G>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            store: EntityStore::new("parents"),
            filter: ListFilter::default(),
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    pub async fn refresh(&mut self) -> AdminResult<usize> {
        reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_users(Some(UserRole::Parent)),
        )
        .await
    }

    pub fn parents(&self) -> &[User] {
        self.store.items()
    }

    pub fn visible(&self) -> Vec<&User> {
        filter_records(self.store.items(), &self.filter)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Students linked to `parent_id`
    pub fn children_of<'a>(&self, parent_id: &str, students: &'a [Student]) -> Vec<&'a Student> {
        students
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// The role is always forced to PARENT
    pub async fn create(&mut self, input: &UserInput) -> AdminResult<User> {
        let input = UserInput {
            role: UserRole::Parent,
            ..input.clone()
        };
        check(&mut self.notifications, &input)?;
        let result = self.gateway.create_user(&input).await;
        let created = notify_outcome(&mut self.notifications, result, "create parent", |u| {
            format!("Parent {} created", u.full_name)
        })?;
        let _ = self.refresh().await;
        Ok(created)
    }

    pub async fn update(&mut self, user_id: &str, input: &UserInput) -> AdminResult<User> {
        let input = UserInput {
            role: UserRole::Parent,
            ..input.clone()
        };
        check(&mut self.notifications, &input)?;
        let result = self.gateway.update_user(user_id, &input).await;
        let updated = notify_outcome(&mut self.notifications, result, "update parent", |u| {
            format!("Parent {} updated", u.full_name)
        })?;
        let _ = self.refresh().await;
        Ok(updated)
    }
}
