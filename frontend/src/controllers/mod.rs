//! # Controllers
//!
//! One controller per screen. Each owns its store and notification history
//! and drives the gateway: validate, call, notify, then re-fetch.
//!
//! Mutations are awaited before the re-fetch, so the operator always sees
//! their own writes. Controllers take `&mut self` for every action.

use std::future::Future;

use crate::errors::{AdminError, AdminResult, ApiError, ApiResult};
use crate::services::notifications::NotificationCenter;
use crate::state::EntityStore;
use crate::validation::Validate;

pub mod buses;
pub mod checkpoints;
pub mod parents;
pub mod requests;
pub mod routes;
pub mod students;

#[cfg(test)]
pub(crate) mod test_support;

pub use buses::BusesController;
pub use checkpoints::CheckpointsController;
pub use parents::ParentsController;
pub use requests::RequestsController;
pub use routes::{ResolvedRoute, RoutesController};
pub use students::StudentsController;

/// Re-fetch `store`, reporting a failure as an error notification
pub(crate) async fn reload<T, F>(
    store: &mut EntityStore<T>,
    notifications: &mut NotificationCenter,
    fetch: F,
) -> AdminResult<usize>
where
    F: Future<Output = ApiResult<Vec<T>>>,
{
    match store.refresh_with(fetch).await {
        Ok(count) => Ok(count),
        Err(e) => {
            notifications.error(format!("Failed to load {}: {}", store.name(), e));
            Err(e.into())
        }
    }
}

/// Run client-side validation; failures become a warning and no call is made
pub(crate) fn check<V: Validate>(
    notifications: &mut NotificationCenter,
    input: &V,
) -> AdminResult<()> {
    input.validate().map_err(|e| {
        notifications.warning(e.to_string());
        AdminError::from(e)
    })
}

/// Refuse an action before any call is made, reported as a warning
pub(crate) fn refuse(notifications: &mut NotificationCenter, message: impl Into<String>) -> AdminError {
    let message = message.into();
    notifications.warning(message.clone());
    ApiError::InvalidInput(message).into()
}

/// Turn the result of a mutation into a notification
pub(crate) fn notify_outcome<T>(
    notifications: &mut NotificationCenter,
    result: ApiResult<T>,
    action: &str,
    success: impl FnOnce(&T) -> String,
) -> AdminResult<T> {
    match result {
        Ok(value) => {
            notifications.success(success(&value));
            Ok(value)
        }
        Err(e) => {
            notifications.error(format!("Failed to {}: {}", action, e));
            Err(e.into())
        }
    }
}

/// Holds a busy flag up for as long as it lives.
///
/// The flag drops back to `false` even when the owning future is cancelled
/// half way through.
pub(crate) struct BusyFlag<'a>(&'a mut bool);

impl<'a> BusyFlag<'a> {
    pub(crate) fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
