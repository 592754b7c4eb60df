use log::warn;
use shared::{Checkpoint, LatLng, Route, RouteInput, RoutePath};
use std::collections::HashMap;
use std::sync::Arc;

use super::{check, notify_outcome, refuse, reload};
use crate::config::AdminConfig;
use crate::errors::AdminResult;
use crate::filters::{filter_records, ListFilter};
use crate::services::gateway::AdminGateway;
use crate::services::notifications::NotificationCenter;
use crate::services::routing::{Directions, RouteGeometry};
use crate::state::EntityStore;

/// A route with its path looked up against the known checkpoints
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub route: Route,
    /// Stops in travel order
    pub stops: Vec<Checkpoint>,
    /// Path IDs with no matching checkpoint
    pub missing: Vec<String>,
}

impl ResolvedRoute {
    /// Positions of the stops that have usable coordinates
    pub fn positions(&self) -> Vec<LatLng> {
        self.stops.iter().filter_map(Checkpoint::coordinates).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn resolve_route(route: &Route, checkpoints: &[Checkpoint]) -> ResolvedRoute {
    let by_id: HashMap<&str, &Checkpoint> = checkpoints.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut stops = Vec::new();
    let mut missing = Vec::new();
    for id in route.checkpoint_path().ids() {
        match by_id.get(id.as_str()) {
            Some(checkpoint) => stops.push((*checkpoint).clone()),
            None => missing.push(id.clone()),
        }
    }
    ResolvedRoute {
        route: route.clone(),
        stops,
        missing,
    }
}

pub struct RoutesController<G: AdminGateway> {
    gateway: Arc<G>,
    directions: Arc<dyn Directions>,
    store: EntityStore<Route>,
    checkpoints: EntityStore<Checkpoint>,
    pub filter: ListFilter,
    notifications: NotificationCenter,
}

impl<G: AdminGateway> RoutesController<G> {
    pub fn new(gateway: Arc<G>, directions: Arc<dyn Directions>, config: &AdminConfig) -> Self {
        Self {
            gateway,
            directions,
            store: EntityStore::new("routes"),
            checkpoints: EntityStore::new("checkpoints"),
            filter: ListFilter::default(),
            notifications: NotificationCenter::new(config.notification_history),
        }
    }

    /// Fetch routes and the checkpoints their paths refer to
    pub async fn refresh(&mut self) -> AdminResult<usize> {
        reload(
            &mut self.checkpoints,
            &mut self.notifications,
            self.gateway.list_checkpoints(),
        )
        .await?;
        reload(
            &mut self.store,
            &mut self.notifications,
            self.gateway.list_routes(),
        )
        .await
    }

    pub fn routes(&self) -> &[Route] {
        self.store.items()
    }

    pub fn visible(&self) -> Vec<&Route> {
        filter_records(self.store.items(), &self.filter)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub fn resolve(&self, route_id: &str) -> Option<ResolvedRoute> {
        self.store
            .items()
            .iter()
            .find(|r| r.id == route_id)
            .map(|r| resolve_route(r, self.checkpoints.items()))
    }

    /// Road geometry through the route's stops.
    ///
    /// Fewer than two usable stops is refused without asking the router.
    pub async fn geometry(&mut self, route_id: &str) -> AdminResult<RouteGeometry> {
        let Some(resolved) = self.resolve(route_id) else {
            return Err(refuse(&mut self.notifications, format!("Unknown route {}", route_id)));
        };
        if !resolved.is_complete() {
            warn!(
                "⚠️ Route {} refers to missing checkpoints: {}",
                resolved.route.code,
                resolved.missing.join(", ")
            );
            self.notifications.warning(format!(
                "Route {} skips {} unknown checkpoint(s)",
                resolved.route.code,
                resolved.missing.len()
            ));
        }

        let positions = resolved.positions();
        if positions.len() < 2 {
            return Err(refuse(
                &mut self.notifications,
                format!("Route {} has fewer than two stops to draw", resolved.route.code),
            ));
        }

        match self.directions.route_geometry(&positions).await {
            Ok(geometry) => Ok(geometry),
            Err(e) => {
                self.notifications
                    .error(format!("Could not draw route {}: {}", resolved.route.code, e));
                Err(e.into())
            }
        }
    }

    pub async fn create(&mut self, input: &RouteInput) -> AdminResult<Route> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.create_route(input).await;
        let created = notify_outcome(&mut self.notifications, result, "create route", |r| {
            format!("Route {} created", r.code)
        })?;
        let _ = self.refresh().await;
        Ok(created)
    }

    pub async fn update(&mut self, route_id: &str, input: &RouteInput) -> AdminResult<Route> {
        check(&mut self.notifications, input)?;
        let result = self.gateway.update_route(route_id, input).await;
        let updated = notify_outcome(&mut self.notifications, result, "update route", |r| {
            format!("Route {} updated", r.code)
        })?;
        let _ = self.refresh().await;
        Ok(updated)
    }

    /// Save a reordered or edited path, keeping the other route fields
    pub async fn update_path(&mut self, route_id: &str, path: RoutePath) -> AdminResult<Route> {
        let Some(route) = self.store.items().iter().find(|r| r.id == route_id).cloned() else {
            return Err(refuse(&mut self.notifications, format!("Unknown route {}", route_id)));
        };
        let input = RouteInput {
            code: route.code,
            description: route.description,
            path: path.to_string(),
            period_start: route.period_start,
            period_end: route.period_end,
        };
        self.update(route_id, &input).await
    }
}
