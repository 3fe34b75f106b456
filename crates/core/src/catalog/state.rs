use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Route;

/// Where the installed route collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOrigin {
    /// Fresh from the remote directory.
    Remote,
    /// Offline mirror read at cold start.
    Cache,
    /// Built-in dataset installed after a failed fetch.
    Fallback,
}

/// Routes and favorites slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Current route collection.
    pub routes: Vec<Route>,
    /// User favorites, unique by id.
    pub favorites: Vec<Route>,
    /// At least one fetch is in flight.
    pub loading: bool,
    /// Message from the most recent failed fetch.
    pub error: Option<String>,
    /// Source of `routes`.
    pub origin: Option<RouteOrigin>,
    /// When `routes` was installed.
    pub refreshed_at: Option<DateTime<Utc>>,
    fetches_in_flight: usize,
}

impl CatalogState {
    /// Whether a route with `id` is a favorite.
    pub fn is_favorite(&self, id: &Value) -> bool {
        self.favorites.iter().any(|route| route.has_id(id))
    }
}

/// Catalog slice transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// A fetch began.
    FetchStarted,
    /// A route collection replaced the current one.
    RoutesInstalled {
        /// New collection.
        routes: Vec<Route>,
        /// Where it came from.
        origin: RouteOrigin,
        /// Installation time.
        at: DateTime<Utc>,
    },
    /// A fetch was dropped before reaching a terminal state.
    FetchAbandoned,
    /// Favorites were replaced from the durable mirror.
    FavoritesLoaded(Vec<Route>),
    /// A route was appended to favorites.
    FavoriteAdded(Route),
    /// The favorite with this id was removed.
    FavoriteRemoved(Value),
}

/// Pure transition function for the catalog slice.
///
/// Every fetch ends in exactly one non-cache install or `FetchAbandoned`;
/// `loading` clears once all started fetches have ended.
pub fn reduce(state: CatalogState, event: &CatalogEvent) -> CatalogState {
    match event {
        CatalogEvent::FetchStarted => {
            let fetches_in_flight = state.fetches_in_flight + 1;
            CatalogState {
                loading: true,
                fetches_in_flight,
                ..state
            }
        }
        CatalogEvent::RoutesInstalled {
            origin: RouteOrigin::Cache,
            ..
        } if matches!(
            state.origin,
            Some(RouteOrigin::Remote | RouteOrigin::Fallback)
        ) =>
        {
            state
        }
        CatalogEvent::RoutesInstalled { routes, origin, at } => {
            if *origin == RouteOrigin::Cache {
                CatalogState {
                    routes: routes.clone(),
                    origin: Some(*origin),
                    refreshed_at: Some(*at),
                    ..state
                }
            } else {
                let fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
                CatalogState {
                    routes: routes.clone(),
                    loading: fetches_in_flight > 0,
                    error: None,
                    origin: Some(*origin),
                    refreshed_at: Some(*at),
                    fetches_in_flight,
                    ..state
                }
            }
        }
        CatalogEvent::FetchAbandoned => {
            let fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
            CatalogState {
                loading: fetches_in_flight > 0,
                fetches_in_flight,
                ..state
            }
        }
        CatalogEvent::FavoritesLoaded(favorites) => CatalogState {
            favorites: unique_by_id(favorites),
            ..state
        },
        CatalogEvent::FavoriteAdded(route) => {
            let mut state = state;
            if !state.is_favorite(&route.id) {
                state.favorites.push(route.clone());
            }
            state
        }
        CatalogEvent::FavoriteRemoved(id) => {
            let mut state = state;
            state.favorites.retain(|route| !route.has_id(id));
            state
        }
    }
}

/// Keep the first route for each id, preserving order.
pub fn unique_by_id(routes: &[Route]) -> Vec<Route> {
    let mut unique: Vec<Route> = Vec::with_capacity(routes.len());
    for route in routes {
        if !unique.iter().any(|kept| kept.id == route.id) {
            unique.push(route.clone());
        }
    }
    unique
}
