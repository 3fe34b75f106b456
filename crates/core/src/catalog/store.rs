use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{fallback_routes, CatalogEvent, RouteOrigin};
use crate::{
    error::Outcome,
    models::Route,
    remote::Directory,
    state::{InFlight, StateContainer},
    storage::{self, DurableStore},
};

/// Orchestrates route fetching and favorite management for the catalog slice.
///
/// Clones share the favorites lock, so toggles issued through any clone are
/// serialised against each other.
#[derive(Clone)]
pub struct CatalogStore {
    state: StateContainer,
    directory: Arc<dyn Directory>,
    storage: Arc<dyn DurableStore>,
    routes_key: String,
    favorites_key: String,
    favorites_lock: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Attach a catalog store to `state`.
    pub fn new(
        state: StateContainer,
        directory: Arc<dyn Directory>,
        storage: Arc<dyn DurableStore>,
        routes_key: impl Into<String>,
        favorites_key: impl Into<String>,
    ) -> Self {
        Self {
            state,
            directory,
            storage,
            routes_key: routes_key.into(),
            favorites_key: favorites_key.into(),
            favorites_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the routes with the remote collection, or with the built-in
    /// dataset when the remote is unreachable, malformed or empty. Always
    /// succeeds; the catalog is never empty afterwards.
    pub async fn fetch_routes(&self) -> Outcome {
        self.state.dispatch(CatalogEvent::FetchStarted);
        let pending = InFlight::new(&self.state, CatalogEvent::FetchAbandoned);

        match self.directory.fetch_routes().await {
            Ok(routes) if !routes.is_empty() => {
                info!("fetched {} routes", routes.len());
                self.install(routes.clone(), RouteOrigin::Remote);
                pending.settle();
                storage::write_json(self.storage.as_ref(), &self.routes_key, &routes).await;
            }
            Ok(_) => {
                warn!("remote catalog is empty, using built-in routes");
                self.install(fallback_routes(), RouteOrigin::Fallback);
                pending.settle();
            }
            Err(err) => {
                warn!("route fetch failed, using built-in routes: {err}");
                self.install(fallback_routes(), RouteOrigin::Fallback);
                pending.settle();
            }
        }
        Outcome::ok()
    }

    /// Install the offline route mirror, unless a fetch already completed.
    /// `success` reports whether a mirror was found.
    pub async fn load_cached_routes(&self) -> Outcome {
        match storage::read_json::<Vec<Route>>(self.storage.as_ref(), &self.routes_key).await {
            Some(routes) if !routes.is_empty() => {
                debug!("loaded {} cached routes", routes.len());
                self.install(routes, RouteOrigin::Cache);
                Outcome::ok()
            }
            _ => Outcome::skipped(),
        }
    }

    /// Replace favorites with the persisted collection. `success` reports
    /// whether one was found; failures leave favorites untouched.
    pub async fn load_favorites(&self) -> Outcome {
        let _guard = self.favorites_lock.lock().await;
        match storage::read_json::<Vec<Route>>(self.storage.as_ref(), &self.favorites_key).await {
            Some(favorites) => {
                debug!("loaded {} favorites", favorites.len());
                self.state.dispatch(CatalogEvent::FavoritesLoaded(favorites));
                Outcome::ok()
            }
            None => Outcome::skipped(),
        }
    }

    /// Add `route` to favorites, or remove the favorite sharing its id, then
    /// persist the resulting collection.
    pub async fn toggle_favorite(&self, route: &Route) -> Outcome {
        let _guard = self.favorites_lock.lock().await;
        let mut favorites = self.state.select(|state| state.catalog.favorites.clone());

        if favorites.iter().any(|favorite| favorite.has_id(&route.id)) {
            favorites.retain(|favorite| !favorite.has_id(&route.id));
            self.state
                .dispatch(CatalogEvent::FavoriteRemoved(route.id.clone()));
            info!("removed {} from favorites", route.display_name());
        } else {
            favorites.push(route.clone());
            self.state.dispatch(CatalogEvent::FavoriteAdded(route.clone()));
            info!("added {} to favorites", route.display_name());
        }

        storage::write_json(self.storage.as_ref(), &self.favorites_key, &favorites).await;
        Outcome::ok()
    }

    /// Whether the route with `id` is currently a favorite.
    pub fn is_favorite(&self, id: &Value) -> bool {
        self.state.select(|state| state.catalog.is_favorite(id))
    }

    fn install(&self, routes: Vec<Route>, origin: RouteOrigin) {
        self.state.dispatch(CatalogEvent::RoutesInstalled {
            routes,
            origin,
            at: Utc::now(),
        });
    }
}
