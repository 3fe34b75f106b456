//! Wiring of adapters, state container and stores.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::{
    catalog::{CatalogStore, RouteOrigin},
    config::{AppConfig, StorageKeys},
    remote::{Directory, DirectoryClient},
    session::SessionStore,
    state::StateContainer,
    storage::{DurableStore, FileStore},
};

/// Summary of a cold start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColdStartReport {
    /// A stored session was restored.
    pub session_restored: bool,
    /// Favorites present after loading the mirror.
    pub favorites: usize,
    /// Routes installed after the fetch.
    pub routes: usize,
    /// Source of the installed routes.
    pub origin: Option<RouteOrigin>,
}

/// Both stores attached to one shared state container.
#[derive(Clone)]
pub struct SyncCore {
    state: StateContainer,
    session: SessionStore,
    catalog: CatalogStore,
}

impl SyncCore {
    /// Build the production stack: HTTP directory client and file-backed store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let directory = Arc::new(DirectoryClient::new(config)?);
        let storage = Arc::new(FileStore::new(&config.storage_root));
        info!(
            "using directory {} with store at {}",
            directory.base_url(),
            storage.root().display()
        );
        Ok(Self::with_adapters(directory, storage, &config.keys))
    }

    /// Build on caller-supplied adapters.
    pub fn with_adapters(
        directory: Arc<dyn Directory>,
        storage: Arc<dyn DurableStore>,
        keys: &StorageKeys,
    ) -> Self {
        let state = StateContainer::new();
        let session = SessionStore::new(
            state.clone(),
            Arc::clone(&directory),
            Arc::clone(&storage),
            keys.session.clone(),
        );
        let catalog = CatalogStore::new(
            state.clone(),
            directory,
            storage,
            keys.routes.clone(),
            keys.favorites.clone(),
        );
        Self {
            state,
            session,
            catalog,
        }
    }

    /// Shared state container.
    pub fn state(&self) -> &StateContainer {
        &self.state
    }

    /// Session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Catalog store.
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Restore everything the durable mirror holds, then refresh the routes.
    pub async fn cold_start(&self) -> ColdStartReport {
        let (resumed, _, _) = tokio::join!(
            self.session.resume(),
            self.catalog.load_favorites(),
            self.catalog.load_cached_routes(),
        );
        self.catalog.fetch_routes().await;

        let report = self.state.select(|state| ColdStartReport {
            session_restored: resumed.success,
            favorites: state.catalog.favorites.len(),
            routes: state.catalog.routes.len(),
            origin: state.catalog.origin,
        });
        info!(
            "cold start complete: session restored={}, {} favorites, {} routes ({:?})",
            report.session_restored, report.favorites, report.routes, report.origin
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::fallback_routes,
        models::{Credentials, Route},
        storage::MemoryStore,
        testing::FakeDirectory,
    };

    #[tokio::test]
    async fn cold_start_restores_previous_process() {
        let storage = MemoryStore::new();
        let keys = StorageKeys::default();

        let first = SyncCore::with_adapters(
            Arc::new(FakeDirectory::new().with_user("a@b.com", "x")),
            Arc::new(storage.clone()),
            &keys,
        );
        assert!(first.session().login(&Credentials::new("a@b.com", "x")).await.success);
        first.catalog().toggle_favorite(&Route::new("R1")).await;

        let directory = Arc::new(FakeDirectory::new());
        directory.fail_routes("offline");
        let restarted = SyncCore::with_adapters(directory, Arc::new(storage), &keys);
        let report = restarted.cold_start().await;

        assert_eq!(
            report,
            ColdStartReport {
                session_restored: true,
                favorites: 1,
                routes: fallback_routes().len(),
                origin: Some(RouteOrigin::Fallback),
            }
        );
        let state = restarted.state().get_state();
        assert_eq!(
            state.session.user.map(|user| user.email),
            Some("a@b.com".to_string())
        );
        assert!(!state.catalog.loading);
    }

    #[tokio::test]
    async fn cold_start_on_empty_store() {
        let directory =
            Arc::new(FakeDirectory::new().with_routes(vec![Route::new("1"), Route::new("2")]));
        let core = SyncCore::with_adapters(
            directory,
            Arc::new(MemoryStore::new()),
            &StorageKeys::default(),
        );

        let report = core.cold_start().await;
        assert!(!report.session_restored);
        assert_eq!(report.favorites, 0);
        assert_eq!(report.routes, 2);
        assert_eq!(report.origin, Some(RouteOrigin::Remote));
    }
}
