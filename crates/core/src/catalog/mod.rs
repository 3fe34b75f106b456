//! Route catalog and favorites: state slice and orchestration.

mod fallback;
mod state;
mod store;

pub use fallback::fallback_routes;
pub use state::{reduce, unique_by_id, CatalogEvent, CatalogState, RouteOrigin};
pub use store::CatalogStore;
