//! Authentication session: state slice and orchestration.

mod state;
mod store;

pub use state::{reduce, SessionEvent, SessionState};
pub use store::SessionStore;
