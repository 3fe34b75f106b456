//! Process-wide state container.
//!
//! Both stores share one [`StateContainer`]. Every mutation goes through
//! [`StateContainer::dispatch`], which runs the owning slice's pure reducer and
//! wakes subscribers.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::{
    catalog::{self, CatalogEvent, CatalogState},
    session::{self, SessionEvent, SessionState},
};

/// Snapshot of every slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Authentication slice, owned by [`crate::SessionStore`].
    pub session: SessionState,
    /// Routes and favorites slice, owned by [`crate::CatalogStore`].
    pub catalog: CatalogState,
}

/// Discrete state transition routed to one slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Session slice transition.
    Session(SessionEvent),
    /// Catalog slice transition.
    Catalog(CatalogEvent),
}

impl From<SessionEvent> for Action {
    fn from(event: SessionEvent) -> Self {
        Action::Session(event)
    }
}

impl From<CatalogEvent> for Action {
    fn from(event: CatalogEvent) -> Self {
        Action::Catalog(event)
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: AppState, action: &Action) -> AppState {
    match action {
        Action::Session(event) => AppState {
            session: session::reduce(state.session, event),
            ..state
        },
        Action::Catalog(event) => AppState {
            catalog: catalog::reduce(state.catalog, event),
            ..state
        },
    }
}

/// Shared handle to the application state. Clones refer to the same state.
#[derive(Debug, Clone)]
pub struct StateContainer {
    sender: Arc<watch::Sender<AppState>>,
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateContainer {
    /// Container holding the empty initial state.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AppState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Apply an action and notify subscribers.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        trace!(?action, "dispatch");
        self.sender.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, &action);
        });
    }

    /// Clone of the current state.
    pub fn get_state(&self) -> AppState {
        self.sender.borrow().clone()
    }

    /// Run `f` against the current state without cloning all of it.
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Receiver woken after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.sender.subscribe()
    }
}

/// Dispatches a terminal action if an operation is dropped before it settles,
/// so an abandoned future cannot leave a slice loading forever.
pub(crate) struct InFlight {
    state: StateContainer,
    on_abandon: Option<Action>,
}

impl InFlight {
    pub(crate) fn new(state: &StateContainer, on_abandon: impl Into<Action>) -> Self {
        Self {
            state: state.clone(),
            on_abandon: Some(on_abandon.into()),
        }
    }

    /// The operation reached its own terminal action.
    pub(crate) fn settle(mut self) {
        self.on_abandon = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(action) = self.on_abandon.take() {
            self.state.dispatch(action);
        }
    }
}
