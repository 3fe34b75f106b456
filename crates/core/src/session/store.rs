use std::sync::Arc;

use tracing::{debug, info, warn};

use super::SessionEvent;
use crate::{
    error::{Outcome, SyncError},
    models::{Credentials, UserRecord},
    remote::{Directory, UserQuery},
    state::{InFlight, StateContainer},
    storage::{self, DurableStore},
};

const ABANDONED: &str = "Operation cancelled";

/// Orchestrates login, registration, logout and resume for the session slice.
#[derive(Clone)]
pub struct SessionStore {
    state: StateContainer,
    directory: Arc<dyn Directory>,
    storage: Arc<dyn DurableStore>,
    key: String,
}

impl SessionStore {
    /// Attach a session store to `state`. `key` names the session mirror.
    pub fn new(
        state: StateContainer,
        directory: Arc<dyn Directory>,
        storage: Arc<dyn DurableStore>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            state,
            directory,
            storage,
            key: key.into(),
        }
    }

    /// Sign in with the first directory record matching both credentials.
    pub async fn login(&self, credentials: &Credentials) -> Outcome {
        let pending = self.begin();
        let result = self.match_credentials(credentials).await;
        self.finish(pending, result).await
    }

    /// Create a directory record for `user` and sign in as it.
    pub async fn register(&self, user: &UserRecord) -> Outcome {
        let pending = self.begin();
        let result = self.create_account(user).await;
        self.finish(pending, result).await
    }

    /// Drop the session mirror and clear the in-memory session. Storage
    /// failures are logged and never block the logout.
    pub async fn logout(&self) -> Outcome {
        storage::remove_quietly(self.storage.as_ref(), &self.key).await;
        self.state.dispatch(SessionEvent::LoggedOut);
        info!("session cleared");
        Outcome::ok()
    }

    /// Restore a session from the durable mirror without contacting the
    /// directory. `success` reports whether a session was restored; no error is
    /// ever reported.
    pub async fn resume(&self) -> Outcome {
        match storage::read_json::<UserRecord>(self.storage.as_ref(), &self.key).await {
            Some(user) => {
                info!("resumed session for {}", user.email);
                self.state.dispatch(SessionEvent::Restored(user));
                Outcome::ok()
            }
            None => {
                debug!("no stored session to resume");
                Outcome::skipped()
            }
        }
    }

    fn begin(&self) -> InFlight {
        self.state.dispatch(SessionEvent::Started);
        InFlight::new(&self.state, SessionEvent::Failed(ABANDONED.to_string()))
    }

    async fn match_credentials(&self, credentials: &Credentials) -> Result<UserRecord, SyncError> {
        let query = UserQuery::by_credentials(&credentials.email, &credentials.password);
        let matches = self.directory.find_users(&query).await?;
        matches.into_iter().next().ok_or(SyncError::AuthRejected)
    }

    async fn create_account(&self, user: &UserRecord) -> Result<UserRecord, SyncError> {
        let existing = self
            .directory
            .find_users(&UserQuery::by_email(&user.email))
            .await?;
        if !existing.is_empty() {
            return Err(SyncError::ValidationConflict);
        }

        match self.directory.create_user(user).await {
            Ok(created) => Ok(created),
            Err(SyncError::Status { url, status }) => {
                warn!("directory refused registration at {url} with status {status}");
                Err(SyncError::RegistrationRejected)
            }
            Err(err) => Err(err),
        }
    }

    async fn finish(&self, pending: InFlight, result: Result<UserRecord, SyncError>) -> Outcome {
        let outcome = match result {
            Ok(user) => {
                storage::write_json(self.storage.as_ref(), &self.key, &user).await;
                info!("signed in as {}", user.email);
                self.state.dispatch(SessionEvent::Authenticated(user));
                Outcome::ok()
            }
            Err(err) => {
                warn!("authentication failed: {err}");
                self.state.dispatch(SessionEvent::Failed(err.to_string()));
                Outcome::from(&err)
            }
        };
        pending.settle();
        outcome
    }
}
