//! Remote directory access.

/// `reqwest` implementation of [`Directory`].
pub mod client;

use async_trait::async_trait;

use crate::{
    error::SyncError,
    models::{Route, UserRecord},
};

pub use client::DirectoryClient;

/// Filter for `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Email to match.
    pub email: String,
    /// Password to match. `None` turns the query into an existence check.
    pub password: Option<String>,
}

impl UserQuery {
    /// Existence check by email.
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
        }
    }

    /// Credential match on email and password.
    pub fn by_credentials(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
        }
    }

    /// Query string pairs in request order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("email", self.email.as_str())];
        if let Some(password) = self.password.as_deref() {
            pairs.push(("password", password));
        }
        pairs
    }
}

/// The user and route endpoints the stores depend on. No retries.
#[async_trait]
pub trait Directory: Send + Sync {
    /// `GET /users` filtered by `query`. Zero or more matches.
    async fn find_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, SyncError>;

    /// `POST /users`. A non-success status is [`SyncError::Status`].
    async fn create_user(&self, user: &UserRecord) -> Result<UserRecord, SyncError>;

    /// `GET /routes`, the full collection.
    async fn fetch_routes(&self) -> Result<Vec<Route>, SyncError>;
}
