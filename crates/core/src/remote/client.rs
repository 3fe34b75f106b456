use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{Directory, UserQuery};
use crate::{
    config::AppConfig,
    error::SyncError,
    models::{Route, UserRecord},
};

const USERS_PATH: &str = "users";
const ROUTES_PATH: &str = "routes";

/// HTTP client for the remote user and route directory.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
}

impl DirectoryClient {
    /// Build a client from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::with_client(http, &config.api_base_url))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL every request is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn find_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, SyncError> {
        let url = self.endpoint(USERS_PATH);
        debug!("looking up users at {url} for {}", query.email);
        let response = self
            .http
            .get(&url)
            .query(&query.pairs())
            .send()
            .await
            .map_err(transport)?;
        decode(&url, response).await
    }

    async fn create_user(&self, user: &UserRecord) -> Result<UserRecord, SyncError> {
        let url = self.endpoint(USERS_PATH);
        info!("creating user record at {url}");
        let response = self
            .http
            .post(&url)
            .json(user)
            .send()
            .await
            .map_err(transport)?;
        decode(&url, response).await
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>, SyncError> {
        let url = self.endpoint(ROUTES_PATH);
        debug!("fetching routes from {url}");
        let response = self.http.get(&url).send().await.map_err(transport)?;
        decode(&url, response).await
    }
}

fn transport(err: reqwest::Error) -> SyncError {
    SyncError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, SyncError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await.map_err(transport)?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = DirectoryClient::with_client(Client::new(), "http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.endpoint(USERS_PATH), "http://localhost:3000/users");
        assert_eq!(client.endpoint(ROUTES_PATH), "http://localhost:3000/routes");
    }

    #[test]
    fn queries_only_send_supplied_filters() {
        assert_eq!(UserQuery::by_email("a@b.com").pairs(), vec![("email", "a@b.com")]);
        assert_eq!(
            UserQuery::by_credentials("a@b.com", "x").pairs(),
            vec![("email", "a@b.com"), ("password", "x")]
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_fault() {
        let client = DirectoryClient::with_client(Client::new(), "http://127.0.0.1:9");
        match client.fetch_routes().await {
            Err(SyncError::Transport(_)) => {}
            other => panic!("expected transport fault, got {other:?}"),
        }
    }
}
