//! In-memory fakes for driving the stores in tests.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    error::SyncError,
    models::{Route, UserRecord},
    remote::{Directory, UserQuery},
    storage::{DurableStore, MemoryStore, StorageError},
};

/// Scriptable [`Directory`] that counts calls.
#[derive(Default)]
pub struct FakeDirectory {
    users: Mutex<Vec<UserRecord>>,
    routes: Mutex<Vec<Route>>,
    lookup_fault: Mutex<Option<String>>,
    lookup_delay: Mutex<Option<Duration>>,
    routes_fault: Mutex<Option<String>>,
    queued_routes: Mutex<VecDeque<(Duration, Vec<Route>)>>,
    reject_creates: AtomicBool,
    calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.users
            .lock()
            .push(UserRecord::new(email).with_field("password", password));
        self
    }

    pub fn with_routes(self, routes: Vec<Route>) -> Self {
        *self.routes.lock() = routes;
        self
    }

    pub fn fail_lookups(&self, message: &str) {
        *self.lookup_fault.lock() = Some(message.to_string());
    }

    pub fn delay_lookups(&self, delay: Duration) {
        *self.lookup_delay.lock() = Some(delay);
    }

    pub fn fail_routes(&self, message: &str) {
        *self.routes_fault.lock() = Some(message.to_string());
    }

    /// Answer the next route fetch with `routes` after `delay`. Queued replies
    /// are consumed in call order before the default routes are used.
    pub fn queue_routes(&self, delay: Duration, routes: Vec<Route>) {
        self.queued_routes.lock().push_back((delay, routes));
    }

    pub fn reject_creates(&self) {
        self.reject_creates.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().len()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn find_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.lookup_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.lookup_fault.lock().clone() {
            return Err(SyncError::Transport(message));
        }
        let users = self.users.lock();
        Ok(users
            .iter()
            .filter(|user| user.email == query.email)
            .filter(|user| match query.password.as_deref() {
                Some(password) => user.field("password").and_then(Value::as_str) == Some(password),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: &UserRecord) -> Result<UserRecord, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_creates.load(Ordering::SeqCst) {
            return Err(SyncError::Status {
                url: "fake://users".to_string(),
                status: 500,
            });
        }
        let mut users = self.users.lock();
        let record = user
            .clone()
            .with_field("id", (users.len() + 1).to_string());
        users.push(record.clone());
        Ok(record)
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.queued_routes.lock().pop_front();
        if let Some((delay, routes)) = queued {
            tokio::time::sleep(delay).await;
            return Ok(routes);
        }
        if let Some(message) = self.routes_fault.lock().clone() {
            return Err(SyncError::Transport(message));
        }
        Ok(self.routes.lock().clone())
    }
}

/// [`DurableStore`] with switchable failures and optional write latency.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock() = Some(delay);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.raw(key)
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Io("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("remove refused".to_string()));
        }
        self.inner.remove(key).await
    }
}
