use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::{fs, task};
use tracing::debug;

use super::{DurableStore, StorageError};

/// Durable store keeping one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the entry files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.entry_path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.entry_path(key);
        let root = self.root.clone();
        let target = path.clone();
        let contents = value.to_owned();

        // Each write stages into its own temp file, so overlapping writes to
        // one key never share a staging path; the last rename wins.
        task::spawn_blocking(move || -> Result<(), StorageError> {
            let mut staging = NamedTempFile::new_in(&root)?;
            staging.write_all(contents.as_bytes())?;
            staging.as_file().sync_all()?;
            staging
                .persist(&target)
                .map_err(|err| StorageError::from(err.error))?;
            Ok(())
        })
        .await
        .map_err(|err| StorageError::Io(format!("write task failed: {err}")))??;

        debug!("wrote `{key}` to {}", path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn sanitize_key(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            result.push(ch);
        } else {
            result.push('_');
        }
    }
    let trimmed = result.trim_start_matches('.');
    if trimmed.is_empty() {
        "entry".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[tokio::test]
    async fn values_survive_a_fresh_instance() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("store");

        let store = FileStore::new(&root);
        assert_eq!(store.get("user").await?, None);
        store.set("user", r#"{"email":"a@b.com"}"#).await?;
        store.set("user", r#"{"email":"c@d.com"}"#).await?;

        let reopened = FileStore::new(&root);
        assert_eq!(
            reopened.get("user").await?,
            Some(r#"{"email":"c@d.com"}"#.to_string())
        );

        reopened.remove("user").await?;
        assert_eq!(store.get("user").await?, None);
        reopened.remove("user").await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_writes_to_one_key_all_land() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path());
        let short = r#"[{"id":"1"}]"#.to_string();
        let long = format!(r#"[{{"id":"2","name":"{}"}}]"#, "x".repeat(4096));

        for _ in 0..100 {
            let first = tokio::spawn({
                let store = store.clone();
                let value = short.clone();
                async move { store.set("routes", &value).await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                let value = long.clone();
                async move { store.set("routes", &value).await }
            });
            first.await??;
            second.await??;

            let stored = store.get("routes").await?;
            assert!(stored == Some(short.clone()) || stored == Some(long.clone()));
        }

        let entries = std::fs::read_dir(dir.path())?.count();
        assert_eq!(entries, 1, "staging files must not be left behind");
        Ok(())
    }

    #[test]
    fn keys_map_to_safe_file_names() {
        assert_eq!(sanitize_key("favorites"), "favorites");
        assert_eq!(sanitize_key("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_key("..."), "entry");
    }
}
