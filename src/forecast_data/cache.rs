//! Time-boxed on-disk cache for raw forecast response bodies.
//!
//! Entries are keyed by the SHA-256 of the full request URL and considered
//! fresh while their modification time is younger than `expire_after`.

use crate::forecast_data::error::ForecastDataError;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

/// Default lifetime of a cached response.
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache_dir: PathBuf,
    expire_after: Duration,
}

impl ResponseCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_expiry(cache_dir, DEFAULT_EXPIRE_AFTER)
    }

    pub fn with_expiry(cache_dir: &Path, expire_after: Duration) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            expire_after,
        }
    }

    /// Path of the cache file for a request URL.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Returns the cached body for `url` if a fresh entry exists.
    pub async fn get(&self, url: &str) -> Result<Option<String>, ForecastDataError> {
        let path = self.entry_path(url);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cache entry at {:?}", path);
                return Ok(None);
            }
            Err(e) => return Err(ForecastDataError::CacheMetadataRead(path, e)),
        };

        let modified = metadata
            .modified()
            .map_err(|e| ForecastDataError::CacheMetadataRead(path.clone(), e))?;
        // A modification time in the future (clock skew) counts as brand new.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age >= self.expire_after {
            info!(
                "Cache entry {:?} expired ({}s old, limit {}s)",
                path,
                age.as_secs(),
                self.expire_after.as_secs()
            );
            return Ok(None);
        }

        let body = fs::read_to_string(&path)
            .await
            .map_err(|e| ForecastDataError::CacheRead(path.clone(), e))?;
        info!("Cache hit for {} ({}s old)", url, age.as_secs());
        Ok(Some(body))
    }

    /// Stores a response body for `url`, creating the cache directory if needed.
    pub async fn put(&self, url: &str, body: &str) -> Result<(), ForecastDataError> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ForecastDataError::CacheDirCreation(self.cache_dir.clone(), e))?;

        let path = self.entry_path(url);
        fs::write(&path, body)
            .await
            .map_err(|e| ForecastDataError::CacheWrite(path.clone(), e))?;
        info!("Cached {} bytes for {} at {:?}", body.len(), url, path);
        Ok(())
    }
}
