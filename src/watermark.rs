//! Persistence of the timestamp of the last entry delivered to the chat.
//!
//! The file holds the decimal form of a single `f64`. A missing file is the normal
//! state before the first delivery; any other read failure is logged and treated the
//! same way, which makes the next batch send only the most recent entry.

use crate::error::WatermarkError;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, error, info};

pub struct WatermarkStore {
    path: PathBuf,
    // Outer `None` means the file has not been consulted yet.
    cached: Option<Option<f64>>,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    /// Read the stored value straight from disk, bypassing the cache.
    pub fn read(&self) -> Result<f64, WatermarkError> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => WatermarkError::NotFound(self.path.clone()),
            _ => WatermarkError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        content
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|ts| ts.is_finite())
            .ok_or_else(|| WatermarkError::Parse {
                path: self.path.clone(),
                content,
            })
    }

    /// Write `timestamp` to disk, replacing the previous value.
    pub fn write(&self, timestamp: f64) -> Result<(), WatermarkError> {
        let io_err = |source| WatermarkError::Io {
            path: self.path.clone(),
            source,
        };
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, timestamp.to_string()).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    /// The last delivered timestamp, or `None` if nothing has been delivered yet.
    /// Only the first call touches the disk.
    pub fn load(&mut self) -> Option<f64> {
        if let Some(cached) = self.cached {
            return cached;
        }

        let loaded = match self.read() {
            Ok(ts) => Some(ts),
            Err(WatermarkError::NotFound(path)) => {
                debug!("Watermark file {} not found", path.display());
                None
            }
            Err(e) => {
                error!("Error while reading the watermark file: {}", e);
                None
            }
        };
        self.cached = Some(loaded);
        loaded
    }

    /// Record `timestamp` as delivered. The in-memory value is updated even when the
    /// write fails, so later batches in this process still filter correctly.
    pub fn save(&mut self, timestamp: f64) {
        info!("Updating watermark file with timestamp {}", timestamp);
        self.cached = Some(Some(timestamp));
        crate::metrics::watermark_advanced(timestamp);

        if let Err(e) = self.write(timestamp) {
            error!("Error while writing the watermark file: {}", e);
            crate::metrics::watermark_write_failed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let mut store = WatermarkStore::new(dir.path().join("last_update"));
        assert!(matches!(store.read(), Err(WatermarkError::NotFound(_))));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn saved_value_survives_a_fresh_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_update");
        let ts = 1591052400.123456;

        WatermarkStore::new(&path).save(ts);

        let mut fresh = WatermarkStore::new(&path);
        assert_eq!(fresh.load(), Some(ts));
    }

    #[test]
    fn garbage_content_is_a_parse_error_and_treated_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_update");
        fs::write(&path, "not a number").unwrap();

        let mut store = WatermarkStore::new(&path);
        assert!(matches!(store.read(), Err(WatermarkError::Parse { .. })));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_update");
        fs::write(&path, "1591052400.5\n").unwrap();

        assert_eq!(WatermarkStore::new(&path).read().unwrap(), 1591052400.5);
    }

    #[test]
    fn load_is_cached_after_first_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_update");
        fs::write(&path, "100").unwrap();

        let mut store = WatermarkStore::new(&path);
        assert_eq!(store.load(), Some(100.0));

        fs::write(&path, "200").unwrap();
        assert_eq!(store.load(), Some(100.0));
    }

    #[test]
    fn absent_result_is_cached_too() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("last_update");

        let mut store = WatermarkStore::new(&path);
        assert_eq!(store.load(), None);

        fs::write(&path, "300").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn failed_write_still_updates_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("last_update");

        let mut store = WatermarkStore::new(&path);
        assert!(matches!(store.write(5.0), Err(WatermarkError::Io { .. })));

        store.save(42.5);
        assert_eq!(store.load(), Some(42.5));
        assert!(!path.exists());
    }
}
