// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Host settings bridge. The session keeps authoritative state in memory;
//! the bridge is a best-effort mirror, so every failure here is soft.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::settings::StoredSettings;

/// Trait for settings stores supplied by the host.
pub trait SettingsBridge: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<StoredSettings>> + Send;

    fn store(
        &self,
        settings: &StoredSettings,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// JSON-file bridge under the user's home directory.
pub struct FileSettingsBridge {
    path: PathBuf,
}

impl FileSettingsBridge {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::BridgeUnavailable("no home directory"))?;
        Ok(Self {
            path: home.join(".kaiwa").join("settings.json"),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsBridge for FileSettingsBridge {
    /// A missing file is not an error, just first run.
    async fn load(&self) -> Result<StoredSettings> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(StoredSettings::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn store(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Bridge for hosts without persistence. Loads report unavailable so the
/// session falls back to defaults with a single status line.
pub struct NullBridge;

impl SettingsBridge for NullBridge {
    async fn load(&self) -> Result<StoredSettings> {
        Err(Error::BridgeUnavailable("settings bridge not configured"))
    }

    async fn store(&self, _settings: &StoredSettings) -> Result<()> {
        Err(Error::BridgeUnavailable("settings bridge not configured"))
    }
}

#[cfg(test)]
pub(crate) struct MockBridge {
    stored: std::sync::Mutex<StoredSettings>,
    store_calls: std::sync::atomic::AtomicUsize,
    unavailable: bool,
}

#[cfg(test)]
impl MockBridge {
    pub(crate) fn new() -> Self {
        Self::seeded(StoredSettings::default())
    }

    pub(crate) fn seeded(stored: StoredSettings) -> Self {
        Self {
            stored: std::sync::Mutex::new(stored),
            store_calls: std::sync::atomic::AtomicUsize::new(0),
            unavailable: false,
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    pub(crate) fn store_calls(&self) -> usize {
        self.store_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub(crate) fn stored(&self) -> StoredSettings {
        self.stored.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SettingsBridge for MockBridge {
    async fn load(&self) -> Result<StoredSettings> {
        if self.unavailable {
            return Err(Error::BridgeUnavailable("mock bridge offline"));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn store(&self, settings: &StoredSettings) -> Result<()> {
        if self.unavailable {
            return Err(Error::BridgeUnavailable("mock bridge offline"));
        }
        *self.stored.lock().unwrap() = settings.clone();
        self.store_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ImageAspect;

    #[tokio::test]
    async fn test_file_bridge_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let bridge = FileSettingsBridge::with_path(dir.path().join("nested").join("settings.json"));

        let mut settings = StoredSettings::default();
        settings.image_aspect = ImageAspect::Landscape;
        settings.image_count = 3;

        bridge.store(&settings).await.unwrap();
        assert_eq!(bridge.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_file_bridge_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let bridge = FileSettingsBridge::with_path(dir.path().join("settings.json"));
        assert_eq!(bridge.load().await.unwrap(), StoredSettings::default());
    }

    #[tokio::test]
    async fn test_file_bridge_surfaces_corrupt_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"not json").unwrap();

        let bridge = FileSettingsBridge::with_path(path);
        assert!(bridge.load().await.is_err());
    }

    #[tokio::test]
    async fn test_null_bridge_reports_unavailable() {
        let err = NullBridge.load().await.unwrap_err();
        assert!(matches!(err, Error::BridgeUnavailable(_)));
    }
}
