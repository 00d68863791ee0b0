//! Mirror of the backend's version and application options.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use vaultdeck_client::{AppOptions, AppOptionsPatch, AppVersion, VaultApi};
use vaultdeck_common::{Error, Result};

use crate::error_channel::ErrorChannel;

/// Locally cached application configuration.
///
/// The version is fetched once and effectively immutable; options are
/// updated by partial merges only, so a later update never drops fields a
/// previous one set.
pub struct ConfigStore {
    api: Arc<dyn VaultApi>,
    version: RwLock<Option<AppVersion>>,
    options: RwLock<AppOptions>,
    errors: Arc<ErrorChannel>,
}

impl ConfigStore {
    pub fn new(api: Arc<dyn VaultApi>, errors: Arc<ErrorChannel>) -> Self {
        Self {
            api,
            version: RwLock::new(None),
            options: RwLock::new(AppOptions::default()),
            errors,
        }
    }

    fn fail(&self, err: Error) -> Error {
        self.errors.record(&err);
        err
    }

    /// Fetch version and options from the backend, replacing both locally.
    pub async fn load_app_config(&self) -> Result<()> {
        let config = self.api.app_config().await.map_err(|e| self.fail(e))?;

        *self.version.write().await = Some(config.version);
        *self.options.write().await = config.options;
        Ok(())
    }

    /// Send a partial options update and merge the accepted fields locally.
    ///
    /// A patch with no fields is a local no-op. Fields absent from the patch
    /// keep their current local value.
    pub async fn set_options(&self, patch: &AppOptionsPatch) -> Result<()> {
        if patch.is_empty() {
            debug!("empty app options patch, skipping request");
            return Ok(());
        }

        self.api
            .set_app_options(patch)
            .await
            .map_err(|e| self.fail(e))?;

        let mut options = self.options.write().await;
        if let Some(locale) = &patch.locale {
            options.locale = Some(locale.clone());
        }
        if let Some(loglevel) = &patch.loglevel {
            options.loglevel = Some(loglevel.clone());
        }
        Ok(())
    }

    /// Backend build identification, if fetched.
    pub async fn version(&self) -> Option<AppVersion> {
        self.version.read().await.clone()
    }

    /// Current local options mirror.
    pub async fn options(&self) -> AppOptions {
        self.options.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vaultdeck_client::{LogLevel, MemoryBackend};

    fn config_store() -> (ConfigStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let errors = Arc::new(ErrorChannel::new());
        (ConfigStore::new(backend.clone(), errors), backend)
    }

    #[tokio::test]
    async fn test_load_app_config() {
        let (store, _) = config_store();
        assert!(store.version().await.is_none());

        store.load_app_config().await.unwrap();

        let version = store.version().await.unwrap();
        assert_eq!(version.version, "0.1.0-dev");
    }

    #[tokio::test]
    async fn test_set_options_merges_fields() {
        let (store, _) = config_store();

        store
            .set_options(&AppOptionsPatch {
                locale: Some("fr".to_string()),
                loglevel: None,
            })
            .await
            .unwrap();
        store
            .set_options(&AppOptionsPatch {
                locale: None,
                loglevel: Some(LogLevel::Debug),
            })
            .await
            .unwrap();

        let options = store.options().await;
        assert_eq!(options.locale.as_deref(), Some("fr"));
        assert_eq!(options.loglevel, Some(LogLevel::Debug));
    }

    #[tokio::test]
    async fn test_empty_patch_is_local_noop() {
        let (store, backend) = config_store();
        let before = backend.request_count();

        store.set_options(&AppOptionsPatch::default()).await.unwrap();

        assert_eq!(backend.request_count(), before);
    }

    #[tokio::test]
    async fn test_merge_survives_reload() {
        let (store, _) = config_store();

        store
            .set_options(&AppOptionsPatch {
                locale: Some("fr".to_string()),
                loglevel: None,
            })
            .await
            .unwrap();
        // Backend stored the merge too; a reload must not lose it.
        store.load_app_config().await.unwrap();

        assert_eq!(store.options().await.locale.as_deref(), Some("fr"));
    }
}
