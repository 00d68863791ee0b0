//! In-memory backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use vaultdeck_common::{Error, Result, SecretString, VaultState};

use crate::api::VaultApi;
use crate::wire::{
    AppConfig, AppOptions, AppOptionsPatch, AppVersion, SubPathListing, VaultCredential,
    VaultOptionsPatch, VaultRecord,
};

/// In-memory vault entry.
struct StoredVault {
    record: VaultRecord,
    password: String,
    masterkey: String,
}

/// In-memory backend implementing the full API surface.
///
/// Useful for tests and offline development. Mirrors the real backend's
/// envelope error codes (5 for a wrong password) and counts requests so
/// tests can assert that local no-ops never reach the backend. All data is
/// lost on drop.
pub struct MemoryBackend {
    vaults: RwLock<Vec<StoredVault>>,
    options: RwLock<AppOptions>,
    version: AppVersion,
    sub_paths: RwLock<HashMap<String, Vec<String>>>,
    requests: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            vaults: RwLock::new(Vec::new()),
            options: RwLock::new(AppOptions::default()),
            version: AppVersion {
                version: "0.1.0-dev".to_string(),
                git_commit: "0000000".to_string(),
                build_time: String::new(),
            },
            sub_paths: RwLock::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Seed a locked vault; returns its generated id.
    pub fn insert_vault(&self, path: &str, password: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.insert_vault_with_id(&id, path, password);
        id
    }

    /// Seed a locked vault under a caller-chosen id.
    pub fn insert_vault_with_id(&self, id: &str, path: &str, password: &str) {
        let record = VaultRecord {
            id: id.to_string(),
            path: path.to_string(),
            mountpoint: String::new(),
            autoreveal: false,
            readonly: false,
            state: VaultState::Locked,
        };
        self.vaults.write().unwrap().push(StoredVault {
            record,
            password: password.to_string(),
            masterkey: Uuid::new_v4().to_string(),
        });
    }

    /// Seed the directory listing returned for `pwd`.
    pub fn insert_sub_paths(&self, pwd: &str, items: Vec<String>) {
        self.sub_paths
            .write()
            .unwrap()
            .insert(pwd.to_string(), items);
    }

    /// Number of API calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn not_found(vault_id: &str) -> Error {
        Error::Api {
            code: 2,
            message: format!("vault not found: {}", vault_id),
        }
    }

    fn invalid_password() -> Error {
        Error::Api {
            code: 5,
            message: "invalid password".to_string(),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultApi for MemoryBackend {
    async fn list_vaults(&self) -> Result<Vec<VaultRecord>> {
        self.touch();
        let vaults = self.vaults.read().unwrap();
        Ok(vaults.iter().map(|v| v.record.clone()).collect())
    }

    async fn add_vault(&self, path: &str) -> Result<VaultRecord> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        if vaults.iter().any(|v| v.record.path == path) {
            return Err(Error::Api {
                code: 3,
                message: format!("vault already registered: {}", path),
            });
        }
        let record = VaultRecord {
            id: Uuid::new_v4().to_string(),
            path: path.to_string(),
            mountpoint: String::new(),
            autoreveal: false,
            readonly: false,
            state: VaultState::Locked,
        };
        vaults.push(StoredVault {
            record: record.clone(),
            password: String::new(),
            masterkey: Uuid::new_v4().to_string(),
        });
        Ok(record)
    }

    async fn create_vault(
        &self,
        _name: &str,
        path: &str,
        password: &SecretString,
    ) -> Result<VaultRecord> {
        self.touch();
        let record = VaultRecord {
            id: Uuid::new_v4().to_string(),
            path: path.to_string(),
            mountpoint: String::new(),
            autoreveal: false,
            readonly: false,
            state: VaultState::Locked,
        };
        self.vaults.write().unwrap().push(StoredVault {
            record: record.clone(),
            password: password.expose().to_string(),
            masterkey: Uuid::new_v4().to_string(),
        });
        Ok(record)
    }

    async fn remove_vault(&self, vault_id: &str) -> Result<()> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        let before = vaults.len();
        vaults.retain(|v| v.record.id != vault_id);
        if vaults.len() == before {
            return Err(Self::not_found(vault_id));
        }
        Ok(())
    }

    async fn lock_vault(&self, vault_id: &str) -> Result<VaultState> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        let vault = vaults
            .iter_mut()
            .find(|v| v.record.id == vault_id)
            .ok_or_else(|| Self::not_found(vault_id))?;
        vault.record.state = VaultState::Locked;
        Ok(VaultState::Locked)
    }

    async fn unlock_vault(&self, vault_id: &str, password: &SecretString) -> Result<VaultState> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        let vault = vaults
            .iter_mut()
            .find(|v| v.record.id == vault_id)
            .ok_or_else(|| Self::not_found(vault_id))?;
        if vault.password != password.expose() {
            return Err(Self::invalid_password());
        }
        vault.record.state = VaultState::Unlocked;
        Ok(VaultState::Unlocked)
    }

    async fn reveal_mountpoint(&self, vault_id: &str) -> Result<()> {
        self.touch();
        let vaults = self.vaults.read().unwrap();
        if !vaults.iter().any(|v| v.record.id == vault_id) {
            return Err(Self::not_found(vault_id));
        }
        Ok(())
    }

    async fn reveal_vault(&self, vault_id: &str) -> Result<()> {
        self.touch();
        let vaults = self.vaults.read().unwrap();
        if !vaults.iter().any(|v| v.record.id == vault_id) {
            return Err(Self::not_found(vault_id));
        }
        Ok(())
    }

    async fn update_vault_options(
        &self,
        vault_id: &str,
        patch: &VaultOptionsPatch,
    ) -> Result<VaultRecord> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        let vault = vaults
            .iter_mut()
            .find(|v| v.record.id == vault_id)
            .ok_or_else(|| Self::not_found(vault_id))?;
        if let Some(autoreveal) = patch.autoreveal {
            vault.record.autoreveal = autoreveal;
        }
        if let Some(readonly) = patch.readonly {
            vault.record.readonly = readonly;
        }
        if let Some(mountpoint) = &patch.mountpoint {
            vault.record.mountpoint = mountpoint.clone();
        }
        Ok(vault.record.clone())
    }

    async fn change_vault_password(
        &self,
        vault_id: &str,
        credential: &VaultCredential,
        new_password: &SecretString,
    ) -> Result<String> {
        self.touch();
        let mut vaults = self.vaults.write().unwrap();
        let vault = vaults
            .iter_mut()
            .find(|v| v.record.id == vault_id)
            .ok_or_else(|| Self::not_found(vault_id))?;
        let authorized = match credential {
            VaultCredential::Password(secret) => vault.password == secret.expose(),
            VaultCredential::Masterkey(secret) => vault.masterkey == secret.expose(),
        };
        if !authorized {
            return Err(Self::invalid_password());
        }
        vault.password = new_password.expose().to_string();
        Ok("password changed".to_string())
    }

    async fn reveal_masterkey(
        &self,
        vault_id: &str,
        password: &SecretString,
    ) -> Result<SecretString> {
        self.touch();
        let vaults = self.vaults.read().unwrap();
        let vault = vaults
            .iter()
            .find(|v| v.record.id == vault_id)
            .ok_or_else(|| Self::not_found(vault_id))?;
        if vault.password != password.expose() {
            return Err(Self::invalid_password());
        }
        Ok(SecretString::new(vault.masterkey.clone()))
    }

    async fn app_config(&self) -> Result<AppConfig> {
        self.touch();
        Ok(AppConfig {
            version: self.version.clone(),
            options: self.options.read().unwrap().clone(),
        })
    }

    async fn set_app_options(&self, patch: &AppOptionsPatch) -> Result<()> {
        self.touch();
        let mut options = self.options.write().unwrap();
        if let Some(locale) = &patch.locale {
            options.locale = Some(locale.clone());
        }
        if let Some(loglevel) = &patch.loglevel {
            options.loglevel = Some(loglevel.clone());
        }
        Ok(())
    }

    async fn list_sub_paths(&self, pwd: &str) -> Result<SubPathListing> {
        self.touch();
        let sub_paths = self.sub_paths.read().unwrap();
        Ok(SubPathListing {
            pwd: pwd.to_string(),
            items: sub_paths.get(pwd).cloned().unwrap_or_default(),
            sep: "/".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unlock_with_wrong_password() {
        let backend = MemoryBackend::new();
        let id = backend.insert_vault("/home/u/Secret", "correct");

        let result = backend
            .unlock_vault(&id, &SecretString::new("wrong"))
            .await;
        match result {
            Err(Error::Api { code, message }) => {
                assert_eq!(code, 5);
                assert_eq!(message, "invalid password");
            }
            other => panic!("expected code-5 error, got {:?}", other.map(|_| ())),
        }

        // Still locked.
        let vaults = backend.list_vaults().await.unwrap();
        assert_eq!(vaults[0].state, VaultState::Locked);
    }

    #[tokio::test]
    async fn test_lock_unlock_cycle() {
        let backend = MemoryBackend::new();
        let id = backend.insert_vault("/v", "pw");

        let state = backend
            .unlock_vault(&id, &SecretString::new("pw"))
            .await
            .unwrap();
        assert_eq!(state, VaultState::Unlocked);

        let state = backend.lock_vault(&id).await.unwrap();
        assert_eq!(state, VaultState::Locked);
    }

    #[tokio::test]
    async fn test_add_duplicate_path_rejected() {
        let backend = MemoryBackend::new();
        backend.add_vault("/data/vault").await.unwrap();

        let result = backend.add_vault("/data/vault").await;
        assert!(matches!(result, Err(Error::Api { code: 3, .. })));
    }

    #[tokio::test]
    async fn test_change_password_with_masterkey() {
        let backend = MemoryBackend::new();
        let id = backend.insert_vault("/v", "old");

        let masterkey = backend
            .reveal_masterkey(&id, &SecretString::new("old"))
            .await
            .unwrap();

        let msg = backend
            .change_vault_password(
                &id,
                &VaultCredential::Masterkey(masterkey),
                &SecretString::new("new"),
            )
            .await
            .unwrap();
        assert_eq!(msg, "password changed");

        backend
            .unlock_vault(&id, &SecretString::new("new"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reveal_vault_unknown_id() {
        let backend = MemoryBackend::new();
        let id = backend.insert_vault("/v", "pw");

        backend.reveal_vault(&id).await.unwrap();

        let result = backend.reveal_vault("missing").await;
        assert!(matches!(result, Err(Error::Api { code: 2, .. })));
    }

    #[tokio::test]
    async fn test_request_counter() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.request_count(), 0);

        backend.list_vaults().await.unwrap();
        backend.app_config().await.unwrap();
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_sub_paths_default_empty() {
        let backend = MemoryBackend::new();
        let listing = backend.list_sub_paths("/home").await.unwrap();
        assert_eq!(listing.pwd, "/home");
        assert!(listing.items.is_empty());
        assert_eq!(listing.sep, "/");
    }
}
