//! The vault collection store.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use vaultdeck_client::{SubPathListing, VaultApi, VaultCredential, VaultOptionsPatch};
use vaultdeck_common::{Error, Result, SecretString};

use crate::error_channel::ErrorChannel;
use crate::vault::Vault;

/// Smallest password length the presentation layer should accept for
/// create and change-password flows.
pub const MINIMAL_PASSWORD_LENGTH: usize = 8;

/// Authoritative local mirror of the backend's vault list.
///
/// Mutation always goes through the backend first; the mirror is updated
/// only from successful responses. Every action writes its failure into the
/// shared [`ErrorChannel`] before returning it, so a presentation layer can
/// observe the channel instead of the `Result`. The collection lock is held
/// only across the synchronous mutation, never across the network await, so
/// overlapping actions interleave at response granularity.
pub struct VaultStore {
    api: Arc<dyn VaultApi>,
    vaults: RwLock<Vec<Vault>>,
    errors: Arc<ErrorChannel>,
}

impl VaultStore {
    pub fn new(api: Arc<dyn VaultApi>, errors: Arc<ErrorChannel>) -> Self {
        Self {
            api,
            vaults: RwLock::new(Vec::new()),
            errors,
        }
    }

    /// The shared notification channel.
    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    /// Record a failed action on the channel and hand the error back.
    fn fail(&self, err: Error) -> Error {
        self.errors.record(&err);
        err
    }

    /// Fetch the vault list and replace the local mirror.
    ///
    /// Every vault comes back unselected; any previous local selection is
    /// dropped along with the replaced collection.
    pub async fn load_vaults(&self) -> Result<()> {
        let records = self.api.list_vaults().await.map_err(|e| self.fail(e))?;

        let mut vaults = self.vaults.write().await;
        *vaults = records.into_iter().map(Vault::from_record).collect();
        debug!(count = vaults.len(), "vault list replaced");
        Ok(())
    }

    /// Register an existing vault directory and append it to the mirror.
    pub async fn add_vault(&self, path: &str) -> Result<()> {
        let record = self.api.add_vault(path).await.map_err(|e| self.fail(e))?;

        self.vaults.write().await.push(Vault::from_record(record));
        Ok(())
    }

    /// Create a brand-new vault and append it to the mirror.
    ///
    /// The password is handed to the gateway once and not retained.
    pub async fn create_vault(
        &self,
        name: &str,
        path: &str,
        password: &SecretString,
    ) -> Result<()> {
        let record = self
            .api
            .create_vault(name, path, password)
            .await
            .map_err(|e| self.fail(e))?;

        self.vaults.write().await.push(Vault::from_record(record));
        Ok(())
    }

    /// Delete a vault and drop it from the mirror.
    ///
    /// Removal filters by id rather than position, so a mirror that went
    /// stale between render and click still removes the right vault.
    pub async fn remove_vault(&self, vault_id: &str) -> Result<()> {
        self.api
            .remove_vault(vault_id)
            .await
            .map_err(|e| self.fail(e))?;

        self.vaults.write().await.retain(|v| v.id != vault_id);
        Ok(())
    }

    /// Lock a vault; the mirrored state becomes whatever the backend
    /// reported.
    pub async fn lock_vault(&self, vault_id: &str) -> Result<()> {
        let state = self
            .api
            .lock_vault(vault_id)
            .await
            .map_err(|e| self.fail(e))?;

        let mut vaults = self.vaults.write().await;
        if let Some(vault) = vaults.iter_mut().find(|v| v.id == vault_id) {
            vault.state = state;
        }
        Ok(())
    }

    /// Unlock a vault. On failure the mirrored state is left untouched.
    pub async fn unlock_vault(&self, vault_id: &str, password: &SecretString) -> Result<()> {
        let state = self
            .api
            .unlock_vault(vault_id, password)
            .await
            .map_err(|e| self.fail(e))?;

        let mut vaults = self.vaults.write().await;
        if let Some(vault) = vaults.iter_mut().find(|v| v.id == vault_id) {
            vault.state = state;
        }
        Ok(())
    }

    /// Ask the backend to open the vault's mountpoint in the file manager.
    pub async fn reveal_mountpoint(&self, vault_id: &str) -> Result<()> {
        self.api
            .reveal_mountpoint(vault_id)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Ask the backend to open the vault's encrypted directory itself,
    /// independent of lock state.
    pub async fn reveal_vault(&self, vault_id: &str) -> Result<()> {
        self.api
            .reveal_vault(vault_id)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Send a partial options update and overwrite the mirrored vault from
    /// the returned record.
    ///
    /// An empty patch is a local no-op: no request is issued and nothing is
    /// mutated.
    pub async fn update_vault_options(
        &self,
        vault_id: &str,
        patch: &VaultOptionsPatch,
    ) -> Result<()> {
        if patch.is_empty() {
            debug!(vault_id, "empty options patch, skipping request");
            return Ok(());
        }

        let record = self
            .api
            .update_vault_options(vault_id, patch)
            .await
            .map_err(|e| self.fail(e))?;

        let mut vaults = self.vaults.write().await;
        if let Some(vault) = vaults.iter_mut().find(|v| v.id == vault_id) {
            vault.apply_record(record);
        }
        Ok(())
    }

    /// Change a vault password.
    ///
    /// Both outcomes surface on the channel: failure with the backend code,
    /// success as a code-0 notice carrying the backend's confirmation. The
    /// success notice is a deliberate user-visible confirmation.
    pub async fn change_vault_password(
        &self,
        vault_id: &str,
        credential: &VaultCredential,
        new_password: &SecretString,
    ) -> Result<()> {
        let msg = self
            .api
            .change_vault_password(vault_id, credential, new_password)
            .await
            .map_err(|e| self.fail(e))?;

        self.errors.notify_success(msg);
        Ok(())
    }

    /// Reveal a vault masterkey.
    ///
    /// The only action whose success value is returned to the caller; the
    /// secret is neither logged nor cached here.
    pub async fn reveal_vault_masterkey(
        &self,
        vault_id: &str,
        password: &SecretString,
    ) -> Result<SecretString> {
        self.api
            .reveal_masterkey(vault_id, password)
            .await
            .map_err(|e| self.fail(e))
    }

    /// List one level of the backend's directory tree.
    pub async fn list_sub_paths(&self, path: &str) -> Result<SubPathListing> {
        self.api
            .list_sub_paths(path)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Select a vault by id, unselecting every other vault. Local-only.
    pub async fn select_vault(&self, vault_id: &str) {
        let mut vaults = self.vaults.write().await;
        apply_selection(&mut vaults, Some(vault_id));
    }

    /// Drop any selection. Local-only.
    pub async fn unselect_vault(&self) {
        let mut vaults = self.vaults.write().await;
        apply_selection(&mut vaults, None);
    }

    /// Snapshot of the mirrored collection.
    pub async fn vaults(&self) -> Vec<Vault> {
        self.vaults.read().await.clone()
    }

    /// The currently selected vault, if any.
    pub async fn selected_vault(&self) -> Option<Vault> {
        self.vaults
            .read()
            .await
            .iter()
            .find(|v| v.selected)
            .cloned()
    }

    /// Number of mirrored vaults.
    pub async fn vault_count(&self) -> usize {
        self.vaults.read().await.len()
    }
}

/// Flip selection flags so that exactly the vault with `target` id (if
/// present) is selected. Scans the whole collection; collections are small.
pub(crate) fn apply_selection(vaults: &mut [Vault], target: Option<&str>) {
    for vault in vaults.iter_mut() {
        vault.selected = target == Some(vault.id.as_str());
    }
}
