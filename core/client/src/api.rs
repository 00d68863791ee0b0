//! Backend API trait definition.

use async_trait::async_trait;

use vaultdeck_common::{Result, SecretString, VaultState};

use crate::wire::{
    AppConfig, AppOptionsPatch, SubPathListing, VaultCredential, VaultOptionsPatch, VaultRecord,
};

/// The vault-management backend as seen by the store.
///
/// One method per endpoint; every result is validated against the response
/// envelope before it is handed out, so implementations only ever return
/// typed payloads or a structured error. Implementations perform a single
/// attempt per call and never mutate client-side state.
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// `GET vaults` — the full vault list.
    async fn list_vaults(&self) -> Result<Vec<VaultRecord>>;

    /// `POST vaults {op: add}` — register an existing vault directory.
    async fn add_vault(&self, path: &str) -> Result<VaultRecord>;

    /// `POST vaults {op: create}` — initialize a brand-new vault.
    ///
    /// The password is transmitted once and must not be retained.
    async fn create_vault(
        &self,
        name: &str,
        path: &str,
        password: &SecretString,
    ) -> Result<VaultRecord>;

    /// `DELETE vault/{id}` — remove a vault from the backend's registry.
    async fn remove_vault(&self, vault_id: &str) -> Result<()>;

    /// `POST vault/{id} {op: lock}` — returns the resulting state.
    async fn lock_vault(&self, vault_id: &str) -> Result<VaultState>;

    /// `POST vault/{id} {op: unlock}` — returns the resulting state.
    async fn unlock_vault(&self, vault_id: &str, password: &SecretString) -> Result<VaultState>;

    /// `POST vault/{id} {op: reveal_mountpoint}` — backend opens the
    /// unlocked mountpoint in the platform file manager; nothing to return.
    async fn reveal_mountpoint(&self, vault_id: &str) -> Result<()>;

    /// `POST vault/{id} {op: reveal_vault}` — backend opens the vault's
    /// encrypted directory itself; works whether locked or unlocked.
    async fn reveal_vault(&self, vault_id: &str) -> Result<()>;

    /// `POST vault/{id}/options` — partial options update, returns the
    /// updated vault.
    async fn update_vault_options(
        &self,
        vault_id: &str,
        patch: &VaultOptionsPatch,
    ) -> Result<VaultRecord>;

    /// `POST vault/{id}/password` — returns the backend's confirmation
    /// message.
    async fn change_vault_password(
        &self,
        vault_id: &str,
        credential: &VaultCredential,
        new_password: &SecretString,
    ) -> Result<String>;

    /// `POST vault/{id}/masterkey` — reveals the vault masterkey.
    ///
    /// Sensitive: implementations must not log or cache the returned value.
    async fn reveal_masterkey(&self, vault_id: &str, password: &SecretString)
        -> Result<SecretString>;

    /// `GET options` — backend version and application options.
    async fn app_config(&self) -> Result<AppConfig>;

    /// `POST options` — partial application options update.
    async fn set_app_options(&self, patch: &AppOptionsPatch) -> Result<()>;

    /// `POST subpaths` — one level of the backend's directory tree, with the
    /// backend-reported path separator.
    async fn list_sub_paths(&self, pwd: &str) -> Result<SubPathListing>;
}
