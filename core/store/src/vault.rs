//! The locally mirrored vault record.

use serde::Serialize;

use vaultdeck_common::VaultState;
use vaultdeck_client::VaultRecord;

/// A vault as mirrored by the store.
///
/// `name` is derived from the last segment of `path`; `selected` is purely
/// local view state and never leaves the client.
#[derive(Debug, Clone, Serialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub path: String,
    pub mountpoint: String,
    pub autoreveal: bool,
    pub readonly: bool,
    pub state: VaultState,
    pub selected: bool,
}

impl Vault {
    /// Build a local vault from a backend record, unselected.
    pub fn from_record(record: VaultRecord) -> Self {
        Self {
            id: record.id,
            name: derive_name(&record.path),
            path: record.path,
            mountpoint: record.mountpoint,
            autoreveal: record.autoreveal,
            readonly: record.readonly,
            state: record.state,
            selected: false,
        }
    }

    /// Overwrite the mirrored fields from an updated backend record,
    /// re-deriving the name. Selection is preserved.
    pub fn apply_record(&mut self, record: VaultRecord) {
        self.name = derive_name(&record.path);
        self.path = record.path;
        self.mountpoint = record.mountpoint;
        self.autoreveal = record.autoreveal;
        self.readonly = record.readonly;
        self.state = record.state;
    }
}

/// Last `/`-separated segment of a backend path.
pub(crate) fn derive_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, path: &str) -> VaultRecord {
        VaultRecord {
            id: id.to_string(),
            path: path.to_string(),
            mountpoint: String::new(),
            autoreveal: false,
            readonly: false,
            state: VaultState::Locked,
        }
    }

    #[test]
    fn test_name_derived_from_last_segment() {
        let vault = Vault::from_record(record("v1", "/home/u/Secret"));
        assert_eq!(vault.name, "Secret");
        assert!(!vault.selected);
    }

    #[test]
    fn test_name_of_bare_path() {
        assert_eq!(derive_name("Secret"), "Secret");
    }

    #[test]
    fn test_apply_record_rederives_name_keeps_selection() {
        let mut vault = Vault::from_record(record("v1", "/home/u/Old"));
        vault.selected = true;

        let mut updated = record("v1", "/home/u/New");
        updated.mountpoint = "/mnt/new".to_string();
        updated.readonly = true;
        updated.state = VaultState::Unlocked;
        vault.apply_record(updated);

        assert_eq!(vault.name, "New");
        assert_eq!(vault.mountpoint, "/mnt/new");
        assert!(vault.readonly);
        assert_eq!(vault.state, VaultState::Unlocked);
        assert!(vault.selected);
    }
}
