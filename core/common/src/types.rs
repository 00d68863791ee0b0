//! Common domain types used throughout VaultDeck.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Lifecycle state of a vault as reported by the backend.
///
/// The backend owns this value; states the client does not know about are
/// carried verbatim in [`VaultState::Other`] so that a newer backend never
/// breaks an older client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VaultState {
    Locked,
    Unlocked,
    Unknown,
    Other(String),
}

impl VaultState {
    /// Whether the vault is currently locked.
    pub fn is_locked(&self) -> bool {
        matches!(self, VaultState::Locked)
    }

    /// Whether the vault is currently unlocked.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, VaultState::Unlocked)
    }

    /// The exact string the backend reported.
    pub fn as_str(&self) -> &str {
        match self {
            VaultState::Locked => "locked",
            VaultState::Unlocked => "unlocked",
            VaultState::Unknown => "unknown",
            VaultState::Other(s) => s,
        }
    }
}

impl Default for VaultState {
    fn default() -> Self {
        VaultState::Unknown
    }
}

impl From<String> for VaultState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "locked" => VaultState::Locked,
            "unlocked" => VaultState::Unlocked,
            "unknown" => VaultState::Unknown,
            _ => VaultState::Other(s),
        }
    }
}

impl From<VaultState> for String {
    fn from(state: VaultState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sensitive string wrapper that zeroizes on drop.
///
/// Used for passwords and revealed masterkeys. Never logged; `Debug` prints
/// a redaction marker instead of the value.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a sensitive value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner value for transmission.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_state_known_values() {
        assert_eq!(VaultState::from("locked".to_string()), VaultState::Locked);
        assert_eq!(
            VaultState::from("unlocked".to_string()),
            VaultState::Unlocked
        );
        assert_eq!(VaultState::from("unknown".to_string()), VaultState::Unknown);
    }

    #[test]
    fn test_vault_state_passthrough() {
        let state = VaultState::from("migrating".to_string());
        assert_eq!(state, VaultState::Other("migrating".to_string()));
        assert_eq!(String::from(state), "migrating");
    }

    #[test]
    fn test_vault_state_serde_verbatim() {
        let state: VaultState = serde_json::from_str("\"degraded\"").unwrap();
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"degraded\"");
    }

    #[test]
    fn test_secret_string_redacted_debug() {
        let secret = SecretString::new("hunter2");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose(), "hunter2");
    }
}
