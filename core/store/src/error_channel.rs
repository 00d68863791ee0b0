//! Single-slot error/notification state.

use std::sync::Mutex;

use vaultdeck_common::Error;

/// The current error slot contents.
///
/// `code: None` means no active notification; `code: Some(0)` is a transient
/// success notice the consumer is expected to auto-dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub code: Option<i32>,
    pub message: String,
}

impl ErrorState {
    /// The empty slot.
    pub fn none() -> Self {
        Self {
            code: None,
            message: String::new(),
        }
    }

    /// Whether the slot is empty.
    pub fn is_clear(&self) -> bool {
        self.code.is_none()
    }

    /// Whether the slot holds a code-0 success notice.
    pub fn is_success_notice(&self) -> bool {
        self.code == Some(0)
    }
}

impl Default for ErrorState {
    fn default() -> Self {
        Self::none()
    }
}

/// Single-slot notification channel shared by all stores.
///
/// `set` overwrites unconditionally: last write wins, there is no queue.
/// Concurrent actions race on the slot with no ordering guarantee beyond
/// settle order.
pub struct ErrorChannel {
    slot: Mutex<ErrorState>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(ErrorState::none()),
        }
    }

    /// Overwrite the slot.
    pub fn set(&self, code: i32, message: impl Into<String>) {
        let mut slot = self.slot.lock().unwrap();
        *slot = ErrorState {
            code: Some(code),
            message: message.into(),
        };
    }

    /// Write a failed action's error into the slot.
    pub fn record(&self, err: &Error) {
        self.set(err.code(), err.message());
    }

    /// Write a code-0 success notice.
    pub fn notify_success(&self, message: impl Into<String>) {
        self.set(0, message);
    }

    /// Reset the slot.
    pub fn clear(&self) {
        *self.slot.lock().unwrap() = ErrorState::none();
    }

    /// Snapshot of the current slot.
    pub fn current(&self) -> ErrorState {
        self.slot.lock().unwrap().clone()
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clear() {
        let channel = ErrorChannel::new();
        assert!(channel.current().is_clear());
    }

    #[test]
    fn test_last_write_wins() {
        let channel = ErrorChannel::new();
        channel.set(5, "invalid password");
        channel.set(2, "vault not found");

        let state = channel.current();
        assert_eq!(state.code, Some(2));
        assert_eq!(state.message, "vault not found");
    }

    #[test]
    fn test_clear_resets_slot() {
        let channel = ErrorChannel::new();
        channel.set(5, "boom");
        channel.clear();

        assert_eq!(channel.current(), ErrorState::none());
    }

    #[test]
    fn test_success_notice() {
        let channel = ErrorChannel::new();
        channel.notify_success("password changed");

        let state = channel.current();
        assert!(state.is_success_notice());
        assert!(!state.is_clear());
        assert_eq!(state.message, "password changed");
    }

    #[test]
    fn test_record_normalizes_transport_errors() {
        let channel = ErrorChannel::new();
        channel.record(&Error::Network("connection refused".to_string()));

        let state = channel.current();
        assert_eq!(state.code, Some(-1));
        assert_eq!(state.message, "connection refused");
    }
}
