//! Client-side state coordination for VaultDeck.
//!
//! The store owns the authoritative-but-locally-cached mirror of the
//! backend's vault list, mediates every mutation through the `VaultApi`
//! seam, and exposes derived view state (selection, error slot, app config)
//! to a presentation layer.
//!
//! # Design Principles
//! - The store is an explicitly constructed handle, not a process singleton
//! - Every action returns an explicit `Result` and additionally funnels its
//!   failure into the shared [`ErrorChannel`], so UI-style callers can watch
//!   the channel instead of the return value
//! - The collection lock is never held across a network await

pub mod config;
pub mod error_channel;
pub mod store;
pub mod vault;

pub use config::ConfigStore;
pub use error_channel::{ErrorChannel, ErrorState};
pub use store::{VaultStore, MINIMAL_PASSWORD_LENGTH};
pub use vault::Vault;
