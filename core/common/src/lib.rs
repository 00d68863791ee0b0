//! Common types shared across VaultDeck modules.
//!
//! This module provides the error taxonomy and foundational domain types
//! used by the client and store crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{SecretString, VaultState};
