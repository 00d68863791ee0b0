//! Backend API client for VaultDeck.
//!
//! This module provides a trait-based seam to the vault-management backend
//! (`VaultApi`), the HTTP implementation of that seam (`HttpGateway`), the
//! fragment token resolver, and an in-memory backend for tests and offline
//! development.
//!
//! # Design Principles
//! - One typed method per backend endpoint, validated at the gateway boundary
//! - Single-attempt requests: no retries, no local mutation in the gateway
//! - Secrets cross the seam as `SecretString` and are never logged

pub mod api;
pub mod gateway;
pub mod memory;
pub mod token;
pub mod wire;

pub use api::VaultApi;
pub use gateway::HttpGateway;
pub use memory::MemoryBackend;
pub use token::TokenResolver;
pub use wire::{
    AppConfig, AppOptions, AppOptionsPatch, AppVersion, LogLevel, SubPathListing, VaultCredential,
    VaultOptionsPatch, VaultRecord,
};
