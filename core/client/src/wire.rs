//! Wire types for the backend API envelope and payloads.
//!
//! Every endpoint answers with the uniform envelope `{code, msg, ...}`;
//! `code == 0` is success and anything else is a backend-reported error.
//! Payload fields (`item`, `items`, `state`, ...) ride alongside the code
//! in the same object, so responses are decoded in two steps: envelope
//! check first, then the endpoint-specific payload.

use serde::{Deserialize, Serialize};
use std::fmt;

use vaultdeck_common::{Error, Result, SecretString, VaultState};

/// The uniform response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
}

/// Decode a response body: validate the envelope, then extract the payload.
///
/// Runs regardless of the HTTP status line; the backend reports errors
/// through `code`, not through transport status.
pub fn decode_envelope<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    let envelope: Envelope =
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    if envelope.code != 0 {
        return Err(Error::Api {
            code: envelope.code,
            message: envelope.msg,
        });
    }

    serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
}

/// A vault as the backend reports it.
///
/// `mountpoint` may be empty until the vault has been mounted at least once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub mountpoint: String,
    #[serde(default)]
    pub autoreveal: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub state: VaultState,
}

/// Payload of `GET vaults`.
#[derive(Debug, Deserialize)]
pub struct VaultList {
    #[serde(default)]
    pub items: Vec<VaultRecord>,
}

/// Payload of the endpoints answering with a single vault.
#[derive(Debug, Deserialize)]
pub struct VaultItem {
    pub item: VaultRecord,
}

/// Payload of `POST vault/{id}` lock/unlock operations.
#[derive(Debug, Deserialize)]
pub struct StateChange {
    #[serde(default)]
    pub state: VaultState,
}

/// Payload of `POST vault/{id}/masterkey`.
#[derive(Debug, Deserialize)]
pub struct MasterkeyItem {
    pub item: String,
}

/// Payload of `POST subpaths`: one level of the backend's directory tree.
///
/// `sep` is the backend's path separator; backend and client may run on
/// different platforms, so the client never assumes one.
#[derive(Debug, Clone, Deserialize)]
pub struct SubPathListing {
    pub pwd: String,
    #[serde(default)]
    pub items: Vec<String>,
    pub sep: String,
}

/// Backend build identification, fetched once and effectively immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "gitCommit")]
    pub git_commit: String,
    #[serde(default, rename = "buildTime")]
    pub build_time: String,
}

/// Backend log level. Unknown values pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    Other(String),
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
            LogLevel::Other(s) => s,
        }
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "TRACE" => LogLevel::Trace,
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            "PANIC" => LogLevel::Panic,
            _ => LogLevel::Other(s),
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend application options. Updates are always partial merges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<LogLevel>,
}

/// Payload of `GET options`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub version: AppVersion,
    #[serde(default)]
    pub options: AppOptions,
}

/// Wrapper for the `GET options` item.
#[derive(Debug, Deserialize)]
pub struct AppConfigItem {
    pub item: AppConfig,
}

/// Partial update for per-vault options; only supplied fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VaultOptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoreveal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
}

impl VaultOptionsPatch {
    /// True when no field is supplied; such a patch must never become a
    /// request.
    pub fn is_empty(&self) -> bool {
        self.autoreveal.is_none() && self.readonly.is_none() && self.mountpoint.is_none()
    }
}

/// Partial update for the backend application options.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppOptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<LogLevel>,
}

impl AppOptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.locale.is_none() && self.loglevel.is_none()
    }
}

/// The proof of ownership presented when changing a vault password:
/// either the current password or the vault masterkey.
#[derive(Debug, Clone)]
pub enum VaultCredential {
    Password(SecretString),
    Masterkey(SecretString),
}

impl VaultCredential {
    /// Field name this credential uses in the password-change payload.
    pub fn field(&self) -> &'static str {
        match self {
            VaultCredential::Password(_) => "password",
            VaultCredential::Masterkey(_) => "masterkey",
        }
    }

    /// The secret itself.
    pub fn secret(&self) -> &SecretString {
        match self {
            VaultCredential::Password(secret) => secret,
            VaultCredential::Masterkey(secret) => secret,
        }
    }
}
