//! Type definitions for the command relay

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Relay configuration, read once at startup and immutable afterwards
#[derive(Clone, Deserialize)]
pub struct RelayConfig {
    /// Bearer secret callers must present
    #[serde(default)]
    pub api_token: String,

    /// Exact commands that may follow `sudo `
    #[serde(default)]
    pub allowed_sudo: Vec<String>,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shell used to run commands (`<shell> -c <cmd>`)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Kill commands running longer than this (unset = wait forever)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Include `exit_code` in success responses
    #[serde(default)]
    pub expose_exit_code: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shell() -> String {
    "/bin/bash".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            allowed_sudo: Vec::new(),
            host: default_host(),
            port: default_port(),
            shell: default_shell(),
            timeout_secs: None,
            expose_exit_code: false,
        }
    }
}

// The token must never end up in logs
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_token", &"<redacted>")
            .field("allowed_sudo", &self.allowed_sudo)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("shell", &self.shell)
            .field("timeout_secs", &self.timeout_secs)
            .field("expose_exit_code", &self.expose_exit_code)
            .finish()
    }
}

// ============================================================================
// Execution Types
// ============================================================================

/// Outcome of running one command
///
/// Spawn failures and timeouts are reported here as data; they are not
/// service-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// stdout followed by stderr, or the failure description
    pub output: String,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    pub timed_out: bool,
}

impl ExecutionResult {
    /// The process ran to completion
    pub fn completed(stdout: &[u8], stderr: &[u8], exit_code: Option<i32>) -> Self {
        let mut output = String::from_utf8_lossy(stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(stderr));
        Self {
            output,
            exit_code,
            error: None,
            timed_out: false,
        }
    }

    /// The shell could not be started
    pub fn spawn_failed(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            output: description.clone(),
            exit_code: None,
            error: Some(description),
            timed_out: false,
        }
    }

    /// The process was killed after exceeding the configured timeout
    pub fn timed_out(limit: Duration) -> Self {
        let description = format!("Command timed out after {:?}", limit);
        Self {
            output: description.clone(),
            exit_code: None,
            error: Some(description),
            timed_out: true,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("API token is not configured (set API_TOKEN or api_token)")]
    MissingToken,
}

/// Request outcomes that stop a command before it runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Command must not be empty")]
    EmptyCommand,

    #[error("Sudo command not allowed")]
    SudoNotAllowed,

    #[error("{0}")]
    InvalidBody(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::EmptyCommand => StatusCode::BAD_REQUEST,
            RelayError::SudoNotAllowed => StatusCode::FORBIDDEN,
            RelayError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        relay_common::detail_response(self.status(), self.to_string())
    }
}
