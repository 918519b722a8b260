//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::types::ExecutionResult;

/// `POST /run` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// The shell command to execute
    pub cmd: String,
}

/// `POST /run` success body
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    /// Combined stdout and stderr, or the failure description
    pub output: String,

    /// Present only when `expose_exit_code` is enabled; `null` when the
    /// process produced no exit status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<Option<i32>>,
}

impl RunResponse {
    pub fn from_result(result: ExecutionResult, expose_exit_code: bool) -> Self {
        Self {
            output: result.output,
            exit_code: expose_exit_code.then_some(result.exit_code),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
