//! The command relay: authenticate, validate, apply policy, execute
//!
//! Each call is independent. The only shared state is the token, the
//! allow-list and the executor, all fixed at construction.

use std::sync::Arc;

use crate::auth::AuthToken;
use crate::executor::{CommandExecutor, ShellExecutor};
use crate::policy::SudoPolicy;
use crate::types::{ExecutionResult, RelayConfig, RelayError};

#[derive(Clone)]
pub struct CommandRelay {
    token: AuthToken,
    policy: SudoPolicy,
    executor: Arc<dyn CommandExecutor>,
}

impl CommandRelay {
    pub fn new(token: AuthToken, policy: SudoPolicy, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            token,
            policy,
            executor,
        }
    }

    /// Build a relay that runs commands through the configured shell
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            AuthToken::new(&config.api_token),
            SudoPolicy::new(config.allowed_sudo.iter().cloned()),
            Arc::new(ShellExecutor::from_config(config)),
        )
    }

    /// Authenticate, then run the command
    pub async fn execute(
        &self,
        auth_header: Option<&str>,
        command: &str,
    ) -> Result<ExecutionResult, RelayError> {
        self.authorize(auth_header)?;
        self.run(command).await
    }

    /// Check the raw `Authorization` header value
    pub fn authorize(&self, auth_header: Option<&str>) -> Result<(), RelayError> {
        self.token.verify(auth_header)
    }

    /// Run an already-authenticated command
    ///
    /// The command string is passed to the executor unchanged, `sudo ` prefix
    /// included.
    pub async fn run(&self, command: &str) -> Result<ExecutionResult, RelayError> {
        if command.trim().is_empty() {
            return Err(RelayError::EmptyCommand);
        }

        let decision = self.policy.check(command)?;
        tracing::info!(privileged = decision.privileged, "Executing command");

        Ok(self.executor.execute(command).await)
    }
}
