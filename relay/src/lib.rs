//! Command Relay Library
//!
//! Authenticated remote command execution over HTTP. A caller posts a shell
//! command with a bearer token; the relay checks the token, applies the sudo
//! allow-list, runs the command through the configured shell and returns the
//! combined output.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use command_relay::{server, RelayConfig};
//!
//! let config = RelayConfig::load(None)?;
//! config.validate()?;
//! server::serve(config).await?;
//! ```

pub mod auth;
pub mod config;
pub mod executor;
pub mod params;
pub mod policy;
pub mod relay;
pub mod server;
pub mod types;

pub use auth::AuthToken;
pub use executor::{CommandExecutor, ShellExecutor};
pub use policy::{PolicyDecision, SudoPolicy};
pub use relay::CommandRelay;
pub use types::{ConfigError, ExecutionResult, RelayConfig, RelayError};
