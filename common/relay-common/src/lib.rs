//! Relay Common - Shared utilities for the command relay
//!
//! This crate provides the pieces every relay binary and handler needs:
//!
//! - **Initialization**: [`init_tracing`] for standardized logging setup
//! - **Errors**: [`ErrorBody`] and [`detail_response`] for the
//!   `{ "detail": ... }` error shape returned to HTTP callers
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::http::StatusCode;
//! use relay_common::{detail_response, init_tracing};
//!
//! init_tracing("command_relay")?;
//!
//! async fn handler() -> axum::response::Response {
//!     detail_response(StatusCode::FORBIDDEN, "Sudo command not allowed")
//! }
//! ```

pub mod error;
pub mod init;

pub use error::{detail_response, ErrorBody};
pub use init::init_tracing;
