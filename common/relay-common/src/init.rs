//! Tracing initialization
//!
//! Every relay process logs to stderr through `tracing-subscriber`, filtered by
//! `RUST_LOG`. Set `LOG_FORMAT=json` for structured JSON lines (useful when the
//! relay runs under a supervisor that ships logs); the default is plain text.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a relay binary
///
/// Adds a default `<crate_name>=info` directive on top of whatever `RUST_LOG`
/// already asks for, so the relay's own events show up without configuration.
///
/// Returns an error if a global subscriber was already installed.
///
/// # Example
///
/// ```rust,ignore
/// relay_common::init_tracing("command_relay")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    if json_requested(std::env::var("LOG_FORMAT").ok().as_deref()) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

fn json_requested(log_format: Option<&str>) -> bool {
    log_format
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
