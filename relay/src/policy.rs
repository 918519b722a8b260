//! Sudo policy - the allow-list for privileged commands
//!
//! A command is privileged when it starts with exactly `sudo ` (lowercase, one
//! space). A privileged command may run only if what follows the prefix,
//! trimmed, is one of the configured allow-list entries verbatim. There is no
//! pattern matching and no argument inspection. Everything else runs
//! unconditionally.

use std::collections::HashSet;

use crate::types::RelayError;

pub const SUDO_PREFIX: &str = "sudo ";

/// Result of classifying a command against the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub privileged: bool,
    pub allowed: bool,
}

/// Immutable allow-list of exact commands that may follow `sudo `
#[derive(Debug, Clone, Default)]
pub struct SudoPolicy {
    allowed: HashSet<String>,
}

impl SudoPolicy {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a command
    pub fn decide(&self, command: &str) -> PolicyDecision {
        match command.strip_prefix(SUDO_PREFIX) {
            Some(rest) => PolicyDecision {
                privileged: true,
                allowed: self.allowed.contains(rest.trim()),
            },
            None => PolicyDecision {
                privileged: false,
                allowed: true,
            },
        }
    }

    /// Check a command, logging rejected privileged attempts
    pub fn check(&self, command: &str) -> Result<PolicyDecision, RelayError> {
        let decision = self.decide(command);
        if !decision.allowed {
            tracing::warn!(command = %command, "Rejected sudo command outside allow-list");
            return Err(RelayError::SudoNotAllowed);
        }
        Ok(decision)
    }
}
