// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier type and validation.
//!
//! A session scopes one append-only event log. Session ids arrive from
//! clients, so they are validated against a conservative character set
//! before any row is created for them.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Maximum length of a session id in bytes.
pub const SESSION_ID_MAX_LEN: usize = 64;

/// Rejected session id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session id must not be empty")]
    Empty,
    #[error("session id exceeds {SESSION_ID_MAX_LEN} characters")]
    TooLong,
    #[error("session id contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Unique identifier for a session event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new SessionId from any string-like value without validation.
    ///
    /// Use [`SessionId::parse`] at trust boundaries.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate and wrap a client-supplied session id.
    ///
    /// Accepts `[a-zA-Z0-9._-]{1,64}`.
    pub fn parse(id: &str) -> Result<Self, SessionIdError> {
        if id.is_empty() {
            return Err(SessionIdError::Empty);
        }
        if id.len() > SESSION_ID_MAX_LEN {
            return Err(SessionIdError::TooLong);
        }
        for c in id.chars() {
            if !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
                return Err(SessionIdError::InvalidChar(c));
            }
        }
        Ok(Self(id.to_string()))
    }

    /// Generate a random session id.
    pub fn random() -> Self {
        Self(nanoid::nanoid!(12))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
