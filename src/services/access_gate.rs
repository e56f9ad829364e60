//! Shared-secret access gate
//!
//! Registration, statistics and export require the configured password.
//! The comparison is plain equality (constant time); there is no hashing,
//! lockout or rate limiting.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::errors::{Result, TelemetryError};

pub const INCORRECT_PASSWORD: &str = "Incorrect password";

#[derive(Clone)]
pub struct AccessGate {
    secret: Option<String>,
}

impl AccessGate {
    /// A missing or blank secret yields a gate that rejects everything.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn authorized(&self, supplied: Option<&str>) -> bool {
        match (self.secret.as_deref(), supplied) {
            (Some(secret), Some(supplied)) => secret.as_bytes().ct_eq(supplied.as_bytes()).into(),
            _ => false,
        }
    }

    pub fn authorize(&self, supplied: Option<&str>) -> Result<()> {
        if self.authorized(supplied) {
            Ok(())
        } else {
            Err(TelemetryError::unauthorized(INCORRECT_PASSWORD))
        }
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}
