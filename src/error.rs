//! Error types for the cachesim library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a cache configuration is invalid
//!   (e.g. an unknown policy name handed to the factory).
//!
//! Inside the policy cores there are no fatal conditions: bad parameter
//! values and unknown parameter names are logged and ignored. `ConfigError`
//! only surfaces at construction time, where the caller can still choose a
//! different policy.
//!
//! ## Example Usage
//!
//! ```
//! use cachesim::builder::PolicyKind;
//! use cachesim::error::ConfigError;
//!
//! let err: ConfigError = "CLAIRVOYANT".parse::<PolicyKind>().unwrap_err();
//! assert!(err.to_string().contains("unknown policy"));
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by the [`PolicyKind`](crate::builder::PolicyKind) name parser
/// and the builder's `try_build`. Carries a human-readable description of
/// which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
