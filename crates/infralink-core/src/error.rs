//! Error types for remote resource operations.
//!
//! Clients report every failure through [`ResourceError`]. The reconciler and
//! the health probes turn these into values ([`crate::ReconcileOutcome`],
//! [`crate::HealthResult`]) and never let them escape.

use std::fmt;

/// Errors that can occur while talking to a remote resource system.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The requested resource does not exist on the remote side.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Resource kind, e.g. `topic` or `index`.
        kind: String,
        /// Name of the missing resource.
        name: String,
    },

    /// A creation request raced with another actor that created the resource first.
    #[error("{kind} already exists: {name}")]
    AlreadyExists {
        /// Resource kind, e.g. `topic` or `index`.
        kind: String,
        /// Name of the existing resource.
        name: String,
    },

    /// The remote system could not be reached.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote system answered with a non-success status.
    #[error("Remote error (HTTP {status}): {message}")]
    Remote {
        /// Status code returned by the remote side.
        status: u16,
        /// Reason reported by the remote side.
        message: String,
    },

    /// The remote system answered with a body that could not be interpreted.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was wrong with the response.
        message: String,
    },

    /// A resource spec could not be built.
    #[error("Invalid spec: {message}")]
    InvalidSpec {
        /// Description of why the spec is invalid.
        message: String,
    },

    /// The operation is not supported by this resource kind.
    #[error("Unsupported operation: {message}")]
    Unsupported {
        /// Description of the unsupported operation.
        message: String,
    },
}

impl ResourceError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a new `Transport` error without an underlying source.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Transport` error wrapping `source`.
    #[must_use]
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new `Remote` error.
    #[must_use]
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidSpec` error.
    #[must_use]
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::Transport { .. } | Self::Remote { .. } | Self::InvalidResponse { .. } => {
                ErrorCategory::Transport
            }
            Self::InvalidSpec { .. } => ErrorCategory::Validation,
            Self::Unsupported { .. } => ErrorCategory::Unsupported,
        }
    }
}

/// Categories of resource errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resource absent; expected on first provisioning.
    NotFound,
    /// Resource created concurrently.
    Conflict,
    /// Network or remote-side failure.
    Transport,
    /// Invalid local input.
    Validation,
    /// Operation not available for this resource kind.
    Unsupported,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Transport => write!(f, "transport"),
            Self::Validation => write!(f, "validation"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Result type for remote resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResourceError::not_found("topic", "orders");
        assert_eq!(err.to_string(), "topic not found: orders");

        let err = ResourceError::already_exists("index", "products");
        assert_eq!(err.to_string(), "index already exists: products");

        let err = ResourceError::remote(503, "cluster unavailable");
        assert_eq!(err.to_string(), "Remote error (HTTP 503): cluster unavailable");
    }

    #[test]
    fn test_error_predicates() {
        let err = ResourceError::not_found("topic", "orders");
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());

        let err = ResourceError::already_exists("topic", "orders");
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ResourceError::not_found("topic", "a").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ResourceError::already_exists("topic", "a").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            ResourceError::transport("connection refused").category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            ResourceError::remote(500, "boom").category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            ResourceError::invalid_spec("empty name").category(),
            ErrorCategory::Validation
        );
        assert_eq!(ErrorCategory::Transport.to_string(), "transport");
    }

    #[test]
    fn test_transport_source_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ResourceError::transport_with_source("connect failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
