//! Error types for the pipekit harness.
//!
//! Each failure condition has its own type so callers can match on exactly
//! what went wrong; all of them convert into [`PipekitError`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for pipekit operations.
#[derive(Debug, Error)]
pub enum PipekitError {
    /// A builder or registry was misconfigured.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A strict property lookup missed.
    #[error("{0}")]
    PropertyNotFound(#[from] PropertyNotFoundError),

    /// A positional access was out of range.
    #[error("{0}")]
    IndexOutOfRange(#[from] IndexOutOfRangeError),

    /// A part name was added twice to the same message.
    #[error("{0}")]
    DuplicatePart(#[from] DuplicatePartError),

    /// A result validation assertion failed.
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// IO error while reading a part stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised at configuration time by builders and registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required argument was empty.
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// The argument name.
        argument: String,
    },

    /// An argument was present but unusable.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// The argument name.
        argument: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A once-only target was configured a second time.
    #[error("Duplicate registration for {target}: {reason}")]
    DuplicateRegistration {
        /// The target that was already configured.
        target: String,
        /// Which rule was violated.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates a missing argument error.
    #[must_use]
    pub fn missing(argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            argument: argument.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::MissingArgument { argument } => {
                map.insert("type".to_string(), serde_json::json!("MissingArgument"));
                map.insert("argument".to_string(), serde_json::json!(argument));
            }
            Self::InvalidArgument { argument, reason } => {
                map.insert("type".to_string(), serde_json::json!("InvalidArgument"));
                map.insert("argument".to_string(), serde_json::json!(argument));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::DuplicateRegistration { target, reason } => {
                map.insert("type".to_string(), serde_json::json!("DuplicateRegistration"));
                map.insert("target".to_string(), serde_json::json!(target));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when a strict lookup targets a property that was never written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Property '{name}' in namespace '{namespace}' not found")]
pub struct PropertyNotFoundError {
    /// The property name.
    pub name: String,
    /// The property namespace.
    pub namespace: String,
}

impl PropertyNotFoundError {
    /// Creates a new property not found error.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Error raised on positional access outside `[0, len)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Index {index} is out of range for {collection} with {len} entries")]
pub struct IndexOutOfRangeError {
    /// The requested index.
    pub index: usize,
    /// The collection length at the time of access.
    pub len: usize,
    /// What was being indexed (e.g. "message parts").
    pub collection: &'static str,
}

impl IndexOutOfRangeError {
    /// Creates a new index error.
    #[must_use]
    pub const fn new(index: usize, len: usize, collection: &'static str) -> Self {
        Self {
            index,
            len,
            collection,
        }
    }
}

/// Error raised when a message already holds a part with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Message already contains a part named '{name}'")]
pub struct DuplicatePartError {
    /// The conflicting part name.
    pub name: String,
}

impl DuplicatePartError {
    /// Creates a new duplicate part error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The aspect of a message a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationAspect {
    /// Number of parts.
    PartCount,
    /// Content type of a part.
    PartContentType,
    /// Position of a part.
    PartOrder,
    /// A property on the message context.
    ContextProperty,
    /// The data stream of a part.
    PartStream,
    /// A property on a part's own store.
    PartProperty,
    /// A part that no configuration expected.
    UnexpectedPart,
    /// A configured part that the message does not contain.
    MissingPart,
}

impl fmt::Display for ValidationAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PartCount => "part_count",
            Self::PartContentType => "part_content_type",
            Self::PartOrder => "part_order",
            Self::ContextProperty => "context_property",
            Self::PartStream => "part_stream",
            Self::PartProperty => "part_property",
            Self::UnexpectedPart => "unexpected_part",
            Self::MissingPart => "missing_part",
        };
        write!(f, "{s}")
    }
}

/// An assertion failure produced while validating a message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Which check failed.
    pub aspect: ValidationAspect,
    /// The part name or property key the check targeted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Human-readable failure message.
    pub message: String,
    /// Expected value, when the check compares values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value, when the check compares values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationFailure {
    /// Creates a new validation failure.
    #[must_use]
    pub fn new(aspect: ValidationAspect, message: impl Into<String>) -> Self {
        Self {
            aspect,
            target: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Sets the target of the failed check.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the expected and actual values.
    #[must_use]
    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_to_dict() {
        let err = ConfigurationError::duplicate("part 'body'", "Only one content type per part");
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "DuplicateRegistration");
        assert_eq!(dict.get("target").unwrap(), "part 'body'");
        assert!(dict.get("message").unwrap().as_str().unwrap().contains("Only one"));
    }

    #[test]
    fn test_property_not_found_display() {
        let err = PropertyNotFoundError::new("MessageType", "http://schemas/system");
        assert!(err.to_string().contains("MessageType"));
        assert!(err.to_string().contains("http://schemas/system"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = IndexOutOfRangeError::new(3, 2, "message parts");
        assert_eq!(
            err.to_string(),
            "Index 3 is out of range for message parts with 2 entries"
        );
    }

    #[test]
    fn test_validation_failure_to_dict() {
        let failure = ValidationFailure::new(ValidationAspect::PartCount, "Part count mismatch.")
            .with_values("2", "1");

        let dict = failure.to_dict();
        assert_eq!(dict.get("aspect").unwrap(), "part_count");
        assert_eq!(dict.get("expected").unwrap(), "2");
        assert!(!dict.contains_key("target"));
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: PipekitError = DuplicatePartError::new("body").into();
        assert!(matches!(err, PipekitError::DuplicatePart(_)));
    }
}
