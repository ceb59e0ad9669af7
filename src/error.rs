use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while binding, validating, dispatching or publishing a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A handler, reset method, validation method or constraint parameter is
    /// missing or malformed. Fatal: the request should fail as a server error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Validation produced one or more messages. The main handler was not invoked.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A property could not be read while publishing into scope or evaluating
    /// a constraint.
    #[error("failed to read property '{property}': {reason}")]
    Access {
        /// Name of the property that failed
        property: String,
        /// Why the read failed
        reason: String,
    },

    /// A form rejected a parameter value while binding.
    #[error("failed to bind '{property}': {reason}")]
    Bind {
        /// Name of the parameter being bound
        property: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An error returned by a business handler or hook.
    #[error("handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Creates a property access error.
    pub fn access(property: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::Access {
            property: property.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a binding error.
    pub fn bind(property: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::Bind {
            property: property.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps an arbitrary handler error.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Handler(err.into())
    }

    /// Returns `true` if this is an expected validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns the validation messages if this is a validation failure.
    pub fn validation_messages(&self) -> Option<&[ValidationMessage]> {
        match self {
            Error::Validation(failure) => Some(failure.messages()),
            _ => None,
        }
    }
}

/// A single validation message: the property it concerns and the resolved text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    /// Property path the message refers to (empty for form-wide messages)
    pub property: String,
    /// Resolved, user-facing text
    pub text: String,
}

impl ValidationMessage {
    /// Creates a new validation message.
    pub fn new(property: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property.is_empty() {
            write!(f, "{}", self.text)
        } else {
            write!(f, "{}: {}", self.property, self.text)
        }
    }
}

/// Validation failed. Carries every aggregated message, not only the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("validation failed with {} message(s)", .messages.len())]
pub struct ValidationFailure {
    messages: Vec<ValidationMessage>,
}

impl ValidationFailure {
    /// Creates a failure from the aggregated messages.
    pub fn new(messages: Vec<ValidationMessage>) -> Self {
        Self { messages }
    }

    /// Returns the messages in the order they were produced.
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Consumes the failure, returning its messages.
    pub fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }
}
