//! Error types for service-registry.

use std::fmt;

use thiserror::Error;

/// Why a component type cannot provide a service name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameDefect {
    /// The type has no usable name (tuple, slice, closure, trait object...).
    Anonymous,
    /// The type name does not start with an uppercase letter.
    NotExported,
}

impl fmt::Display for NameDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameDefect::Anonymous => f.write_str("anonymous"),
            NameDefect::NotExported => f.write_str("not exported"),
        }
    }
}

/// Main error type for registration and handler invocation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// JSON serialization error (schema export only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// The component type cannot be turned into a service name.
    #[error("no service name for type {type_name}: type is {defect}")]
    InvalidServiceName {
        type_name: String,
        defect: NameDefect,
    },

    /// The component exposes no handler-shaped methods.
    #[error(
        "type {service} has no exported methods of suitable type{}",
        hint_suffix(.pointer_hint)
    )]
    NoEligibleHandlers { service: String, pointer_hint: bool },

    /// Two methods resolve to the same handler name.
    #[error("methods {first} and {second} both resolve to handler name {name}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Handler not found for the given name.
    #[error("Handler not found: {0}")]
    HandlerNotFound(String),

    /// Payload handed to a handler does not match its argument type.
    #[error("handler {handler} expects {expected}, got {found}")]
    ArgumentMismatch {
        handler: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Outbound channel of a session is gone.
    #[error("Session closed")]
    SessionClosed,

    /// Error raised by handler code.
    #[error("Handler error: {0}")]
    Handler(String),
}

impl ServiceError {
    /// Build a [`ServiceError::Handler`] from any displayable message.
    pub fn handler(message: impl fmt::Display) -> Self {
        ServiceError::Handler(message.to_string())
    }
}

fn hint_suffix(pointer_hint: &bool) -> &'static str {
    if *pointer_hint {
        " (hint: register it with an exclusive receiver so &mut self methods are reachable)"
    } else {
        ""
    }
}

/// Result type alias using ServiceError.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_eligible_messages_differ() {
        let plain = ServiceError::NoEligibleHandlers {
            service: "Lobby".into(),
            pointer_hint: false,
        };
        let hinted = ServiceError::NoEligibleHandlers {
            service: "Lobby".into(),
            pointer_hint: true,
        };

        assert_eq!(
            plain.to_string(),
            "type Lobby has no exported methods of suitable type"
        );
        assert!(hinted.to_string().starts_with(&plain.to_string()));
        assert!(hinted.to_string().contains("hint: "));
    }

    #[test]
    fn test_invalid_name_message() {
        let err = ServiceError::InvalidServiceName {
            type_name: "u32".into(),
            defect: NameDefect::NotExported,
        };
        assert_eq!(
            err.to_string(),
            "no service name for type u32: type is not exported"
        );
    }

    #[test]
    fn test_handler_helper() {
        let err = ServiceError::handler("bad password");
        assert!(matches!(err, ServiceError::Handler(ref m) if m == "bad password"));
    }
}
