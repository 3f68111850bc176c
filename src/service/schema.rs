//! Service schema for diagnostics.
//!
//! A [`ServiceSchema`] lists what a populated registry exposes, so start-up
//! code can log or publish it.
//!
//! # Example
//!
//! ```
//! use service_registry::handler::ArgShape;
//! use service_registry::service::ServiceSchema;
//!
//! let mut schema = ServiceSchema::new("Lobby");
//! schema.add_handler("Login", "Login", ArgShape::Structured, "game::LoginRequest");
//!
//! let json = schema.to_json().unwrap();
//! assert!(json.contains("Lobby.Login"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handler::ArgShape;

/// One registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSchema {
    /// Lookup name.
    pub name: String,
    /// `<service>.<name>`.
    pub route: String,
    /// Declared method name.
    pub method: String,
    pub shape: ArgShape,
    /// Argument type name.
    pub arg_type: String,
}

/// Handlers exposed by one service, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSchema {
    pub service: String,
    pub handlers: Vec<HandlerSchema>,
}

impl ServiceSchema {
    /// Create an empty schema for `service`.
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            handlers: Vec::new(),
        }
    }

    /// Add a handler, keeping the list sorted by name.
    pub fn add_handler(&mut self, name: &str, method: &str, shape: ArgShape, arg_type: &str) {
        let entry = HandlerSchema {
            name: name.to_string(),
            route: format!("{}.{}", self.service, name),
            method: method.to_string(),
            shape,
            arg_type: arg_type.to_string(),
        };
        let at = self
            .handlers
            .partition_point(|existing| existing.name.as_str() < name);
        self.handlers.insert(at, entry);
    }

    /// Get a handler by name.
    pub fn get_handler(&self, name: &str) -> Option<&HandlerSchema> {
        self.handlers.iter().find(|h| h.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_sorted() {
        let mut schema = ServiceSchema::new("Lobby");
        schema.add_handler("Login", "Login", ArgShape::Structured, "game::Login");
        schema.add_handler("Echo", "Echo", ArgShape::Raw, "bytes::bytes::Bytes");

        let names: Vec<_> = schema.handlers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["Echo", "Login"]);
        assert_eq!(schema.get_handler("Echo").unwrap().route, "Lobby.Echo");
        assert!(schema.get_handler("Missing").is_none());
    }

    #[test]
    fn test_json_format() {
        let mut schema = ServiceSchema::new("Lobby");
        schema.add_handler("echo", "Echo", ArgShape::Raw, "bytes::bytes::Bytes");

        let json = schema.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["service"], "Lobby");
        assert_eq!(parsed["handlers"][0]["route"], "Lobby.echo");
        assert_eq!(parsed["handlers"][0]["method"], "Echo");
        assert_eq!(parsed["handlers"][0]["shape"], "raw");
    }

    #[test]
    fn test_empty_schema() {
        let schema = ServiceSchema::new("Lobby");
        assert!(schema.is_empty());
        assert_eq!(schema.to_json().unwrap(), r#"{"service":"Lobby","handlers":[]}"#);
    }
}
