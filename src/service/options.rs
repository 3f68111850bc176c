//! Service options.
//!
//! Options are mutators applied left to right to a default
//! [`ServiceOptions`] when a registry is created.
//!
//! ```
//! use service_registry::service::{with_name, with_name_rewrite, ServiceOptions};
//!
//! let options = ServiceOptions::from_options([
//!     with_name("lobby"),
//!     with_name_rewrite(|method| method.to_uppercase()),
//! ]);
//! assert_eq!(options.name(), Some("lobby"));
//! assert_eq!(options.handler_name("Login"), "LOGIN");
//! ```

use std::fmt;
use std::sync::Arc;

/// Maps a method name to its lookup name.
pub type NameRewrite = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A configuration mutator.
pub type ServiceOption = Box<dyn FnOnce(&mut ServiceOptions) + Send>;

/// Resolved service configuration.
#[derive(Clone, Default)]
pub struct ServiceOptions {
    name: Option<String>,
    name_rewrite: Option<NameRewrite>,
}

impl ServiceOptions {
    /// Apply `options` in order to the default configuration.
    pub fn from_options(options: impl IntoIterator<Item = ServiceOption>) -> Self {
        let mut resolved = Self::default();
        for option in options {
            option(&mut resolved);
        }
        resolved
    }

    /// Explicit service name. An empty name counts as unset.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn has_name_rewrite(&self) -> bool {
        self.name_rewrite.is_some()
    }

    /// Lookup name for `method`.
    pub fn handler_name(&self, method: &str) -> String {
        match &self.name_rewrite {
            Some(rewrite) => rewrite(method),
            None => method.to_string(),
        }
    }
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("name", &self.name)
            .field("name_rewrite", &self.name_rewrite.is_some())
            .finish()
    }
}

/// Override the service name derived from the component type.
pub fn with_name(name: impl Into<String>) -> ServiceOption {
    let name = name.into();
    Box::new(move |options: &mut ServiceOptions| options.name = Some(name))
}

/// Rewrite every handler name with `rewrite`.
pub fn with_name_rewrite<F>(rewrite: F) -> ServiceOption
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    let rewrite: NameRewrite = Arc::new(rewrite);
    Box::new(move |options: &mut ServiceOptions| options.name_rewrite = Some(rewrite))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ServiceOptions::from_options(Vec::new());

        assert_eq!(options.name(), None);
        assert!(!options.has_name_rewrite());
        assert_eq!(options.handler_name("Login"), "Login");
    }

    #[test]
    fn test_applied_left_to_right() {
        let options = ServiceOptions::from_options([with_name("first"), with_name("second")]);
        assert_eq!(options.name(), Some("second"));
    }

    #[test]
    fn test_empty_name_is_unset() {
        let options = ServiceOptions::from_options([with_name("Lobby"), with_name("")]);
        assert_eq!(options.name(), None);
    }

    #[test]
    fn test_rewrite() {
        let options = ServiceOptions::from_options([with_name_rewrite(|m| format!("on{}", m))]);

        assert!(options.has_name_rewrite());
        assert_eq!(options.handler_name("Join"), "onJoin");
    }
}
