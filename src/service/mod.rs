//! Service module - registries built from components.
//!
//! Provides:
//! - [`ServiceRegistry`] - discovers and holds the handlers of one component
//! - [`ServiceOptions`] - name override and handler-name rewrite
//! - [`ServiceSchema`] - JSON-friendly description of a populated registry
//! - [`naming`] - service-name derivation and stock rewrite functions

pub mod naming;
mod options;
mod registry;
mod schema;

pub use options::{with_name, with_name_rewrite, NameRewrite, ServiceOption, ServiceOptions};
pub use registry::{RegistryState, ServiceRegistry};
pub use schema::{HandlerSchema, ServiceSchema};
