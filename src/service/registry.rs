//! Service registry: discovers the handlers of one component instance.
//!
//! A registry is built once per component at start-up, extracted once, and
//! read from then on. Extraction is all-or-nothing: on failure the registry
//! exposes no handlers at all.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use service_registry::{Component, HandlerResult, MethodSet, ServiceRegistry, Session};
//! use service_registry::service::with_name_rewrite;
//!
//! struct Lobby;
//!
//! impl Lobby {
//!     fn login(&self, session: &Session, user: String) -> HandlerResult<bool> {
//!         session.bind(user);
//!         Ok(Some(true))
//!     }
//! }
//!
//! impl Component for Lobby {
//!     fn methods(set: &mut MethodSet<Self>) {
//!         set.typed("Login", Lobby::login);
//!     }
//! }
//!
//! let mut registry = ServiceRegistry::new(
//!     Arc::new(Lobby),
//!     [with_name_rewrite(|m| m.to_lowercase())],
//! );
//! registry.extract().unwrap();
//!
//! assert_eq!(registry.name(), "Lobby");
//! assert!(registry.get("login").is_some());
//! ```

use std::any::type_name;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use super::naming::derive_service_name;
use super::options::{ServiceOption, ServiceOptions};
use super::schema::ServiceSchema;
use crate::error::{Result, ServiceError};
use crate::handler::{
    ArgShape, ArgType, BoundFn, Callable, Component, HandlerDescriptor, MethodSet, MethodSpec,
    ReceiverKind, Receiver,
};
use crate::session::Session;

/// Extraction state of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// Created, not extracted yet.
    Unvalidated,
    /// Extraction succeeded; handlers are available.
    Populated,
    /// Extraction failed; no handlers are available.
    Failed,
}

/// Eligible method with its resolved lookup name, bound to the receiver.
struct Candidate<'a, C> {
    name: String,
    spec: &'a MethodSpec<C>,
    shape: ArgShape,
    arg_type: ArgType,
    callable: BoundFn,
}

/// Handlers discovered on one component instance.
pub struct ServiceRegistry<C: Component> {
    name: String,
    type_name: &'static str,
    receiver: Receiver<C>,
    options: ServiceOptions,
    state: RegistryState,
    handlers: BTreeMap<String, HandlerDescriptor>,
}

impl<C: Component> ServiceRegistry<C> {
    /// Create a registry over a shared component.
    ///
    /// Only `&self` methods are reachable through a shared component.
    pub fn new(component: Arc<C>, options: impl IntoIterator<Item = ServiceOption>) -> Self {
        Self::build(Receiver::Shared(component), options)
    }

    /// Create a registry that owns `component` behind a lock.
    ///
    /// Both `&self` and `&mut self` methods are reachable. `&self` handlers
    /// share the read lock and may run concurrently.
    pub fn new_exclusive(component: C, options: impl IntoIterator<Item = ServiceOption>) -> Self {
        Self::with_lock(Arc::new(RwLock::new(component)), options)
    }

    /// Create a registry over a component already behind a lock.
    pub fn with_lock(
        component: Arc<RwLock<C>>,
        options: impl IntoIterator<Item = ServiceOption>,
    ) -> Self {
        Self::build(Receiver::Exclusive(component), options)
    }

    fn build(receiver: Receiver<C>, options: impl IntoIterator<Item = ServiceOption>) -> Self {
        let options = ServiceOptions::from_options(options);
        let type_name = type_name::<C>();
        let name = match options.name() {
            Some(name) => name.to_string(),
            None => derive_service_name(type_name).unwrap_or_else(|_| type_name.to_string()),
        };

        Self {
            name,
            type_name,
            receiver,
            options,
            state: RegistryState::Unvalidated,
            handlers: BTreeMap::new(),
        }
    }

    /// Discover the component's handlers.
    ///
    /// On success the registry is populated with at least one handler. On
    /// failure it holds no handlers and the error says why.
    pub fn extract(&mut self) -> Result<()> {
        if self.state == RegistryState::Populated {
            return Ok(());
        }

        match self.populate() {
            Ok(handlers) => {
                tracing::debug!(
                    "Service {} registered {} handler(s)",
                    self.name,
                    handlers.len()
                );
                self.handlers = handlers;
                self.state = RegistryState::Populated;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Service {} extraction failed: {}", self.name, e);
                self.handlers.clear();
                self.state = RegistryState::Failed;
                Err(e)
            }
        }
    }

    fn populate(&self) -> Result<BTreeMap<String, HandlerDescriptor>> {
        if self.options.name().is_none() {
            derive_service_name(self.type_name).map_err(|defect| {
                ServiceError::InvalidServiceName {
                    type_name: self.type_name.to_string(),
                    defect,
                }
            })?;
        }

        let methods = MethodSet::<C>::of();
        let form = self.receiver.form();
        let candidates = self.install(&methods, form)?;

        if candidates.is_empty() {
            // A shared component may still have &mut self handlers.
            let pointer_hint = form == ReceiverKind::Shared
                && eligible(&methods, ReceiverKind::Exclusive).next().is_some();
            return Err(ServiceError::NoEligibleHandlers {
                service: self.name.clone(),
                pointer_hint,
            });
        }

        let receiver = self.receiver.erased();
        let mut handlers = BTreeMap::new();
        for candidate in candidates {
            tracing::debug!(
                "Registered handler {}.{} ({:?}, {})",
                self.name,
                candidate.name,
                candidate.shape,
                candidate.arg_type.name()
            );
            handlers.insert(
                candidate.name.clone(),
                HandlerDescriptor::new(
                    candidate.name,
                    candidate.spec.signature().name.clone(),
                    candidate.shape,
                    candidate.arg_type,
                    receiver.clone(),
                    candidate.callable,
                ),
            );
        }

        Ok(handlers)
    }

    /// Resolve lookup names of the eligible methods and bind them, rejecting
    /// collisions.
    fn install<'a>(
        &self,
        methods: &'a MethodSet<C>,
        form: ReceiverKind,
    ) -> Result<Vec<Candidate<'a, C>>> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        let mut candidates = Vec::new();

        for (spec, callable, shape, arg_type) in eligible(methods, form) {
            let method = spec.signature().name.as_str();
            let Some(callable) = callable.bind(&self.receiver) else {
                tracing::trace!("Skipping method {}: receiver cannot reach it", method);
                continue;
            };
            let name = self.options.handler_name(method);

            match seen.entry(name.clone()) {
                Entry::Occupied(first) => {
                    return Err(ServiceError::NameCollision {
                        name,
                        first: first.get().to_string(),
                        second: method.to_string(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(method);
                }
            }

            candidates.push(Candidate {
                name,
                spec,
                shape,
                arg_type,
                callable,
            });
        }

        Ok(candidates)
    }

    /// Resolved service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full type name of the component.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|name| name.as_str())
    }

    pub fn handlers(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.handlers.values()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route of a handler: `<service>.<handler>`.
    pub fn route(&self, handler: &str) -> String {
        format!("{}.{}", self.name, handler)
    }

    /// Describe the registered handlers.
    pub fn schema(&self) -> ServiceSchema {
        let mut schema = ServiceSchema::new(&self.name);
        for handler in self.handlers.values() {
            schema.add_handler(
                handler.name(),
                handler.method(),
                handler.shape(),
                handler.arg_type().name(),
            );
        }
        schema
    }

    /// Decode `data` and invoke the named handler.
    pub fn call(&self, name: &str, session: &Session, data: &[u8]) -> Result<Option<Bytes>> {
        let handler = self
            .get(name)
            .ok_or_else(|| ServiceError::HandlerNotFound(self.route(name)))?;

        handler.call(session, data)
    }

    /// Take the handler map, e.g. to merge it into a dispatcher table.
    pub fn into_handlers(self) -> BTreeMap<String, HandlerDescriptor> {
        self.handlers
    }
}

/// Eligible methods of `methods` for a component bound in `form`, classified.
fn eligible<C>(
    methods: &MethodSet<C>,
    form: ReceiverKind,
) -> impl Iterator<Item = (&MethodSpec<C>, &Callable<C>, ArgShape, ArgType)>
where
    C: Component,
{
    methods.iter().filter_map(move |spec| {
        let signature = spec.signature();
        if let Err(reason) = signature.eligibility(form) {
            tracing::trace!("Skipping method {}: {}", signature.name, reason);
            return None;
        }
        let callable = spec.callable()?;
        let (shape, arg_type) = signature.classify()?;
        Some((spec, callable, shape, arg_type))
    })
}
