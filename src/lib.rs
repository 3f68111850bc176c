//! # service-registry
//!
//! Discovers the request handlers of application components and builds a
//! lookup table from handler name to a bound, invocable descriptor.
//!
//! A component declares its methods once through [`Component::methods`]. A
//! [`ServiceRegistry`] wraps one component instance; [`ServiceRegistry::extract`]
//! keeps the methods that look like handlers, `(&Session, X) -> HandlerResult<R>`,
//! classifies each as raw (`X = Bytes`) or structured, applies the configured
//! naming, and binds every handler to the instance.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use service_registry::codec::MsgPackCodec;
//! use service_registry::service::with_name;
//! use service_registry::{Component, HandlerResult, MethodSet, ServiceRegistry, Session};
//!
//! struct Chat;
//!
//! impl Chat {
//!     fn send(&self, session: &Session, text: String) -> HandlerResult<String> {
//!         session.push("chat.message", &text)?;
//!         Ok(Some(text))
//!     }
//!
//!     fn ping(&self, _session: &Session, _data: Bytes) -> HandlerResult<()> {
//!         Ok(None)
//!     }
//! }
//!
//! impl Component for Chat {
//!     fn methods(set: &mut MethodSet<Self>) {
//!         set.typed("Send", Chat::send);
//!         set.raw("Ping", Chat::ping);
//!     }
//! }
//!
//! let mut registry = ServiceRegistry::new(Arc::new(Chat), [with_name("chat")]);
//! registry.extract().unwrap();
//!
//! let handler = registry.get("Send").unwrap();
//! let input = MsgPackCodec::encode(&"hi").unwrap();
//! let reply = handler.call(&Session::new(1), &input).unwrap();
//! assert!(reply.is_some());
//! ```

pub mod codec;
pub mod error;
pub mod handler;
pub mod service;
pub mod session;

pub use error::{Result, ServiceError};
pub use handler::{ArgShape, Component, HandlerDescriptor, HandlerResult, MethodSet, Payload};
pub use service::{ServiceRegistry, ServiceSchema};
pub use session::Session;
