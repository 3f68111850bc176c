//! Bound handler descriptors.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::signature::{ArgShape, ArgType};
use crate::codec::RawCodec;
use crate::error::{Result, ServiceError};
use crate::session::Session;

/// Argument handed to a handler by the dispatcher.
pub enum Payload {
    /// Undecoded bytes, for raw handlers.
    Raw(Bytes),
    /// Decoded argument, for structured handlers.
    Structured(Box<dyn Any + Send>),
}

impl Payload {
    /// Wrap an already decoded argument.
    pub fn structured<T: Any + Send>(value: T) -> Self {
        Payload::Structured(Box::new(value))
    }

    fn kind(&self) -> &'static str {
        match self {
            Payload::Raw(_) => "raw bytes",
            Payload::Structured(_) => "a structured payload of another type",
        }
    }

    pub(crate) fn into_raw(self, handler: &str) -> Result<Bytes> {
        match self {
            Payload::Raw(bytes) => Ok(bytes),
            other => Err(mismatch(handler, type_name::<Bytes>(), other.kind())),
        }
    }

    pub(crate) fn into_structured<T: Any>(self, handler: &str) -> Result<T> {
        match self {
            Payload::Structured(value) => value
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| {
                    mismatch(handler, type_name::<T>(), "a structured payload of another type")
                }),
            other => Err(mismatch(handler, type_name::<T>(), other.kind())),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Raw(bytes) => f.debug_tuple("Raw").field(bytes).finish(),
            Payload::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

fn mismatch(handler: &str, expected: &'static str, found: &'static str) -> ServiceError {
    ServiceError::ArgumentMismatch {
        handler: handler.to_string(),
        expected,
        found,
    }
}

/// Handler closure with its receiver already captured.
pub(crate) type BoundFn = Arc<dyn Fn(&Session, Payload) -> Result<Option<Bytes>> + Send + Sync>;

/// One discovered handler, bound to its component.
///
/// Descriptors are cheap to clone and self-contained: a dispatcher can
/// decode and invoke without going back to the registry.
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: String,
    method: String,
    shape: ArgShape,
    arg_type: ArgType,
    receiver: Arc<dyn Any + Send + Sync>,
    callable: BoundFn,
}

impl HandlerDescriptor {
    pub(crate) fn new(
        name: String,
        method: String,
        shape: ArgShape,
        arg_type: ArgType,
        receiver: Arc<dyn Any + Send + Sync>,
        callable: BoundFn,
    ) -> Self {
        Self {
            name,
            method,
            shape,
            arg_type,
            receiver,
            callable,
        }
    }

    /// Lookup name, after any rewrite.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method name as declared by the component.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn shape(&self) -> ArgShape {
        self.shape
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.shape == ArgShape::Raw
    }

    /// Type of the handler argument.
    #[inline]
    pub fn arg_type(&self) -> ArgType {
        self.arg_type
    }

    /// Component instance this handler runs against.
    pub fn receiver(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.receiver
    }

    /// Whether both descriptors run against the same component instance.
    pub fn shares_receiver(&self, other: &HandlerDescriptor) -> bool {
        same_allocation(&self.receiver, &other.receiver)
    }

    /// Decode payload bytes into the argument this handler expects.
    pub fn decode(&self, data: &[u8]) -> Result<Payload> {
        match self.shape {
            ArgShape::Raw => Ok(Payload::Raw(RawCodec::decode(data))),
            ArgShape::Structured => Ok(Payload::Structured(self.arg_type.decode(data)?)),
        }
    }

    /// Invoke the handler with an already decoded payload.
    ///
    /// Returns the MsgPack-encoded reply, or `None` when the handler
    /// produced no result.
    pub fn invoke(&self, session: &Session, payload: Payload) -> Result<Option<Bytes>> {
        (self.callable)(session, payload)
    }

    /// Decode `data` and invoke the handler.
    pub fn call(&self, session: &Session, data: &[u8]) -> Result<Option<Bytes>> {
        let payload = self.decode(data)?;
        self.invoke(session, payload)
    }
}

fn same_allocation<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl PartialEq for HandlerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.method == other.method
            && self.shape == other.shape
            && self.arg_type == other.arg_type
            && self.shares_receiver(other)
            && same_allocation(&self.callable, &other.callable)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("shape", &self.shape)
            .field("arg_type", &self.arg_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;

    fn echo_descriptor(receiver: Arc<dyn Any + Send + Sync>) -> HandlerDescriptor {
        let callable: BoundFn = Arc::new(
            |_session: &Session, payload: Payload| -> Result<Option<Bytes>> {
                let text: String = payload.into_structured("Echo")?;
                Ok(Some(MsgPackCodec::encode(&text)?))
            },
        );
        HandlerDescriptor::new(
            "Echo".to_string(),
            "Echo".to_string(),
            ArgShape::Structured,
            ArgType::of::<String>(),
            receiver,
            callable,
        )
    }

    #[test]
    fn test_call_decodes_structured_payload() {
        let descriptor = echo_descriptor(Arc::new(()));
        let session = Session::new(1);

        let input = MsgPackCodec::encode(&"ping").unwrap();
        let reply = descriptor.call(&session, &input).unwrap().unwrap();

        let text: String = MsgPackCodec::decode(&reply).unwrap();
        assert_eq!(text, "ping");
    }

    #[test]
    fn test_invoke_with_wrong_payload() {
        let descriptor = echo_descriptor(Arc::new(()));
        let session = Session::new(1);

        let result = descriptor.invoke(&session, Payload::Raw(Bytes::from_static(b"x")));
        assert!(matches!(
            result,
            Err(ServiceError::ArgumentMismatch { found: "raw bytes", .. })
        ));

        let result = descriptor.invoke(&session, Payload::structured(5u8));
        assert!(matches!(result, Err(ServiceError::ArgumentMismatch { .. })));
    }

    #[test]
    fn test_raw_payload_conversion() {
        let bytes = Bytes::from_static(b"abc");
        assert_eq!(Payload::Raw(bytes.clone()).into_raw("Ping").unwrap(), bytes);
        assert!(Payload::structured(1u8).into_raw("Ping").is_err());
    }

    #[test]
    fn test_equality_tracks_receiver() {
        let receiver: Arc<dyn Any + Send + Sync> = Arc::new(String::from("component"));
        let a = echo_descriptor(receiver.clone());
        let b = a.clone();
        let c = echo_descriptor(receiver);

        assert_eq!(a, b);
        assert!(a.shares_receiver(&c));
        // same receiver, different closure allocation
        assert_ne!(a, c);
    }
}
