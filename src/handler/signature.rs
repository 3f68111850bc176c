//! Method signatures, eligibility and argument-shape classification.
//!
//! Every method a component declares carries a [`MethodSignature`]. A method
//! is a handler when it is exported, reachable from the receiver form the
//! registry was built with, takes `(&Session, X)` and returns a result plus
//! an error. Everything else is skipped without error.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::{MsgPackCodec, RawCodec};
use crate::error::Result;

/// How a method borrows its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// `&self`; callable through a shared `Arc<C>`.
    Shared,
    /// `&mut self`; needs the component behind a lock.
    Exclusive,
}

impl ReceiverKind {
    /// Whether a method with this receiver belongs to the method set of a
    /// component bound in `form`.
    ///
    /// The exclusive form reaches both kinds, the shared form only `&self`.
    pub fn reachable_from(self, form: ReceiverKind) -> bool {
        !(self == ReceiverKind::Exclusive && form == ReceiverKind::Shared)
    }
}

/// Argument shape of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgShape {
    /// Handler receives the undecoded payload bytes.
    Raw,
    /// Handler receives a payload decoded into its argument type.
    Structured,
}

/// Runtime description of a handler's argument type.
///
/// Carries the decoder a dispatcher needs to turn payload bytes into the
/// argument without naming the type statically.
#[derive(Clone, Copy)]
pub struct ArgType {
    id: TypeId,
    name: &'static str,
    decode: fn(&[u8]) -> Result<Box<dyn Any + Send>>,
}

impl ArgType {
    /// Argument type for a structured `T` decoded with MsgPack.
    pub fn of<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            decode: MsgPackCodec::decode_boxed::<T>,
        }
    }

    /// Argument type of raw handlers.
    pub fn raw() -> Self {
        Self {
            id: TypeId::of::<Bytes>(),
            name: type_name::<Bytes>(),
            decode: decode_raw,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, as reported by `std::any::type_name`.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is exactly `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Decode payload bytes into a boxed value of this type.
    pub fn decode(&self, data: &[u8]) -> Result<Box<dyn Any + Send>> {
        (self.decode)(data)
    }
}

fn decode_raw(data: &[u8]) -> Result<Box<dyn Any + Send>> {
    Ok(RawCodec::decode_boxed(data))
}

impl PartialEq for ArgType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ArgType {}

impl fmt::Debug for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArgType").field(&self.name).finish()
    }
}

/// Kind of a caller-supplied parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// `&Session`.
    Session,
    /// `Bytes`.
    Raw,
    /// Any other value type.
    Value(ArgType),
}

/// What a method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// `Result<()>`: an error only.
    Error,
    /// `HandlerResult<R>`: an optional result plus an error.
    ValueAndError,
}

/// Declared shape of one component method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub exported: bool,
    pub receiver: ReceiverKind,
    pub params: Vec<ParamKind>,
    pub returns: ReturnKind,
}

/// Why a method is not a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    Unexported,
    Unreachable,
    ParamCount(usize),
    MissingSession,
    SessionArgument,
    Returns(ReturnKind),
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::Unexported => f.write_str("method is not exported"),
            Ineligible::Unreachable => {
                f.write_str("method takes &mut self but the receiver is shared")
            }
            Ineligible::ParamCount(n) => write!(f, "expected 2 parameters, found {}", n),
            Ineligible::MissingSession => f.write_str("first parameter is not a session"),
            Ineligible::SessionArgument => f.write_str("second parameter is a session"),
            Ineligible::Returns(kind) => {
                write!(f, "returns {:?} instead of a value and an error", kind)
            }
        }
    }
}

impl MethodSignature {
    /// Check whether this method is a handler for a component bound in `form`.
    pub fn eligibility(&self, form: ReceiverKind) -> std::result::Result<(), Ineligible> {
        if !self.exported {
            return Err(Ineligible::Unexported);
        }
        if !self.receiver.reachable_from(form) {
            return Err(Ineligible::Unreachable);
        }
        if self.params.len() != 2 {
            return Err(Ineligible::ParamCount(self.params.len()));
        }
        if self.params[0] != ParamKind::Session {
            return Err(Ineligible::MissingSession);
        }
        if self.params[1] == ParamKind::Session {
            return Err(Ineligible::SessionArgument);
        }
        if self.returns != ReturnKind::ValueAndError {
            return Err(Ineligible::Returns(self.returns));
        }
        Ok(())
    }

    /// Classify the argument of an eligible method.
    ///
    /// Returns `None` when the second parameter is missing or is a session.
    pub fn classify(&self) -> Option<(ArgShape, ArgType)> {
        match self.params.get(1)? {
            ParamKind::Raw => Some((ArgShape::Raw, ArgType::raw())),
            ParamKind::Value(arg) => Some((ArgShape::Structured, *arg)),
            ParamKind::Session => None,
        }
    }
}
