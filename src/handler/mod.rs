//! Handler module - method sets, signatures and bound descriptors.
//!
//! Provides:
//! - [`Component`] / [`MethodSet`] - how a component declares its methods
//! - [`MethodSignature`] - eligibility predicate and argument classification
//! - [`HandlerDescriptor`] - a discovered handler bound to its component

mod descriptor;
mod method_set;
mod signature;

pub use descriptor::{HandlerDescriptor, Payload};
pub(crate) use descriptor::BoundFn;
pub(crate) use method_set::{Callable, Receiver};
pub use method_set::{Component, HandlerResult, MethodSet, MethodSpec};
pub use signature::{
    ArgShape, ArgType, Ineligible, MethodSignature, ParamKind, ReceiverKind, ReturnKind,
};
