//! Component method sets.
//!
//! Components declare their methods once in [`Component::methods`]. The
//! registry scans the resulting [`MethodSet`] in declaration order and keeps
//! the handler-shaped ones.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use service_registry::{Component, HandlerResult, MethodSet, Session};
//!
//! struct Room;
//!
//! impl Room {
//!     fn join(&self, _session: &Session, room: String) -> HandlerResult<String> {
//!         Ok(Some(format!("joined {}", room)))
//!     }
//!
//!     fn ping(&self, _session: &Session, data: Bytes) -> HandlerResult<usize> {
//!         Ok(Some(data.len()))
//!     }
//! }
//!
//! impl Component for Room {
//!     fn methods(set: &mut MethodSet<Self>) {
//!         set.typed("Join", Room::join);
//!         set.raw("Ping", Room::ping);
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::descriptor::{BoundFn, Payload};
use super::signature::{ArgType, MethodSignature, ParamKind, ReceiverKind, ReturnKind};
use crate::codec::MsgPackCodec;
use crate::error::Result;
use crate::session::Session;

/// Result of a handler: an optional reply or an error.
pub type HandlerResult<R> = Result<Option<R>>;

/// A type whose methods can be registered as a service.
pub trait Component: Send + Sync + 'static {
    /// Declare every method of the component.
    fn methods(set: &mut MethodSet<Self>)
    where
        Self: Sized;
}

type SharedFn<C> = Arc<dyn Fn(&C, &Session, Payload) -> Result<Option<Bytes>> + Send + Sync>;
type ExclusiveFn<C> = Arc<dyn Fn(&mut C, &Session, Payload) -> Result<Option<Bytes>> + Send + Sync>;

/// Unbound method, waiting for a receiver.
pub(crate) enum Callable<C> {
    Shared(SharedFn<C>),
    Exclusive(ExclusiveFn<C>),
}

/// Component instance a registry is bound to.
pub(crate) enum Receiver<C> {
    Shared(Arc<C>),
    Exclusive(Arc<RwLock<C>>),
}

impl<C: Component> Receiver<C> {
    pub(crate) fn form(&self) -> ReceiverKind {
        match self {
            Receiver::Shared(_) => ReceiverKind::Shared,
            Receiver::Exclusive(_) => ReceiverKind::Exclusive,
        }
    }

    pub(crate) fn erased(&self) -> Arc<dyn Any + Send + Sync> {
        match self {
            Receiver::Shared(component) => component.clone() as Arc<dyn Any + Send + Sync>,
            Receiver::Exclusive(component) => component.clone() as Arc<dyn Any + Send + Sync>,
        }
    }
}

impl<C: Component> Callable<C> {
    /// Capture `receiver` into the method.
    ///
    /// Returns `None` for a `&mut self` method on a shared receiver.
    pub(crate) fn bind(&self, receiver: &Receiver<C>) -> Option<BoundFn> {
        let bound: BoundFn = match (self, receiver) {
            (Callable::Shared(method), Receiver::Shared(component)) => {
                let method = method.clone();
                let component = component.clone();
                Arc::new(move |session: &Session, payload: Payload| {
                    method(&*component, session, payload)
                })
            }
            (Callable::Shared(method), Receiver::Exclusive(component)) => {
                let method = method.clone();
                let component = component.clone();
                Arc::new(move |session: &Session, payload: Payload| {
                    let guard = component.read();
                    method(&*guard, session, payload)
                })
            }
            (Callable::Exclusive(method), Receiver::Exclusive(component)) => {
                let method = method.clone();
                let component = component.clone();
                Arc::new(move |session: &Session, payload: Payload| {
                    let mut guard = component.write();
                    method(&mut *guard, session, payload)
                })
            }
            (Callable::Exclusive(_), Receiver::Shared(_)) => return None,
        };
        Some(bound)
    }
}

/// One declared method: its signature and, for handler shapes, the callable.
pub struct MethodSpec<C> {
    signature: MethodSignature,
    callable: Option<Callable<C>>,
}

impl<C> MethodSpec<C> {
    /// Mark the method as not exported. It will never be registered.
    pub fn private(&mut self) -> &mut Self {
        self.signature.exported = false;
        self
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub(crate) fn callable(&self) -> Option<&Callable<C>> {
        self.callable.as_ref()
    }
}

/// Ordered set of methods declared by a component.
pub struct MethodSet<C> {
    methods: Vec<MethodSpec<C>>,
}

impl<C: Component> MethodSet<C> {
    /// Collect the method set of `C`.
    pub fn of() -> Self {
        let mut set = Self {
            methods: Vec::new(),
        };
        C::methods(&mut set);
        set
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodSpec<C>> {
        self.methods.iter()
    }

    /// Declare a `&self` handler taking raw payload bytes.
    pub fn raw<R, F>(&mut self, name: &str, handler: F) -> &mut MethodSpec<C>
    where
        F: Fn(&C, &Session, Bytes) -> HandlerResult<R> + Send + Sync + 'static,
        R: Serialize + 'static,
    {
        let method = name.to_string();
        let callable: SharedFn<C> = Arc::new(
            move |component: &C, session: &Session, payload: Payload| -> Result<Option<Bytes>> {
                let data = payload.into_raw(&method)?;
                encode_reply(handler(component, session, data)?)
            },
        );
        self.push(
            name,
            ReceiverKind::Shared,
            vec![ParamKind::Session, ParamKind::Raw],
            ReturnKind::ValueAndError,
            Some(Callable::Shared(callable)),
        )
    }

    /// Declare a `&mut self` handler taking raw payload bytes.
    pub fn raw_mut<R, F>(&mut self, name: &str, handler: F) -> &mut MethodSpec<C>
    where
        F: Fn(&mut C, &Session, Bytes) -> HandlerResult<R> + Send + Sync + 'static,
        R: Serialize + 'static,
    {
        let method = name.to_string();
        let callable: ExclusiveFn<C> = Arc::new(
            move |component: &mut C, session: &Session, payload: Payload| -> Result<Option<Bytes>> {
                let data = payload.into_raw(&method)?;
                encode_reply(handler(component, session, data)?)
            },
        );
        self.push(
            name,
            ReceiverKind::Exclusive,
            vec![ParamKind::Session, ParamKind::Raw],
            ReturnKind::ValueAndError,
            Some(Callable::Exclusive(callable)),
        )
    }

    /// Declare a `&self` handler taking a structured argument.
    pub fn typed<T, R, F>(&mut self, name: &str, handler: F) -> &mut MethodSpec<C>
    where
        F: Fn(&C, &Session, T) -> HandlerResult<R> + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + 'static,
    {
        let method = name.to_string();
        let callable: SharedFn<C> = Arc::new(
            move |component: &C, session: &Session, payload: Payload| -> Result<Option<Bytes>> {
                let arg = payload.into_structured::<T>(&method)?;
                encode_reply(handler(component, session, arg)?)
            },
        );
        self.push(
            name,
            ReceiverKind::Shared,
            vec![ParamKind::Session, ParamKind::Value(ArgType::of::<T>())],
            ReturnKind::ValueAndError,
            Some(Callable::Shared(callable)),
        )
    }

    /// Declare a `&mut self` handler taking a structured argument.
    pub fn typed_mut<T, R, F>(&mut self, name: &str, handler: F) -> &mut MethodSpec<C>
    where
        F: Fn(&mut C, &Session, T) -> HandlerResult<R> + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + 'static,
    {
        let method = name.to_string();
        let callable: ExclusiveFn<C> = Arc::new(
            move |component: &mut C, session: &Session, payload: Payload| -> Result<Option<Bytes>> {
                let arg = payload.into_structured::<T>(&method)?;
                encode_reply(handler(component, session, arg)?)
            },
        );
        self.push(
            name,
            ReceiverKind::Exclusive,
            vec![ParamKind::Session, ParamKind::Value(ArgType::of::<T>())],
            ReturnKind::ValueAndError,
            Some(Callable::Exclusive(callable)),
        )
    }

    /// Declare a notification method: session and argument, but no result.
    ///
    /// Notifications are part of the method set, not request handlers.
    pub fn notify<T, F>(&mut self, name: &str, _handler: F) -> &mut MethodSpec<C>
    where
        F: Fn(&C, &Session, T) -> Result<()> + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
    {
        self.push(
            name,
            ReceiverKind::Shared,
            vec![ParamKind::Session, ParamKind::Value(ArgType::of::<T>())],
            ReturnKind::Error,
            None,
        )
    }

    /// Declare a plain method that takes no session.
    pub fn method<T, R, F>(&mut self, name: &str, _method: F) -> &mut MethodSpec<C>
    where
        F: Fn(&C, T) -> HandlerResult<R> + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
    {
        self.push(
            name,
            ReceiverKind::Shared,
            vec![ParamKind::Value(ArgType::of::<T>())],
            ReturnKind::ValueAndError,
            None,
        )
    }

    fn push(
        &mut self,
        name: &str,
        receiver: ReceiverKind,
        params: Vec<ParamKind>,
        returns: ReturnKind,
        callable: Option<Callable<C>>,
    ) -> &mut MethodSpec<C> {
        self.methods.push(MethodSpec {
            signature: MethodSignature {
                name: name.to_string(),
                exported: true,
                receiver,
                params,
                returns,
            },
            callable,
        });
        let last = self.methods.len() - 1;
        &mut self.methods[last]
    }
}

fn encode_reply<R: Serialize>(reply: Option<R>) -> Result<Option<Bytes>> {
    reply.map(|value| MsgPackCodec::encode(&value)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::signature::ArgShape;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    impl Counter {
        fn peek(&self, _session: &Session, _data: Bytes) -> HandlerResult<u32> {
            Ok(Some(self.hits))
        }

        fn add(&mut self, _session: &Session, n: u32) -> HandlerResult<u32> {
            self.hits += n;
            Ok(Some(self.hits))
        }

        fn reset(&self, _session: &Session, _n: u32) -> Result<()> {
            Ok(())
        }

        fn total(&self, _n: u32) -> HandlerResult<u32> {
            Ok(Some(self.hits))
        }
    }

    impl Component for Counter {
        fn methods(set: &mut MethodSet<Self>) {
            set.raw("Peek", Counter::peek);
            set.typed_mut("Add", Counter::add);
            set.notify("Reset", Counter::reset);
            set.method("Total", Counter::total);
            set.typed("hidden", |_: &Counter, _: &Session, _: String| -> HandlerResult<()> {
                Ok(None)
            })
            .private();
        }
    }

    #[test]
    fn test_declaration_order() {
        let set = MethodSet::<Counter>::of();
        let names: Vec<_> = set.iter().map(|m| m.signature().name.as_str()).collect();

        assert_eq!(set.len(), 5);
        assert_eq!(names, ["Peek", "Add", "Reset", "Total", "hidden"]);
    }

    #[test]
    fn test_declared_signatures() {
        let set = MethodSet::<Counter>::of();
        let specs: Vec<_> = set.iter().collect();

        assert_eq!(specs[0].signature().classify().unwrap().0, ArgShape::Raw);
        assert_eq!(specs[1].signature().receiver, ReceiverKind::Exclusive);
        assert_eq!(specs[2].signature().returns, ReturnKind::Error);
        assert!(specs[2].callable().is_none());
        assert_eq!(specs[3].signature().params.len(), 1);
        assert!(!specs[4].signature().exported);
    }

    #[test]
    fn test_bind_shared_method_to_exclusive_receiver() {
        let set = MethodSet::<Counter>::of();
        let receiver = Receiver::Exclusive(Arc::new(RwLock::new(Counter { hits: 3 })));
        let peek = set.iter().next().unwrap().callable().unwrap();

        let bound = peek.bind(&receiver).unwrap();
        let reply = bound(&Session::new(1), Payload::Raw(Bytes::new())).unwrap().unwrap();
        let hits: u32 = MsgPackCodec::decode(&reply).unwrap();
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_bind_exclusive_method() {
        let set = MethodSet::<Counter>::of();
        let add = set.iter().nth(1).unwrap().callable().unwrap();

        let shared = Receiver::Shared(Arc::new(Counter::default()));
        assert!(add.bind(&shared).is_none());

        let exclusive = Receiver::Exclusive(Arc::new(RwLock::new(Counter::default())));
        let bound = add.bind(&exclusive).unwrap();
        let session = Session::new(1);
        bound(&session, Payload::structured(2u32)).unwrap();
        let reply = bound(&session, Payload::structured(5u32)).unwrap().unwrap();

        let hits: u32 = MsgPackCodec::decode(&reply).unwrap();
        assert_eq!(hits, 7);
    }
}
