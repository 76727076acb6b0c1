//! Typed recipient handlers for one Rust target type

use courier_codec::Payload;
use courier_compiler::HandlerKind;
use courier_core::{CourierError, CourierResult, Node};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

type Erased<T> = Arc<dyn Fn(&T, &Payload, &str) -> CourierResult<()> + Send + Sync>;

/// One type-erased handler
pub struct Handler<T> {
    kind: HandlerKind,
    payload_type: &'static str,
    call: Erased<T>,
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            payload_type: self.payload_type,
            call: self.call.clone(),
        }
    }
}

impl<T> Handler<T> {
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Rust type name the handler expects
    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }

    /// Deliver a decoded payload; `node` is the source node id
    pub fn call(&self, target: &T, payload: &Payload, node: &str) -> CourierResult<()> {
        (self.call)(target, payload, node)
    }
}

impl<T> std::fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &self.kind)
            .field("payload_type", &self.payload_type)
            .finish()
    }
}

fn downcast<P: Any + Clone>(payload: &Payload) -> CourierResult<P> {
    payload.downcast_ref::<P>().cloned().ok_or_else(|| {
        CourierError::Registry(format!("payload is not a {}", type_name::<P>()))
    })
}

/// Handlers for every recipient a Rust type declares, keyed by member name
///
/// Fields are usually behind interior mutability, so an assign handler takes
/// `&T` like every other handler.
///
/// ```ignore
/// let table = RecipientTable::<Screen>::new()
///     .assign("value", |s: &Screen, v: i32| s.value.store(v, Ordering::SeqCst))
///     .invoke("on_new_value", Screen::on_new_value);
/// ```
pub struct RecipientTable<T> {
    handlers: HashMap<String, Handler<T>>,
}

impl<T> Default for RecipientTable<T> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<T: Send + Sync + 'static> RecipientTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert<P: 'static>(
        mut self,
        name: impl Into<String>,
        kind: HandlerKind,
        call: Erased<T>,
    ) -> Self {
        self.handlers.insert(
            name.into(),
            Handler {
                kind,
                payload_type: type_name::<P>(),
                call,
            },
        );
        self
    }

    /// Store a decoded payload into a field
    pub fn assign<P, F>(self, name: impl Into<String>, f: F) -> Self
    where
        P: Any + Clone + Send + Sync,
        F: Fn(&T, P) + Send + Sync + 'static,
    {
        self.insert::<P>(
            name,
            HandlerKind::Assign,
            Arc::new(move |target, payload, _| {
                f(target, downcast::<P>(payload)?);
                Ok(())
            }),
        )
    }

    /// Call a method with a decoded payload
    pub fn invoke<P, F>(self, name: impl Into<String>, f: F) -> Self
    where
        P: Any + Clone + Send + Sync,
        F: Fn(&T, P) + Send + Sync + 'static,
    {
        self.insert::<P>(
            name,
            HandlerKind::Invoke,
            Arc::new(move |target, payload, _| {
                f(target, downcast::<P>(payload)?);
                Ok(())
            }),
        )
    }

    /// Call a method with a decoded payload and the source node id
    pub fn invoke_with_node<P, F>(self, name: impl Into<String>, f: F) -> Self
    where
        P: Any + Clone + Send + Sync,
        F: Fn(&T, P, &str) + Send + Sync + 'static,
    {
        self.insert::<P>(
            name,
            HandlerKind::InvokeWithNode,
            Arc::new(move |target, payload, node| {
                f(target, downcast::<P>(payload)?, node);
                Ok(())
            }),
        )
    }

    /// Receive the local node identity (field or method)
    pub fn local_node<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T, Node) + Send + Sync + 'static,
    {
        self.insert::<Node>(
            name,
            HandlerKind::LocalNode,
            Arc::new(move |target, payload, _| {
                f(target, downcast::<Node>(payload)?);
                Ok(())
            }),
        )
    }

    /// Receive the connected node list (field or method)
    pub fn remote_nodes<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T, Vec<Node>) + Send + Sync + 'static,
    {
        self.insert::<Vec<Node>>(
            name,
            HandlerKind::RemoteNodes,
            Arc::new(move |target, payload, _| {
                f(target, downcast::<Vec<Node>>(payload)?);
                Ok(())
            }),
        )
    }
}

impl<T> RecipientTable<T> {
    pub fn get(&self, name: &str) -> Option<&Handler<T>> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> std::fmt::Debug for RecipientTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RecipientTable")
            .field("handlers", &names)
            .finish()
    }
}
