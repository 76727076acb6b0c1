//! Runtime dispatcher: subscriptions and delivery for one bound type
//!
//! A [`Dispatcher`] is made of at most one layer of its own (built from the
//! postal area of its declared type) and an optional link to the dispatcher
//! of its parent type. Starting a target starts the parent's layers first,
//! on a projection of the target, then its own.
//!
//! Listener ids of every layer are kept in one session per target. Stopping
//! a target marks the session cancelled on the calling thread, so a start
//! still subscribing in the background drops whatever it adds afterwards.

use crate::executor::MainThread;
use crate::recipients::{Handler, RecipientTable};
use crate::source::{
    DataEvent, DataItem, DataChange, EventSource, ListenerId, MessageEvent, NodeEvent,
};
use async_trait::async_trait;
use courier_codec::{Packager, Payload};
use courier_compiler::decl::{NODE_LIST_TYPE, NODE_TYPE};
use courier_compiler::{Category, PostalArea, Recipient, Route};
use courier_core::{CourierError, CourierResult, Node, ReceiverState};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

/// Collaborators shared by every dispatcher of one courier
pub(crate) struct DispatchContext {
    pub source: Arc<dyn EventSource>,
    pub main: Arc<dyn MainThread>,
    pub packager: Packager,
    pub deliver_local_data: bool,
    pub handle: Handle,
}

/// Borrowed view of a delivery target
///
/// Derived dispatchers hand their parent a projection of the target rather
/// than the target itself.
pub trait Target<T>: Send + Sync {
    fn get(&self) -> &T;
}

struct Direct<T>(Arc<T>);

impl<T: Send + Sync> Target<T> for Direct<T> {
    fn get(&self) -> &T {
        &self.0
    }
}

struct Projected<C, P> {
    owner: Arc<dyn Target<C>>,
    project: fn(&C) -> &P,
}

impl<C: 'static, P: 'static> Target<P> for Projected<C, P> {
    fn get(&self) -> &P {
        (self.project)(self.owner.get())
    }
}

/// Identity of a target: the address of its shared allocation
pub(crate) fn target_key<T>(target: &Arc<T>) -> usize {
    Arc::as_ptr(target) as *const () as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenerKind {
    Message,
    Data,
    Node,
}

#[derive(Debug, Clone)]
pub(crate) struct Subscription {
    layer: String,
    kind: ListenerKind,
    id: ListenerId,
}

#[derive(Debug, Default)]
pub(crate) struct Session {
    cancelled: bool,
    subscriptions: Vec<Subscription>,
}

impl Session {
    /// Record a new subscription unless the session was stopped meanwhile
    fn keep(&mut self, subscription: Subscription) -> Result<(), Subscription> {
        if self.cancelled {
            return Err(subscription);
        }
        self.subscriptions.push(subscription);
        Ok(())
    }

    fn cancel(&mut self) -> Vec<Subscription> {
        self.cancelled = true;
        std::mem::take(&mut self.subscriptions)
    }
}

/// Remove listeners, logging failures
pub(crate) async fn release(source: &dyn EventSource, subscriptions: Vec<Subscription>) {
    for sub in subscriptions {
        let result = match sub.kind {
            ListenerKind::Message => source.remove_message_listener(sub.id).await,
            ListenerKind::Data => source.remove_data_listener(sub.id).await,
            ListenerKind::Node => source.remove_node_listener(sub.id).await,
        };
        match result {
            Ok(()) => debug!(layer = %sub.layer, kind = ?sub.kind, id = %sub.id, "listener removed"),
            Err(e) => warn!(layer = %sub.layer, kind = ?sub.kind, id = %sub.id, error = %e, "failed to remove listener"),
        }
    }
}

struct Bound<T> {
    recipient: Recipient,
    handler: Handler<T>,
}

impl<T> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Self {
            recipient: self.recipient.clone(),
            handler: self.handler.clone(),
        }
    }
}

struct BoundRoute<T> {
    path: String,
    /// Distinct payload types of the bound recipients, first-seen order
    payload_types: Vec<String>,
    recipients: Vec<Bound<T>>,
}

type Payloads = Arc<HashMap<String, Payload>>;

fn single_payload(type_name: &str, payload: Payload) -> Payloads {
    Arc::new(HashMap::from([(type_name.to_string(), payload)]))
}

/// Delivery tables for one postal area, resolved against a recipient table
pub(crate) struct Layer<T> {
    owner: String,
    local_node: Vec<Bound<T>>,
    remote_nodes: Vec<Bound<T>>,
    message_routes: HashMap<String, BoundRoute<T>>,
    data_routes: HashMap<String, BoundRoute<T>>,
}

impl<T: Send + Sync + 'static> Layer<T> {
    /// Resolve handlers; recipients without a matching handler are skipped
    pub(crate) fn build(area: &PostalArea, table: &RecipientTable<T>) -> Self {
        let bind = |category: Category, recipient: &Recipient| -> Option<Bound<T>> {
            let expected = recipient.handler_kind(category);
            match table.get(&recipient.name) {
                None => {
                    warn!(owner = %area.owner, recipient = %recipient.name, %expected, "no handler for recipient, skipped");
                    None
                }
                Some(handler) if handler.kind() != expected => {
                    warn!(
                        owner = %area.owner,
                        recipient = %recipient.name,
                        %expected,
                        found = %handler.kind(),
                        "handler kind does not match recipient, skipped"
                    );
                    None
                }
                Some(handler) => Some(Bound {
                    recipient: recipient.clone(),
                    handler: handler.clone(),
                }),
            }
        };

        let bind_route = |route: &Route| -> BoundRoute<T> {
            let recipients: Vec<Bound<T>> = route
                .recipients()
                .iter()
                .filter_map(|r| bind(route.category(), r))
                .collect();
            let mut payload_types: Vec<String> = Vec::new();
            for bound in &recipients {
                if !payload_types.contains(&bound.recipient.payload_type) {
                    payload_types.push(bound.recipient.payload_type.clone());
                }
            }
            BoundRoute {
                path: route.path.clone(),
                payload_types,
                recipients,
            }
        };

        Self {
            owner: area.owner.clone(),
            local_node: area
                .local_node_recipients()
                .iter()
                .filter_map(|r| bind(Category::LocalNode, r))
                .collect(),
            remote_nodes: area
                .remote_node_recipients()
                .iter()
                .filter_map(|r| bind(Category::RemoteNodes, r))
                .collect(),
            message_routes: area
                .message_routes()
                .iter()
                .map(|r| (r.path.clone(), bind_route(r)))
                .collect(),
            data_routes: area
                .data_routes()
                .iter()
                .map(|r| (r.path.clone(), bind_route(r)))
                .collect(),
        }
    }

    fn needs_node_listener(&self) -> bool {
        !self.remote_nodes.is_empty() || !self.data_routes.is_empty()
    }

    /// Background recipients inline, then every main recipient in one task
    fn deliver(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
        recipients: &[Bound<T>],
        payloads: Payloads,
        node: &str,
    ) {
        for bound in recipients.iter().filter(|b| b.recipient.is_background()) {
            call(&self.owner, bound, target.get(), &payloads, node);
        }

        let main: Vec<Bound<T>> = recipients
            .iter()
            .filter(|b| !b.recipient.is_background())
            .cloned()
            .collect();
        if main.is_empty() {
            return;
        }
        let owner = self.owner.clone();
        let target = target.clone();
        let node = node.to_string();
        ctx.main.post(Box::new(move || {
            for bound in &main {
                call(&owner, bound, target.get(), &payloads, &node);
            }
        }));
    }

    /// Decode once per distinct payload type, then deliver
    fn deliver_route(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
        route: &BoundRoute<T>,
        data: &[u8],
        node: &str,
    ) {
        let mut payloads = HashMap::with_capacity(route.payload_types.len());
        for type_name in &route.payload_types {
            match ctx.packager.decode_payload(type_name, data) {
                Ok(payload) => {
                    payloads.insert(type_name.clone(), payload);
                }
                Err(e) => {
                    warn!(
                        owner = %self.owner,
                        path = %route.path,
                        payload_type = %type_name,
                        error = %CourierError::from(e),
                        "failed to decode payload, event skipped"
                    );
                    return;
                }
            }
        }
        trace!(owner = %self.owner, path = %route.path, source_node = node, "delivering");
        self.deliver(ctx, target, &route.recipients, Arc::new(payloads), node);
    }

    fn on_message(&self, ctx: &DispatchContext, target: &Arc<dyn Target<T>>, event: &MessageEvent) {
        if let Some(route) = self.message_routes.get(&event.path) {
            self.deliver_route(ctx, target, route, &event.data, &event.source_node);
        }
    }

    fn accepts(&self, ctx: &DispatchContext, local_id: Option<&str>, item: &DataItem) -> bool {
        if !ctx.deliver_local_data && local_id == Some(item.source_node.as_str()) {
            trace!(owner = %self.owner, path = %item.path, "local data item not delivered");
            return false;
        }
        true
    }

    fn on_data(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
        local_id: Option<&str>,
        item: &DataItem,
    ) {
        if !self.accepts(ctx, local_id, item) {
            return;
        }
        if let Some(route) = self.data_routes.get(&item.path) {
            self.deliver_route(ctx, target, route, &item.data, &item.source_node);
        }
    }

    async fn replay(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
        local_id: Option<&str>,
    ) -> CourierResult<()> {
        let items = ctx.source.data_items().await?;
        debug!(owner = %self.owner, items = items.len(), "replaying data items");
        for item in &items {
            self.on_data(ctx, target, local_id, item);
        }
        Ok(())
    }

    async fn deliver_remote_nodes(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
    ) -> CourierResult<()> {
        let nodes = ctx.source.connected_nodes().await?;
        trace!(owner = %self.owner, nodes = nodes.len(), "delivering remote nodes");
        let payloads = single_payload(NODE_LIST_TYPE, Arc::new(nodes));
        self.deliver(ctx, target, &self.remote_nodes, payloads, "");
        Ok(())
    }

    async fn on_node_event(
        &self,
        ctx: &DispatchContext,
        target: &Arc<dyn Target<T>>,
        local_id: Option<&str>,
        connected: bool,
    ) -> CourierResult<()> {
        if !self.remote_nodes.is_empty() {
            self.deliver_remote_nodes(ctx, target).await?;
        }
        if connected && !self.data_routes.is_empty() {
            self.replay(ctx, target, local_id).await?;
        }
        Ok(())
    }

    /// Subscribe this layer for one target
    ///
    /// Returns early without error when the session is cancelled midway.
    async fn start(
        self: &Arc<Self>,
        ctx: &Arc<DispatchContext>,
        session: &Arc<Mutex<Session>>,
        target: &Arc<dyn Target<T>>,
    ) -> CourierResult<()> {
        let source = ctx.source.as_ref();
        let weak_ctx = Arc::downgrade(ctx);

        let mut local: Option<Node> = None;
        if !self.local_node.is_empty() || (!ctx.deliver_local_data && !self.data_routes.is_empty()) {
            local = Some(source.local_node().await?);
        }
        if let Some(node) = local.as_ref().filter(|_| !self.local_node.is_empty()) {
            let payloads = single_payload(NODE_TYPE, Arc::new(node.clone()));
            self.deliver(ctx, target, &self.local_node, payloads, "");
        }
        let local_id: Option<Arc<str>> = local.map(|n| Arc::from(n.id));

        if self.needs_node_listener() {
            let layer = self.clone();
            let node_target = target.clone();
            let local_id = local_id.clone();
            let weak = weak_ctx.clone();
            let listener = Arc::new(move |event: &NodeEvent| {
                let Some(ctx) = weak.upgrade() else {
                    return;
                };
                let connected = matches!(event, NodeEvent::PeerConnected(_));
                trace!(owner = %layer.owner, connected, "node event");
                let layer = layer.clone();
                let target = node_target.clone();
                let local_id = local_id.clone();
                let handle = ctx.handle.clone();
                handle.spawn(async move {
                    if let Err(e) = layer
                        .on_node_event(&ctx, &target, local_id.as_deref(), connected)
                        .await
                    {
                        warn!(owner = %layer.owner, error = %e, "failed to handle node event");
                    }
                });
            });
            let id = source.add_node_listener(listener).await?;
            if !self.keep(ctx, session, ListenerKind::Node, id).await {
                return Ok(());
            }
            if !self.remote_nodes.is_empty() {
                self.deliver_remote_nodes(ctx, target).await?;
            }
        }

        if !self.message_routes.is_empty() {
            let layer = self.clone();
            let target = target.clone();
            let weak = weak_ctx.clone();
            let listener = Arc::new(move |event: &MessageEvent| {
                if let Some(ctx) = weak.upgrade() {
                    layer.on_message(&ctx, &target, event);
                }
            });
            let id = source.add_message_listener(listener).await?;
            if !self.keep(ctx, session, ListenerKind::Message, id).await {
                return Ok(());
            }
        }

        if !self.data_routes.is_empty() {
            let layer = self.clone();
            let data_target = target.clone();
            let data_local = local_id.clone();
            let weak = weak_ctx.clone();
            let listener = Arc::new(move |event: &DataEvent| {
                if event.change == DataChange::Deleted {
                    return;
                }
                if let Some(ctx) = weak.upgrade() {
                    layer.on_data(&ctx, &data_target, data_local.as_deref(), &event.item);
                }
            });
            let id = source.add_data_listener(listener).await?;
            if !self.keep(ctx, session, ListenerKind::Data, id).await {
                return Ok(());
            }
            self.replay(ctx, target, local_id.as_deref()).await?;
        }

        Ok(())
    }

    /// Record a subscription, or remove it right away if stopped meanwhile
    async fn keep(
        &self,
        ctx: &DispatchContext,
        session: &Mutex<Session>,
        kind: ListenerKind,
        id: ListenerId,
    ) -> bool {
        let subscription = Subscription {
            layer: self.owner.clone(),
            kind,
            id,
        };
        let rejected = session.lock().keep(subscription).err();
        match rejected {
            None => {
                debug!(owner = %self.owner, ?kind, %id, "listener added");
                true
            }
            Some(subscription) => {
                debug!(owner = %self.owner, ?kind, %id, "stopped while starting, removing listener");
                release(ctx.source.as_ref(), vec![subscription]).await;
                false
            }
        }
    }
}

fn call<T>(owner: &str, bound: &Bound<T>, target: &T, payloads: &Payloads, node: &str) {
    let Some(payload) = payloads.get(&bound.recipient.payload_type) else {
        warn!(owner, recipient = %bound.recipient.name, "no payload decoded for recipient");
        return;
    };
    if let Err(e) = bound.handler.call(target, payload, node) {
        warn!(owner, recipient = %bound.recipient.name, error = %e, "delivery failed");
    }
}

/// A parent dispatcher seen from a derived type
#[async_trait]
pub(crate) trait ParentLink<C>: Send + Sync {
    fn name(&self) -> &str;

    fn layer_owners(&self) -> Vec<String>;

    async fn start_layers(
        &self,
        ctx: &Arc<DispatchContext>,
        session: &Arc<Mutex<Session>>,
        target: Arc<dyn Target<C>>,
    ) -> CourierResult<()>;
}

pub(crate) struct Link<C, P> {
    pub parent: Arc<Dispatcher<P>>,
    pub project: fn(&C) -> &P,
}

#[async_trait]
impl<C, P> ParentLink<C> for Link<C, P>
where
    C: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.parent.name()
    }

    fn layer_owners(&self) -> Vec<String> {
        self.parent.layer_owners()
    }

    async fn start_layers(
        &self,
        ctx: &Arc<DispatchContext>,
        session: &Arc<Mutex<Session>>,
        target: Arc<dyn Target<C>>,
    ) -> CourierResult<()> {
        let projected: Arc<dyn Target<P>> = Arc::new(Projected {
            owner: target,
            project: self.project,
        });
        self.parent.start_layers(ctx, session, projected).await
    }
}

/// Receiving state of one target
///
/// The weak reference pins the target's allocation, so its address is not
/// handed to another target while the record exists.
struct StateRecord<T> {
    target: Weak<T>,
    state: ReceiverState,
}

/// Dispatcher for one Rust target type
pub struct Dispatcher<T> {
    name: String,
    layer: Option<Arc<Layer<T>>>,
    parent: Option<Arc<dyn ParentLink<T>>>,
    sessions: DashMap<usize, Arc<Mutex<Session>>>,
    states: DashMap<usize, StateRecord<T>>,
}

impl<T: Send + Sync + 'static> Dispatcher<T> {
    pub(crate) fn new(
        name: impl Into<String>,
        layer: Option<Layer<T>>,
        parent: Option<Arc<dyn ParentLink<T>>>,
    ) -> Self {
        Self {
            name: name.into(),
            layer: layer.map(Arc::new),
            parent,
            sessions: DashMap::new(),
            states: DashMap::new(),
        }
    }

    /// Declared type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owners of the layers this dispatcher runs, root first
    pub fn layer_owners(&self) -> Vec<String> {
        let mut owners = self
            .parent
            .as_ref()
            .map(|p| p.layer_owners())
            .unwrap_or_default();
        if let Some(layer) = &self.layer {
            owners.push(layer.owner.clone());
        }
        owners
    }

    pub fn state(&self, target: &Arc<T>) -> ReceiverState {
        self.states
            .get(&target_key(target))
            .map(|r| r.state)
            .unwrap_or_default()
    }

    fn transition(&self, key: usize, next: ReceiverState) {
        if let Some(mut record) = self.states.get_mut(&key) {
            if !record.state.can_transition_to(next) {
                trace!(name = %self.name, from = %record.state, to = %next, "unusual receiver transition");
            }
            record.state = next;
        }
    }

    /// Open a new session for `target`, cancelling any previous one
    ///
    /// Returns the new session and the listeners of the previous one, which
    /// the caller releases before subscribing again.
    pub(crate) fn begin(&self, target: &Arc<T>) -> (Arc<Mutex<Session>>, Vec<Subscription>) {
        let key = target_key(target);
        let previous = self
            .sessions
            .remove(&key)
            .map(|(_, old)| old.lock().cancel())
            .unwrap_or_default();
        let session = Arc::new(Mutex::new(Session::default()));
        self.sessions.insert(key, session.clone());
        self.states.retain(|_, r| r.target.strong_count() > 0);
        self.states.entry(key).or_insert_with(|| StateRecord {
            target: Arc::downgrade(target),
            state: ReceiverState::Idle,
        });
        self.transition(key, ReceiverState::Starting);
        (session, previous)
    }

    /// Run the layers of a session opened with [`Dispatcher::begin`]
    pub(crate) async fn run(
        &self,
        ctx: &Arc<DispatchContext>,
        session: Arc<Mutex<Session>>,
        target: Arc<T>,
    ) {
        let key = target_key(&target);
        let direct: Arc<dyn Target<T>> = Arc::new(Direct(target));
        let result = self.start_layers(ctx, &session, direct).await;

        match result {
            Ok(()) => {
                let guard = session.lock();
                if guard.cancelled {
                    debug!(name = %self.name, "start finished after stop");
                } else {
                    self.transition(key, ReceiverState::Receiving);
                    debug!(name = %self.name, layers = ?self.layer_owners(), "receiving");
                }
            }
            Err(e) => {
                warn!(name = %self.name, error = %e, "start failed, receiving nothing");
                let current = self
                    .sessions
                    .remove_if(&key, |_, s| Arc::ptr_eq(s, &session))
                    .is_some();
                let partial = session.lock().cancel();
                release(ctx.source.as_ref(), partial).await;
                if current {
                    self.transition(key, ReceiverState::Stopped);
                }
            }
        }
    }

    /// Cancel the session for `target`
    ///
    /// Returns the listeners to release, or `None` when nothing was started.
    pub(crate) fn stop(&self, target: &Arc<T>) -> Option<Vec<Subscription>> {
        let key = target_key(target);
        let (_, session) = self.sessions.remove(&key)?;
        let mut guard = session.lock();
        let subscriptions = guard.cancel();
        self.transition(key, ReceiverState::Stopped);
        drop(guard);
        debug!(name = %self.name, listeners = subscriptions.len(), "stopped");
        Some(subscriptions)
    }

    pub(crate) async fn start_layers(
        &self,
        ctx: &Arc<DispatchContext>,
        session: &Arc<Mutex<Session>>,
        target: Arc<dyn Target<T>>,
    ) -> CourierResult<()> {
        if let Some(parent) = &self.parent {
            parent.start_layers(ctx, session, target.clone()).await?;
        }
        if session.lock().cancelled {
            return Ok(());
        }
        if let Some(layer) = &self.layer {
            layer.start(ctx, session, &target).await?;
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name().to_string()))
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
