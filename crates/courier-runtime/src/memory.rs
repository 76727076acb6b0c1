//! In-process event source

use crate::source::{
    DataChange, DataChannel, DataEvent, DataItem, DataListener, ListenerId, MessageChannel,
    MessageEvent, MessageListener, NodeChannel, NodeEvent, NodeListener, SourceError,
    SourceResult,
};
use async_trait::async_trait;
use courier_core::Node;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

struct Listeners<L> {
    entries: RwLock<Vec<(ListenerId, L)>>,
}

impl<L: Clone> Listeners<L> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    fn add(&self, id: ListenerId, listener: L) {
        self.entries.write().push((id, listener));
    }

    fn remove(&self, id: ListenerId) -> SourceResult<()> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        if entries.len() == before {
            return Err(SourceError::UnknownListener(id));
        }
        Ok(())
    }

    /// Snapshot so listeners run without the lock held
    fn snapshot(&self) -> Vec<L> {
        self.entries.read().iter().map(|(_, l)| l.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Counts of live listeners per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerCounts {
    pub message: usize,
    pub data: usize,
    pub node: usize,
}

impl ListenerCounts {
    pub fn total(&self) -> usize {
        self.message + self.data + self.node
    }
}

/// A message recorded by [`MemoryEventSource::send_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub path: String,
    pub destination: Option<String>,
    pub data: Vec<u8>,
}

/// Event source living entirely in memory
///
/// Peers, data items and incoming messages are driven by the test or host
/// through the inherent methods. Messages sent to the local node loop back
/// to its own listeners; everything sent is also recorded.
pub struct MemoryEventSource {
    local: Node,
    available: AtomicBool,
    next_id: AtomicU64,
    subscribe_delay: Mutex<Option<Duration>>,
    messages: Listeners<MessageListener>,
    data: Listeners<DataListener>,
    nodes: Listeners<NodeListener>,
    items: RwLock<Vec<DataItem>>,
    peers: RwLock<Vec<Node>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MemoryEventSource {
    pub fn new(local: Node) -> Self {
        Self {
            local,
            available: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            subscribe_delay: Mutex::new(None),
            messages: Listeners::new(),
            data: Listeners::new(),
            nodes: Listeners::new(),
            items: RwLock::new(Vec::new()),
            peers: RwLock::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make every operation fail with [`SourceError::Unavailable`]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay every listener registration, to hold a start in flight
    pub fn set_subscribe_delay(&self, delay: Option<Duration>) {
        *self.subscribe_delay.lock() = delay;
    }

    pub fn listener_counts(&self) -> ListenerCounts {
        ListenerCounts {
            message: self.messages.len(),
            data: self.data.len(),
            node: self.nodes.len(),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Connect a peer and notify node listeners
    pub fn connect_peer(&self, node: Node) {
        {
            let mut peers = self.peers.write();
            if peers.iter().any(|p| p.id == node.id) {
                return;
            }
            peers.push(node.clone());
        }
        self.emit_node(NodeEvent::PeerConnected(node));
    }

    /// Disconnect a peer and notify node listeners
    pub fn disconnect_peer(&self, id: &str) {
        let removed = {
            let mut peers = self.peers.write();
            let index = peers.iter().position(|p| p.id == id);
            index.map(|i| peers.remove(i))
        };
        if let Some(node) = removed {
            self.emit_node(NodeEvent::PeerDisconnected(node));
        }
    }

    /// Deliver a message as if sent by `source_node`
    pub fn receive_message(&self, path: &str, data: &[u8], source_node: &str) {
        let event = MessageEvent {
            path: path.to_string(),
            data: data.to_vec(),
            source_node: source_node.to_string(),
        };
        trace!(path, source_node, "memory source message");
        for listener in self.messages.snapshot() {
            listener(&event);
        }
    }

    /// Store a data item as if published by `source_node`
    pub fn receive_data(&self, path: &str, data: &[u8], source_node: &str) {
        let item = DataItem {
            path: path.to_string(),
            data: data.to_vec(),
            source_node: source_node.to_string(),
        };
        {
            let mut items = self.items.write();
            items.retain(|i| !(i.path == item.path && i.source_node == item.source_node));
            items.push(item.clone());
        }
        self.emit_data(DataEvent {
            item,
            change: DataChange::Changed,
        });
    }

    fn check(&self) -> SourceResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SourceError::Unavailable(format!(
                "memory source for {} is offline",
                self.local.id
            )))
        }
    }

    async fn register(&self) -> SourceResult<ListenerId> {
        let delay = *self.subscribe_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        Ok(ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn emit_node(&self, event: NodeEvent) {
        for listener in self.nodes.snapshot() {
            listener(&event);
        }
    }

    fn emit_data(&self, event: DataEvent) {
        for listener in self.data.snapshot() {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for MemoryEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventSource")
            .field("local", &self.local)
            .field("available", &self.available.load(Ordering::SeqCst))
            .field("listeners", &self.listener_counts())
            .field("peers", &self.peers.read().len())
            .field("items", &self.items.read().len())
            .finish()
    }
}

#[async_trait]
impl MessageChannel for MemoryEventSource {
    async fn add_message_listener(&self, listener: MessageListener) -> SourceResult<ListenerId> {
        let id = self.register().await?;
        self.messages.add(id, listener);
        Ok(id)
    }

    async fn remove_message_listener(&self, id: ListenerId) -> SourceResult<()> {
        self.check()?;
        self.messages.remove(id)
    }

    async fn send_message(
        &self,
        path: &str,
        destination: Option<&str>,
        data: &[u8],
    ) -> SourceResult<()> {
        self.check()?;
        self.sent.lock().push(SentMessage {
            path: path.to_string(),
            destination: destination.map(str::to_string),
            data: data.to_vec(),
        });
        if destination == Some(self.local.id.as_str()) {
            self.receive_message(path, data, &self.local.id);
        }
        Ok(())
    }
}

#[async_trait]
impl DataChannel for MemoryEventSource {
    async fn add_data_listener(&self, listener: DataListener) -> SourceResult<ListenerId> {
        let id = self.register().await?;
        self.data.add(id, listener);
        Ok(id)
    }

    async fn remove_data_listener(&self, id: ListenerId) -> SourceResult<()> {
        self.check()?;
        self.data.remove(id)
    }

    async fn put_data(&self, path: &str, data: &[u8]) -> SourceResult<()> {
        self.check()?;
        self.receive_data(path, data, &self.local.id);
        Ok(())
    }

    async fn delete_data(&self, path: &str, source_node: Option<&str>) -> SourceResult<()> {
        self.check()?;
        let removed: Vec<DataItem> = {
            let mut items = self.items.write();
            let (removed, kept): (Vec<DataItem>, Vec<DataItem>) =
                items.drain(..).partition(|i| {
                    i.path == path && source_node.is_none_or(|s| i.source_node == s)
                });
            *items = kept;
            removed
        };
        for item in removed {
            self.emit_data(DataEvent {
                item,
                change: DataChange::Deleted,
            });
        }
        Ok(())
    }

    async fn data_items(&self) -> SourceResult<Vec<DataItem>> {
        self.check()?;
        Ok(self.items.read().clone())
    }
}

#[async_trait]
impl NodeChannel for MemoryEventSource {
    async fn add_node_listener(&self, listener: NodeListener) -> SourceResult<ListenerId> {
        let id = self.register().await?;
        self.nodes.add(id, listener);
        Ok(id)
    }

    async fn remove_node_listener(&self, id: ListenerId) -> SourceResult<()> {
        self.check()?;
        self.nodes.remove(id)
    }

    async fn local_node(&self) -> SourceResult<Node> {
        self.check()?;
        Ok(self.local.clone())
    }

    async fn connected_nodes(&self) -> SourceResult<Vec<Node>> {
        self.check()?;
        Ok(self.peers.read().clone())
    }
}
