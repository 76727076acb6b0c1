//! Event-source collaborator interfaces
//!
//! The dispatcher never talks to a transport directly. It subscribes through
//! these traits, which a transport binding (or [`crate::MemoryEventSource`])
//! implements. Listeners are invoked on whatever thread the source delivers
//! on.

use async_trait::async_trait;
use courier_core::{CourierError, Node};
use std::sync::Arc;
use thiserror::Error;

/// Handle returned when a listener is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A message sent to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub path: String,
    pub data: Vec<u8>,
    /// Id of the node that sent the message
    pub source_node: String,
}

/// A data item stored under a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    pub path: String,
    pub data: Vec<u8>,
    /// Id of the node that published the item
    pub source_node: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChange {
    Changed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    pub item: DataItem,
    pub change: DataChange,
}

/// Connectivity change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    PeerConnected(Node),
    PeerDisconnected(Node),
}

pub type MessageListener = Arc<dyn Fn(&MessageEvent) + Send + Sync>;
pub type DataListener = Arc<dyn Fn(&DataEvent) + Send + Sync>;
pub type NodeListener = Arc<dyn Fn(&NodeEvent) + Send + Sync>;

/// Error type for event-source operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    #[error("unknown listener {0}")]
    UnknownListener(ListenerId),
}

impl From<SourceError> for CourierError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(_) => CourierError::SourceUnavailable(err.to_string()),
            SourceError::UnknownListener(_) => CourierError::Registry(err.to_string()),
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn add_message_listener(&self, listener: MessageListener) -> SourceResult<ListenerId>;

    async fn remove_message_listener(&self, id: ListenerId) -> SourceResult<()>;

    /// Send to one node, or to every connected node when `destination` is `None`
    async fn send_message(
        &self,
        path: &str,
        destination: Option<&str>,
        data: &[u8],
    ) -> SourceResult<()>;
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    async fn add_data_listener(&self, listener: DataListener) -> SourceResult<ListenerId>;

    async fn remove_data_listener(&self, id: ListenerId) -> SourceResult<()>;

    /// Publish an item from the local node
    async fn put_data(&self, path: &str, data: &[u8]) -> SourceResult<()>;

    /// Delete items under a path, limited to one publisher when `source_node` is given
    async fn delete_data(&self, path: &str, source_node: Option<&str>) -> SourceResult<()>;

    /// Every item currently known to the source
    async fn data_items(&self) -> SourceResult<Vec<DataItem>>;
}

#[async_trait]
pub trait NodeChannel: Send + Sync {
    async fn add_node_listener(&self, listener: NodeListener) -> SourceResult<ListenerId>;

    async fn remove_node_listener(&self, id: ListenerId) -> SourceResult<()>;

    async fn local_node(&self) -> SourceResult<Node>;

    async fn connected_nodes(&self) -> SourceResult<Vec<Node>>;
}

/// A source providing messages, data and connectivity
pub trait EventSource: MessageChannel + DataChannel + NodeChannel {}

impl<S: MessageChannel + DataChannel + NodeChannel> EventSource for S {}
