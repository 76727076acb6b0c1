//! Recipients: the members a decoded value is delivered to

use serde::Serialize;

/// How a value reaches the recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// `target.name = value;`
    Field,
    /// `target.name(value);`
    Method,
}

/// Thread a recipient is delivered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affinity {
    /// The serialized foreground executor
    Main,
    /// Whatever thread the event is delivered on
    Background,
}

/// Event category a binding listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Data,
    Message,
    LocalNode,
    RemoteNodes,
}

impl Category {
    pub fn has_path(&self) -> bool {
        matches!(self, Category::Data | Category::Message)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Data => write!(f, "data"),
            Category::Message => write!(f, "message"),
            Category::LocalNode => write!(f, "local node"),
            Category::RemoteNodes => write!(f, "remote nodes"),
        }
    }
}

/// Handler shape a runtime recipient table must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Store the decoded payload into a field
    Assign,
    /// Call a method with the decoded payload
    Invoke,
    /// Call a method with the decoded payload and the source node id
    InvokeWithNode,
    /// Deliver the local node (field or method)
    LocalNode,
    /// Deliver the connected node list (field or method)
    RemoteNodes,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerKind::Assign => write!(f, "assign"),
            HandlerKind::Invoke => write!(f, "invoke"),
            HandlerKind::InvokeWithNode => write!(f, "invoke_with_node"),
            HandlerKind::LocalNode => write!(f, "local_node"),
            HandlerKind::RemoteNodes => write!(f, "remote_nodes"),
        }
    }
}

/// A field or method that receives one category of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub kind: RecipientKind,
    /// Declared type of the delivered value
    pub payload_type: String,
    pub affinity: Affinity,
    /// Whether a trailing node-id argument is passed (methods only)
    pub has_node_param: bool,
}

impl Recipient {
    /// Fields are assigned on the delivering thread
    pub fn field(name: impl Into<String>, payload_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RecipientKind::Field,
            payload_type: payload_type.into(),
            affinity: Affinity::Background,
            has_node_param: false,
        }
    }

    pub fn method(
        name: impl Into<String>,
        payload_type: impl Into<String>,
        has_node_param: bool,
        affinity: Affinity,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RecipientKind::Method,
            payload_type: payload_type.into(),
            affinity,
            has_node_param,
        }
    }

    /// Identity used for route membership
    pub fn same_member(&self, other: &Recipient) -> bool {
        self.name == other.name && self.kind == other.kind && self.payload_type == other.payload_type
    }

    pub fn is_background(&self) -> bool {
        self.affinity == Affinity::Background
    }

    /// The handler shape needed to deliver this recipient for a category
    pub fn handler_kind(&self, category: Category) -> HandlerKind {
        match (category, self.kind) {
            (Category::LocalNode, _) => HandlerKind::LocalNode,
            (Category::RemoteNodes, _) => HandlerKind::RemoteNodes,
            (_, RecipientKind::Field) => HandlerKind::Assign,
            (_, RecipientKind::Method) if self.has_node_param => HandlerKind::InvokeWithNode,
            (_, RecipientKind::Method) => HandlerKind::Invoke,
        }
    }

    /// Render the delivery statement for this recipient
    ///
    /// `node` is only used by methods that take a trailing node id.
    pub fn render(&self, source: &str, node: Option<&str>) -> String {
        match self.kind {
            RecipientKind::Field => format!("target.{} = {};", self.name, source),
            RecipientKind::Method => match node.filter(|_| self.has_node_param) {
                Some(node) => format!("target.{}({}, {});", self.name, source, node),
                None => format!("target.{}({});", self.name, source),
            },
        }
    }
}

#[cfg(test)]
#[path = "recipient/recipient_tests.rs"]
mod recipient_tests;
