//! Peer identity

use serde::{Deserialize, Serialize};

/// A device reachable through the event source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Opaque identifier used to address the node
    pub id: String,
    /// Human readable name
    #[serde(default)]
    pub display_name: String,
}

impl Node {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.display_name, self.id)
        }
    }
}
