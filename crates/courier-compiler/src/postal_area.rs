//! Per-type routing tables

use crate::{Binding, Category, Recipient};
use serde::Serialize;

/// Recipients sharing one path within one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    pub is_data: bool,
    recipients: Vec<Recipient>,
}

impl Route {
    pub fn new(path: impl Into<String>, is_data: bool) -> Self {
        Self {
            path: path.into(),
            is_data,
            recipients: Vec::new(),
        }
    }

    /// Add a recipient unless the same member is already on the route
    pub fn add(&mut self, recipient: Recipient) -> bool {
        add_unique(&mut self.recipients, recipient)
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Distinct payload types, in first-seen order
    pub fn payload_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for recipient in &self.recipients {
            if !types.contains(&recipient.payload_type.as_str()) {
                types.push(&recipient.payload_type);
            }
        }
        types
    }

    pub fn category(&self) -> Category {
        if self.is_data {
            Category::Data
        } else {
            Category::Message
        }
    }
}

fn add_unique(set: &mut Vec<Recipient>, recipient: Recipient) -> bool {
    if set.iter().any(|existing| existing.same_member(&recipient)) {
        return false;
    }
    set.push(recipient);
    true
}

/// Everything one owner type receives
///
/// Data and message routes are separate namespaces: the same path may be
/// bound in both without the routes interacting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalArea {
    pub owner: String,
    /// Nearest ancestor that also owns a postal area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    data_routes: Vec<Route>,
    message_routes: Vec<Route>,
    local_node: Vec<Recipient>,
    remote_nodes: Vec<Recipient>,
}

impl PostalArea {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            parent: None,
            data_routes: Vec::new(),
            message_routes: Vec::new(),
            local_node: Vec::new(),
            remote_nodes: Vec::new(),
        }
    }

    /// Get or create the route for a path
    pub fn route_mut(&mut self, path: &str, is_data: bool) -> &mut Route {
        let routes = if is_data {
            &mut self.data_routes
        } else {
            &mut self.message_routes
        };
        let index = match routes.iter().position(|r| r.path == path) {
            Some(index) => index,
            None => {
                routes.push(Route::new(path, is_data));
                routes.len() - 1
            }
        };
        &mut routes[index]
    }

    pub fn route(&self, path: &str, is_data: bool) -> Option<&Route> {
        let routes = if is_data {
            &self.data_routes
        } else {
            &self.message_routes
        };
        routes.iter().find(|r| r.path == path)
    }

    /// File a validated binding into the matching table
    pub fn add(&mut self, binding: Binding) {
        match (binding.category, binding.path) {
            (Category::LocalNode, _) => {
                add_unique(&mut self.local_node, binding.recipient);
            }
            (Category::RemoteNodes, _) => {
                add_unique(&mut self.remote_nodes, binding.recipient);
            }
            (category, path) => {
                let path = path.unwrap_or_default();
                self.route_mut(&path, category == Category::Data)
                    .add(binding.recipient);
            }
        }
    }

    pub fn data_routes(&self) -> &[Route] {
        &self.data_routes
    }

    pub fn message_routes(&self) -> &[Route] {
        &self.message_routes
    }

    pub fn local_node_recipients(&self) -> &[Recipient] {
        &self.local_node
    }

    pub fn remote_node_recipients(&self) -> &[Recipient] {
        &self.remote_nodes
    }

    /// A connectivity listener is needed for remote nodes and data replay
    pub fn needs_node_listener(&self) -> bool {
        !self.remote_nodes.is_empty() || !self.data_routes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.data_routes.is_empty()
            && self.message_routes.is_empty()
            && self.local_node.is_empty()
            && self.remote_nodes.is_empty()
    }

    /// All recipients with the category they are delivered for
    pub fn recipients(&self) -> impl Iterator<Item = (Category, &Recipient)> {
        let local = self.local_node.iter().map(|r| (Category::LocalNode, r));
        let remote = self.remote_nodes.iter().map(|r| (Category::RemoteNodes, r));
        let routed = self
            .data_routes
            .iter()
            .chain(self.message_routes.iter())
            .flat_map(|route| route.recipients.iter().map(move |r| (route.category(), r)));
        local.chain(remote).chain(routed)
    }
}
