//! Declaration input model.
//!
//! Declarations describe the members of receiving types and the binding
//! annotations placed on them. They are plain data: the compiler never looks
//! at Rust source, so the same declarations can be written by hand in TOML or
//! JSON, or built in code with the constructors below.
//!
//! # TOML form
//!
//! ```toml
//! [[types]]
//! name = "MainActivity"
//! supertype = "BaseActivity"
//!
//! [[types.fields]]
//! name = "value"
//! ty = "i32"
//! annotations = [{ receive_data = "/value" }]
//!
//! [[types.methods]]
//! name = "on_new_value"
//! params = ["i32"]
//! annotations = [{ receive_data = "/value" }]
//! ```

use courier_core::CourierResult;
use serde::{Deserialize, Serialize};

/// Type name of a node identity
pub const NODE_TYPE: &str = "Node";

/// Type name of a list of remote nodes
pub const NODE_LIST_TYPE: &str = "Vec<Node>";

/// Accepted types for the trailing node-id parameter
pub const NODE_ID_TYPES: [&str; 2] = ["String", "&str"];

/// A set of type declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl Declarations {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self { types }
    }

    pub fn from_toml(source: &str) -> CourierResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> CourierResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// A declared type with its members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,

    /// Direct supertype, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,

    /// Whether the type has a structured data map encoding
    #[serde(default)]
    pub deliverable: bool,

    #[serde(default)]
    pub fields: Vec<FieldDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn deliverable(mut self) -> Self {
        self.deliverable = true;
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// Member visibility and mutability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub private: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

impl Modifiers {
    pub fn is_default(&self) -> bool {
        *self == Modifiers::default()
    }
}

/// A binding annotation on a field or method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// Receive data items published on a path
    ReceiveData(String),
    /// Receive messages sent to a path
    ReceiveMessages(String),
    /// Receive the identity of the local node
    LocalNode,
    /// Receive the list of connected remote nodes
    RemoteNodes,
    /// Deliver on the background thread instead of the main thread
    BackgroundThread,
}

impl Annotation {
    /// Whether this annotation selects an event category
    pub fn is_category(&self) -> bool {
        !matches!(self, Annotation::BackgroundThread)
    }
}

/// A declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
    #[serde(default, skip_serializing_if = "Modifiers::is_default")]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn private(mut self) -> Self {
        self.modifiers.private = true;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Modifiers::is_default")]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MethodDecl {
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[cfg(test)]
#[path = "decl/decl_tests.rs"]
mod decl_tests;
