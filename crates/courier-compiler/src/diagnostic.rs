//! Problems found while compiling declarations

use courier_core::CourierError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A binding annotation on a malformed member
    InvalidBinding,
    /// A deliverable field whose type has no wire mapping
    UnsupportedFieldType,
    /// A supertype chain that loops back on itself
    InheritanceCycle,
}

/// One problem attached to a declared member
///
/// Diagnostics never stop compilation: the offending binding or field is
/// skipped and everything else is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub owner: String,
    pub member: String,
    pub message: String,
    /// Offending type, for unsupported fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

impl Diagnostic {
    pub fn invalid_binding(
        owner: impl Into<String>,
        member: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::InvalidBinding,
            owner: owner.into(),
            member: member.into(),
            message: message.into(),
            ty: None,
        }
    }

    pub fn unsupported_field(
        owner: impl Into<String>,
        field: impl Into<String>,
        ty: &str,
    ) -> Self {
        Self {
            kind: DiagnosticKind::UnsupportedFieldType,
            owner: owner.into(),
            member: field.into(),
            message: format!("Field type not supported ({ty})."),
            ty: Some(ty.to_string()),
        }
    }

    pub fn inheritance_cycle(owner: impl Into<String>, chain: &[String]) -> Self {
        Self {
            kind: DiagnosticKind::InheritanceCycle,
            owner: owner.into(),
            member: chain.last().cloned().unwrap_or_default(),
            message: format!("Supertype chain is cyclic: {}", chain.join(" -> ")),
            ty: None,
        }
    }

    pub fn to_error(&self) -> CourierError {
        match self.kind {
            DiagnosticKind::UnsupportedFieldType => CourierError::UnsupportedFieldType {
                owner: self.owner.clone(),
                field: self.member.clone(),
                ty: self.ty.clone().unwrap_or_default(),
            },
            DiagnosticKind::InvalidBinding | DiagnosticKind::InheritanceCycle => {
                CourierError::InvalidBinding {
                    owner: self.owner.clone(),
                    member: self.member.clone(),
                    message: self.message.clone(),
                }
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.member, self.message)
    }
}

impl From<Diagnostic> for CourierError {
    fn from(diagnostic: Diagnostic) -> Self {
        diagnostic.to_error()
    }
}
