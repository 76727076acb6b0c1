//! Binding validation.
//!
//! Each category annotation on a member yields one [`Binding`] after the
//! member passes the checks for that category. Problems are returned as
//! diagnostics alongside whatever bindings were valid.

use crate::decl::{Annotation, FieldDecl, MethodDecl, NODE_ID_TYPES, NODE_LIST_TYPE, NODE_TYPE};
use crate::{Affinity, Category, Diagnostic, Recipient};
use courier_codec::normalize_type_name;
use serde::Serialize;

/// A validated request to deliver one category of events to a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub owner: String,
    pub category: Category,
    /// Route path, for data and message bindings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub recipient: Recipient,
}

/// Bindings and diagnostics produced for one member
#[derive(Debug, Default)]
pub struct MemberBindings {
    pub bindings: Vec<Binding>,
    pub diagnostics: Vec<Diagnostic>,
}

fn category_of(annotation: &Annotation) -> Option<(Category, Option<&str>)> {
    match annotation {
        Annotation::ReceiveData(path) => Some((Category::Data, Some(path.as_str()))),
        Annotation::ReceiveMessages(path) => Some((Category::Message, Some(path.as_str()))),
        Annotation::LocalNode => Some((Category::LocalNode, None)),
        Annotation::RemoteNodes => Some((Category::RemoteNodes, None)),
        Annotation::BackgroundThread => None,
    }
}

fn type_is(ty: &str, expected: &str) -> bool {
    normalize_type_name(ty) == expected
}

fn is_node_id(ty: &str) -> bool {
    let ty = normalize_type_name(ty);
    NODE_ID_TYPES.contains(&ty.as_str())
}

/// Check that a background marker accompanies a category annotation
fn check_background_marker(
    owner: &str,
    member: &str,
    annotations: &[Annotation],
) -> Option<Diagnostic> {
    let marked = annotations.contains(&Annotation::BackgroundThread);
    let categorized = annotations.iter().any(Annotation::is_category);
    (marked && !categorized).then(|| {
        Diagnostic::invalid_binding(
            owner,
            member,
            "BackgroundThread must be used with ReceiveData, ReceiveMessages, RemoteNodes, or LocalNode",
        )
    })
}

/// Validate the binding annotations on a field
pub fn bind_field(owner: &str, field: &FieldDecl) -> MemberBindings {
    let mut out = MemberBindings::default();
    out.diagnostics
        .extend(check_background_marker(owner, &field.name, &field.annotations));

    for (category, path) in field.annotations.iter().filter_map(category_of) {
        let modifiers = field.modifiers;
        let problem = if modifiers.private || modifiers.is_static || modifiers.is_final {
            Some("Annotated fields must not be private, static, nor final".to_string())
        } else if category == Category::LocalNode && !type_is(&field.ty, NODE_TYPE) {
            Some(format!("LocalNode annotated field must be a {NODE_TYPE}"))
        } else if category == Category::RemoteNodes && !type_is(&field.ty, NODE_LIST_TYPE) {
            Some(format!("RemoteNodes annotated field must be a {NODE_LIST_TYPE}"))
        } else {
            None
        };

        match problem {
            Some(message) => out
                .diagnostics
                .push(Diagnostic::invalid_binding(owner, &field.name, message)),
            None => out.bindings.push(Binding {
                owner: owner.to_string(),
                category,
                path: path.map(str::to_string),
                recipient: Recipient::field(&field.name, normalize_type_name(&field.ty)),
            }),
        }
    }
    out
}

/// Validate the binding annotations on a method
pub fn bind_method(owner: &str, method: &MethodDecl) -> MemberBindings {
    let mut out = MemberBindings::default();
    out.diagnostics
        .extend(check_background_marker(owner, &method.name, &method.annotations));

    let affinity = if method.annotations.contains(&Annotation::BackgroundThread) {
        Affinity::Background
    } else {
        Affinity::Main
    };
    let params = &method.params;

    for (category, path) in method.annotations.iter().filter_map(category_of) {
        let problem = if method.modifiers.private || method.modifiers.is_static {
            Some("Annotated methods must not be private or static".to_string())
        } else {
            match category {
                Category::Data | Category::Message => {
                    if params.is_empty() || params.len() > 2 {
                        Some("Incorrect number of parameters for method.".to_string())
                    } else if params.len() == 2 && !is_node_id(&params[1]) {
                        Some(
                            "The second parameter must be a String (represents the source node ID)"
                                .to_string(),
                        )
                    } else {
                        None
                    }
                }
                Category::LocalNode => {
                    if params.len() != 1 {
                        Some("Incorrect number of parameters for method.".to_string())
                    } else if !type_is(&params[0], NODE_TYPE) {
                        Some(format!(
                            "LocalNode annotated method must have a parameter that is a {NODE_TYPE}"
                        ))
                    } else {
                        None
                    }
                }
                Category::RemoteNodes => {
                    if params.len() != 1 {
                        Some("Incorrect number of parameters for method.".to_string())
                    } else if !type_is(&params[0], NODE_LIST_TYPE) {
                        Some(format!(
                            "RemoteNodes annotated method must have a parameter that is a {NODE_LIST_TYPE}"
                        ))
                    } else {
                        None
                    }
                }
            }
        };

        match problem {
            Some(message) => out
                .diagnostics
                .push(Diagnostic::invalid_binding(owner, &method.name, message)),
            None => out.bindings.push(Binding {
                owner: owner.to_string(),
                category,
                path: path.map(str::to_string),
                recipient: Recipient::method(
                    &method.name,
                    normalize_type_name(&params[0]),
                    category.has_path() && params.len() == 2,
                    affinity,
                ),
            }),
        }
    }
    out
}

#[cfg(test)]
#[path = "binding/binding_tests.rs"]
mod binding_tests;
