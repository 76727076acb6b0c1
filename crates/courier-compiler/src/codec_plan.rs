//! Field-by-field codec plans for deliverable types

use crate::decl::Declarations;
use crate::{Diagnostic, InheritanceResolver};
use courier_codec::{WireType, normalize_type_name};
use serde::Serialize;
use tracing::debug;

/// Type name of binary asset fields
pub const BLOB_TYPE: &str = "Blob";

/// How one field is carried in a data map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Stored directly as a wire value
    Primitive(#[serde(serialize_with = "serialize_wire")] WireType),
    /// A packable type, stored as a nested map
    Nested(String),
    /// A list of a packable type, stored as a list of maps
    NestedList(String),
    /// Compressed into the asset store and stored by reference
    Asset,
    Unsupported,
}

fn serialize_wire<S: serde::Serializer>(wire: &WireType, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(wire.accessor())
}

/// Classify a declared field type
///
/// `is_packable` decides whether a non-primitive type name has its own
/// structured codec.
pub fn classify(ty: &str, is_packable: impl Fn(&str) -> bool) -> FieldClass {
    let ty = normalize_type_name(ty);
    if let Some(wire) = WireType::for_rust_type(&ty) {
        return FieldClass::Primitive(wire);
    }
    if ty == BLOB_TYPE || ty.ends_with("::Blob") {
        return FieldClass::Asset;
    }
    if let Some(inner) = ty.strip_prefix("Vec<").and_then(|rest| rest.strip_suffix('>')) {
        return if is_packable(inner) {
            FieldClass::NestedList(inner.to_string())
        } else {
            FieldClass::Unsupported
        };
    }
    if is_packable(&ty) {
        return FieldClass::Nested(ty);
    }
    FieldClass::Unsupported
}

/// A field carried by a codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub declared_type: String,
    pub class: FieldClass,
}

/// Codec plan for one deliverable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCodecPlan {
    pub name: String,
    /// Nearest deliverable ancestor, packed first into the same map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl TypeCodecPlan {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Plan codecs for every deliverable type
///
/// Private, static and final fields are not carried. A field whose type
/// cannot be classified is reported and left out; its siblings are kept.
pub fn plan_codecs(
    decls: &Declarations,
    resolver: &InheritanceResolver,
) -> (Vec<TypeCodecPlan>, Vec<Diagnostic>) {
    let deliverable: Vec<&str> = decls
        .types
        .iter()
        .filter(|t| t.deliverable)
        .map(|t| t.name.as_str())
        .collect();
    let is_packable = |ty: &str| deliverable.contains(&ty);

    let mut plans = Vec::new();
    let mut diagnostics = Vec::new();

    for decl in decls.types.iter().filter(|t| t.deliverable) {
        let mut fields = Vec::new();
        for field in &decl.fields {
            let m = field.modifiers;
            if m.private || m.is_static || m.is_final {
                continue;
            }
            match classify(&field.ty, is_packable) {
                FieldClass::Unsupported => {
                    diagnostics.push(Diagnostic::unsupported_field(
                        &decl.name,
                        &field.name,
                        &field.ty,
                    ));
                }
                class => fields.push(FieldSpec {
                    name: field.name.clone(),
                    declared_type: normalize_type_name(&field.ty),
                    class,
                }),
            }
        }

        let parent = resolver.nearest(&decl.name, is_packable).map(str::to_string);
        debug!(name = %decl.name, parent = ?parent, fields = fields.len(), "planned codec");
        plans.push(TypeCodecPlan {
            name: decl.name.clone(),
            parent,
            fields,
        });
    }

    (plans, diagnostics)
}
