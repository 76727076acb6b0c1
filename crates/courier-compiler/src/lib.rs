//! courier-compiler - Binding model, inheritance resolution and codec planning
//!
//! This crate turns parsed [`decl::Declarations`] into:
//! - a [`BindingModel`] of validated [`PostalArea`]s linked to their parents
//! - a [`TypeCodecPlan`] per deliverable type
//! - [`Diagnostic`]s for every member that could not be bound or carried
//!
//! The [`render`] module renders both as readable listings.

mod binding;
mod codec_plan;
pub mod decl;
mod diagnostic;
mod inheritance;
mod model;
mod postal_area;
mod recipient;
pub mod render;

pub use binding::{Binding, MemberBindings, bind_field, bind_method};
pub use codec_plan::{BLOB_TYPE, FieldClass, FieldSpec, TypeCodecPlan, classify, plan_codecs};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use inheritance::InheritanceResolver;
pub use model::BindingModel;
pub use postal_area::{PostalArea, Route};
pub use recipient::{Affinity, Category, HandlerKind, Recipient, RecipientKind};

use courier_core::CourierError;
use tracing::{debug, warn};

/// Everything produced from one set of declarations
#[derive(Debug, Clone)]
pub struct Compilation {
    pub model: BindingModel,
    pub codecs: Vec<TypeCodecPlan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics as errors, in the order they were found
    pub fn errors(&self) -> Vec<CourierError> {
        self.diagnostics.iter().map(Diagnostic::to_error).collect()
    }

    pub fn codec(&self, name: &str) -> Option<&TypeCodecPlan> {
        self.codecs.iter().find(|c| c.name == name)
    }
}

/// Build the binding model and codec plans
///
/// Never fails: invalid bindings and unsupported fields are reported and
/// skipped, everything else is still produced.
pub fn compile(decls: &decl::Declarations) -> Compilation {
    let (model, mut diagnostics) = BindingModel::build(decls);
    let (codecs, codec_diagnostics) = plan_codecs(decls, model.resolver());
    diagnostics.extend(codec_diagnostics);

    for diagnostic in &diagnostics {
        warn!(kind = ?diagnostic.kind, "{diagnostic}");
    }
    debug!(
        areas = model.areas().len(),
        codecs = codecs.len(),
        diagnostics = diagnostics.len(),
        "compiled declarations"
    );

    Compilation {
        model,
        codecs,
        diagnostics,
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::decl::{Annotation, Declarations, FieldDecl, MethodDecl, Modifiers, TypeDecl};
    pub use crate::{
        Affinity, BindingModel, Category, Compilation, Diagnostic, DiagnosticKind, PostalArea,
        Recipient, TypeCodecPlan, compile,
    };
}
