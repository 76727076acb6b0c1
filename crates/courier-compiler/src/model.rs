//! Binding model: postal areas for every type that receives

use crate::binding::{bind_field, bind_method};
use crate::decl::Declarations;
use crate::{Diagnostic, InheritanceResolver, PostalArea};
use tracing::debug;

/// Validated, immutable routing model for a set of declarations
#[derive(Debug, Clone, Default)]
pub struct BindingModel {
    areas: Vec<PostalArea>,
    resolver: InheritanceResolver,
}

impl BindingModel {
    /// Build postal areas, linking each to its nearest bound ancestor
    ///
    /// Recipients are filed in declaration order: fields first, then
    /// methods, each annotation in the order written.
    pub fn build(decls: &Declarations) -> (Self, Vec<Diagnostic>) {
        let resolver = InheritanceResolver::new(decls);
        let mut diagnostics: Vec<Diagnostic> = resolver.cycles().to_vec();
        let mut areas: Vec<PostalArea> = Vec::new();

        for decl in &decls.types {
            let members = decl
                .fields
                .iter()
                .map(|f| bind_field(&decl.name, f))
                .chain(decl.methods.iter().map(|m| bind_method(&decl.name, m)));

            for member in members {
                diagnostics.extend(member.diagnostics);
                for binding in member.bindings {
                    let index = match areas.iter().position(|a| a.owner == decl.name) {
                        Some(index) => index,
                        None => {
                            areas.push(PostalArea::new(&decl.name));
                            areas.len() - 1
                        }
                    };
                    areas[index].add(binding);
                }
            }
        }

        let owners: Vec<String> = areas.iter().map(|a| a.owner.clone()).collect();
        for area in &mut areas {
            area.parent = resolver
                .nearest(&area.owner, |ty| owners.iter().any(|o| o == ty))
                .map(str::to_string);
            debug!(
                owner = %area.owner,
                parent = ?area.parent,
                data_routes = area.data_routes().len(),
                message_routes = area.message_routes().len(),
                "built postal area"
            );
        }

        (Self { areas, resolver }, diagnostics)
    }

    pub fn areas(&self) -> &[PostalArea] {
        &self.areas
    }

    /// The postal area owned by a type
    pub fn area(&self, name: &str) -> Option<&PostalArea> {
        self.areas.iter().find(|a| a.owner == name)
    }

    /// The postal area responsible for a type
    ///
    /// A type without bindings of its own is served by its nearest bound
    /// ancestor. `None` means there is nothing to dispatch.
    pub fn dispatch_area_for(&self, name: &str) -> Option<&PostalArea> {
        self.area(name).or_else(|| {
            self.resolver
                .nearest(name, |ty| self.area(ty).is_some())
                .and_then(|ty| self.area(ty))
        })
    }

    /// Postal areas a dispatcher for `name` composes, root first
    pub fn chain(&self, name: &str) -> Vec<&PostalArea> {
        let mut chain = Vec::new();
        let mut current = self.dispatch_area_for(name);
        while let Some(area) = current {
            if chain.iter().any(|a: &&PostalArea| a.owner == area.owner) {
                break;
            }
            chain.push(area);
            current = area.parent.as_deref().and_then(|p| self.area(p));
        }
        chain.reverse();
        chain
    }

    pub fn resolver(&self) -> &InheritanceResolver {
        &self.resolver
    }
}

#[cfg(test)]
#[path = "model/model_tests.rs"]
mod model_tests;
