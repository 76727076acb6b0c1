//! Supertype chains over declared types

use crate::Diagnostic;
use crate::decl::Declarations;
use std::collections::HashMap;
use tracing::warn;

/// Walks declared supertype chains
///
/// Types that are not declared end a chain. A chain that loops back on
/// itself is cut at the edge that closes the loop and reported once.
#[derive(Debug, Clone, Default)]
pub struct InheritanceResolver {
    supertypes: HashMap<String, Option<String>>,
    cycles: Vec<Diagnostic>,
}

impl InheritanceResolver {
    pub fn new(decls: &Declarations) -> Self {
        let mut supertypes: HashMap<String, Option<String>> = decls
            .types
            .iter()
            .map(|t| (t.name.clone(), t.supertype.clone()))
            .collect();
        let mut cycles = Vec::new();

        for decl in &decls.types {
            let mut chain = vec![decl.name.clone()];
            while let Some(current) = chain.last().cloned() {
                let Some(Some(next)) = supertypes.get(&current).cloned() else {
                    break;
                };
                let closes_loop = chain.contains(&next);
                chain.push(next);
                if closes_loop {
                    let diagnostic = Diagnostic::inheritance_cycle(&current, &chain);
                    warn!(owner = %current, "{}", diagnostic.message);
                    cycles.push(diagnostic);
                    supertypes.insert(current, None);
                    break;
                }
            }
        }

        Self { supertypes, cycles }
    }

    /// Direct supertype of a declared type
    pub fn supertype(&self, name: &str) -> Option<&str> {
        self.supertypes.get(name).and_then(|s| s.as_deref())
    }

    /// Ancestors nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self.supertype(name);
        while let Some(ty) = current {
            if ty == name || out.contains(&ty) {
                break;
            }
            out.push(ty);
            current = self.supertype(ty);
        }
        out
    }

    /// Nearest ancestor accepted by `pred`
    pub fn nearest<'a>(&'a self, name: &str, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
        self.ancestors(name).into_iter().find(|ty| pred(ty))
    }

    /// Cycles found in the declarations
    pub fn cycles(&self) -> &[Diagnostic] {
        &self.cycles
    }
}
