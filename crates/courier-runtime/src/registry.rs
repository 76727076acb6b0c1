//! Dispatcher registry keyed by Rust target type

use crate::dispatcher::{Dispatcher, Layer, Link, ParentLink};
use crate::recipients::RecipientTable;
use courier_compiler::BindingModel;
use courier_core::{CourierError, CourierResult};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

type ErasedDispatcher = Arc<dyn Any + Send + Sync>;

/// Immutable map from Rust target types to their dispatchers
///
/// Built once from a [`BindingModel`]; a type with nothing to dispatch has
/// no entry, and starting it fails with `MissingDispatcher`.
#[derive(Default)]
pub struct DispatchRegistry {
    dispatchers: HashMap<TypeId, ErasedDispatcher>,
    names: HashMap<TypeId, String>,
}

impl DispatchRegistry {
    pub fn builder(model: &BindingModel) -> RegistryBuilder {
        RegistryBuilder {
            model: model.clone(),
            registry: DispatchRegistry::default(),
        }
    }

    /// Dispatcher registered for `T`
    pub fn dispatcher<T: Send + Sync + 'static>(&self) -> Option<Arc<Dispatcher<T>>> {
        self.dispatchers
            .get(&TypeId::of::<T>())?
            .clone()
            .downcast::<Dispatcher<T>>()
            .ok()
    }

    /// Declared name bound to `T`
    pub fn name_of<T: 'static>(&self) -> Option<&str> {
        self.names.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// Declared names with a dispatcher, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .names
            .iter()
            .filter(|(id, _)| self.dispatchers.contains_key(*id))
            .map(|(_, n)| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}

impl std::fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("dispatchers", &self.names())
            .finish()
    }
}

/// Binds Rust types to declared names, parents before children
pub struct RegistryBuilder {
    model: BindingModel,
    registry: DispatchRegistry,
}

impl RegistryBuilder {
    /// Bind a type whose declared name has no bound ancestor
    pub fn bind<T: Send + Sync + 'static>(
        self,
        name: &str,
        table: RecipientTable<T>,
    ) -> CourierResult<Self> {
        let Some(parent) = self.expected_parent(name) else {
            return self.insert::<T>(name, table, None);
        };
        Err(CourierError::Registry(format!(
            "{name} receives through {parent}; bind it with derive"
        )))
    }

    /// Bind a type that composes the dispatcher of its parent type
    ///
    /// `P` must already be bound, under the declared name of the nearest
    /// ancestor of `name` that has bindings (or a type served by it).
    /// `project` borrows the parent part of a target.
    pub fn derive<C, P>(
        self,
        name: &str,
        table: RecipientTable<C>,
        project: fn(&C) -> &P,
    ) -> CourierResult<Self>
    where
        C: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        if self.model.dispatch_area_for(name).is_none() {
            debug!(name, "nothing to dispatch, not registered");
            return self.record_name::<C>(name);
        }
        let Some(expected) = self.expected_parent(name) else {
            return Err(CourierError::Registry(format!(
                "{name} has no bound ancestor; bind it with bind"
            )));
        };
        let parent_name = self.registry.name_of::<P>().map(str::to_string);
        let parent = self.registry.dispatcher::<P>();
        let (Some(parent_name), Some(parent)) = (parent_name, parent) else {
            return Err(CourierError::Registry(format!(
                "{name} derives from {}, which is not bound yet",
                type_name::<P>()
            )));
        };
        let served_by = self
            .model
            .dispatch_area_for(&parent_name)
            .map(|a| a.owner.as_str());
        if served_by != Some(expected.as_str()) {
            return Err(CourierError::Registry(format!(
                "{name} receives through {expected}, but {} is bound as {parent_name}",
                type_name::<P>()
            )));
        }

        let link: Arc<dyn ParentLink<C>> = Arc::new(Link { parent, project });
        self.insert::<C>(name, table, Some(link))
    }

    pub fn build(self) -> DispatchRegistry {
        info!(dispatchers = ?self.registry.names(), "dispatch registry built");
        self.registry
    }

    /// Nearest bound ancestor the dispatcher of `name` must compose
    ///
    /// For a type with its own area this is the area's parent; a type served
    /// by an ancestor's area composes that area's owner.
    fn expected_parent(&self, name: &str) -> Option<String> {
        match self.model.area(name) {
            Some(own) => own.parent.clone(),
            None => self.model.dispatch_area_for(name).map(|a| a.owner.clone()),
        }
    }

    fn record_name<T: 'static>(mut self, name: &str) -> CourierResult<Self> {
        let id = TypeId::of::<T>();
        if self.registry.names.contains_key(&id) {
            return Err(CourierError::Registry(format!(
                "{} is already bound",
                type_name::<T>()
            )));
        }
        self.registry.names.insert(id, name.to_string());
        Ok(self)
    }

    fn insert<T: Send + Sync + 'static>(
        self,
        name: &str,
        table: RecipientTable<T>,
        parent: Option<Arc<dyn ParentLink<T>>>,
    ) -> CourierResult<Self> {
        let area = self.model.area(name).cloned();
        if area.is_none() && parent.is_none() {
            debug!(name, "nothing to dispatch, not registered");
            return self.record_name::<T>(name);
        }

        let mut builder = self.record_name::<T>(name)?;
        let layer = area.map(|area| Layer::build(&area, &table));
        let dispatcher = Dispatcher::new(name, layer, parent);
        debug!(name, layers = ?dispatcher.layer_owners(), "dispatcher registered");
        builder
            .registry
            .dispatchers
            .insert(TypeId::of::<T>(), Arc::new(dispatcher));
        Ok(builder)
    }
}

#[cfg(test)]
#[path = "registry/registry_tests.rs"]
mod registry_tests;
