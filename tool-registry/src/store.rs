//! Registry store holding invocables and descriptors keyed by tool name.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::catalog::Catalog;
use crate::declaration::{Invocable, ToolArgs, ToolDeclaration};
use crate::descriptor::ToolDescriptor;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::RegistrationResult;
use crate::registrar::Registrar;

#[derive(Default)]
pub(crate) struct Entries {
    pub(crate) invocables: HashMap<String, Arc<dyn Invocable>>,
    pub(crate) descriptors: HashMap<String, ToolDescriptor>,
}

/// Registry of tools, created once at startup and shared by handle.
///
/// Entries are only ever inserted through a [`Registrar`]; there is no
/// removal. Both mappings are updated under one write lock so readers never
/// see an invocable without its descriptor.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<Entries>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.read();
        let mut names: Vec<_> = entries.descriptors.keys().cloned().collect();
        names.sort();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration with the default [`Registrar`].
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::RegistrationError`] from validation.
    pub fn register(&self, declaration: ToolDeclaration) -> RegistrationResult<ToolDescriptor> {
        Registrar::new(self).register(declaration)
    }

    /// Dispatches a call and returns its string outcome.
    #[must_use]
    pub fn dispatch(&self, name: &str, args: &ToolArgs) -> String {
        Dispatcher::new(self).dispatch(name, args)
    }

    /// Dispatches a call and returns the structured outcome.
    #[must_use]
    pub fn dispatch_outcome(&self, name: &str, args: &ToolArgs) -> DispatchOutcome {
        Dispatcher::new(self).dispatch_outcome(name, args)
    }

    /// Returns an isolated copy of every registered descriptor.
    #[must_use]
    pub fn list_tools(&self) -> BTreeMap<String, ToolDescriptor> {
        Catalog::new(self).snapshot()
    }

    /// Returns `true` if a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().invocables.contains_key(name)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().descriptors.len()
    }

    /// Returns `true` when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn invocable(&self, name: &str) -> Option<Arc<dyn Invocable>> {
        self.read().invocables.get(name).cloned()
    }

    /// Inserts both halves of an entry, returning the replaced descriptor.
    pub(crate) fn insert(
        &self,
        descriptor: ToolDescriptor,
        invocable: Arc<dyn Invocable>,
    ) -> Option<ToolDescriptor> {
        let mut entries = self.write();
        let name = descriptor.name().to_owned();
        entries.invocables.insert(name.clone(), invocable);
        entries.descriptors.insert(name, descriptor)
    }

    /// Inserts an entry unless the name is taken, checked under the same
    /// write guard. Hands the descriptor back when it was not stored.
    pub(crate) fn insert_if_absent(
        &self,
        descriptor: ToolDescriptor,
        invocable: Arc<dyn Invocable>,
    ) -> Result<(), ToolDescriptor> {
        let mut entries = self.write();
        if entries.descriptors.contains_key(descriptor.name()) {
            return Err(descriptor);
        }
        let name = descriptor.name().to_owned();
        entries.invocables.insert(name.clone(), invocable);
        entries.descriptors.insert(name, descriptor);
        Ok(())
    }

    // Writers never leave the maps half-updated, so a poisoned lock still
    // guards consistent data.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
