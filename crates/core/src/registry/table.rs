use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::errors::AutoCreateError;
use crate::registry::{Boxed, Erased, Hooks, TypeKey};

/// One key of the instance table and the instance it resolves to
pub struct InstanceEntry {
    key: TypeKey,
    concrete: TypeKey,
    instance: Erased,
    handle: Boxed,
}

impl InstanceEntry {
    /// Create an entry. `handle` must be a boxed `Arc<K>` for the type `K`
    /// that `key` identifies, sharing the allocation of `instance`.
    pub fn new(key: TypeKey, concrete: TypeKey, instance: Erased, handle: Boxed) -> Self {
        Self {
            key,
            concrete,
            instance,
            handle,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Concrete type of the instance behind this key
    pub fn concrete(&self) -> TypeKey {
        self.concrete
    }

    /// Canonical instance
    pub fn instance(&self) -> &Erased {
        &self.instance
    }

    /// Typed handle of the instance, if `K` is the type this entry is keyed by
    pub fn resolve<K: ?Sized + 'static>(&self) -> Option<Arc<K>> {
        (*self.handle).downcast_ref::<Arc<K>>().cloned()
    }
}

impl fmt::Debug for InstanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceEntry")
            .field("key", &self.key)
            .field("concrete", &self.concrete)
            .finish()
    }
}

pub(crate) struct DistinctInstance {
    pub(crate) concrete: TypeKey,
    pub(crate) instance: Erased,
    pub(crate) hooks: Hooks,
}

fn identity(instance: &Erased) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

/// Mapping from type key to the single instance registered under it.
///
/// Several keys may share one instance. Distinct instances are tracked by
/// allocation identity in the order they were first registered, which is
/// the order lifecycle hooks run in.
#[derive(Default)]
pub struct InstanceTable {
    entries: HashMap<TypeKey, InstanceEntry>,
    order: Vec<TypeKey>,
    distinct: Vec<DistinctInstance>,
    seen: HashSet<usize>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, failing if its key is already taken
    pub fn insert(&mut self, entry: InstanceEntry, hooks: Hooks) -> Result<(), AutoCreateError> {
        if let Some(existing) = self.entries.get(&entry.key) {
            return Err(AutoCreateError::duplicate_key(
                entry.key.name(),
                existing.concrete.name(),
                entry.concrete.name(),
            ));
        }

        if self.seen.insert(identity(&entry.instance)) {
            self.distinct.push(DistinctInstance {
                concrete: entry.concrete,
                instance: Arc::clone(&entry.instance),
                hooks,
            });
        }

        self.order.push(entry.key);
        self.entries.insert(entry.key, entry);
        Ok(())
    }

    /// Resolve the instance registered under `K`
    pub fn resolve<K: ?Sized + 'static>(&self) -> Option<Arc<K>> {
        self.entries.get(&TypeKey::of::<K>())?.resolve::<K>()
    }

    pub fn get(&self, key: &TypeKey) -> Option<&InstanceEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[TypeKey] {
        &self.order
    }

    /// Distinct instances in first-registration order
    pub fn instances(&self) -> Vec<Erased> {
        self.distinct
            .iter()
            .map(|distinct| Arc::clone(&distinct.instance))
            .collect()
    }

    /// Concrete types of the distinct instances in first-registration order
    pub fn concrete_types(&self) -> Vec<TypeKey> {
        self.distinct.iter().map(|distinct| distinct.concrete).collect()
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct.len()
    }

    pub(crate) fn distinct(&self) -> &[DistinctInstance] {
        &self.distinct
    }
}

impl fmt::Debug for InstanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceTable")
            .field("keys", &self.order)
            .field("distinct", &self.concrete_types())
            .finish()
    }
}
