//! Type discovery
//!
//! Marked types register themselves via `inventory::submit!` (emitted by
//! `#[auto_create]`) and are discovered at runtime via `inventory::iter`.
//! Other catalogs supply descriptors explicitly, which keeps tests and data
//! driven registries independent from what happens to be linked in.

use std::collections::HashSet;

use crate::config::AutoCreateConfig;
use crate::errors::AutoCreateError;
use crate::registry::MarkedType;

/// Link-time registration of a marked type
pub struct Registration {
    /// Builds the descriptor of the registered type
    pub descriptor: fn() -> MarkedType,
}

impl Registration {
    pub const fn new(descriptor: fn() -> MarkedType) -> Self {
        Self { descriptor }
    }
}

inventory::collect!(Registration);

/// Source of the marked types an auto-creator instantiates
pub trait TypeCatalog: Send + Sync {
    fn marked_types(&self) -> Result<Vec<MarkedType>, AutoCreateError>;
}

/// Catalog of every type registered with `inventory::submit!`
#[derive(Debug, Clone)]
pub struct InventoryCatalog {
    sorted: bool,
}

impl InventoryCatalog {
    /// Catalog returning types sorted by name
    pub fn new() -> Self {
        Self { sorted: true }
    }

    /// Catalog returning types in link order, which is not stable across builds
    pub fn unsorted() -> Self {
        Self { sorted: false }
    }

    pub fn from_config(config: &AutoCreateConfig) -> Self {
        Self {
            sorted: config.sort_discovery,
        }
    }
}

impl Default for InventoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog for InventoryCatalog {
    fn marked_types(&self) -> Result<Vec<MarkedType>, AutoCreateError> {
        let mut types: Vec<MarkedType> = inventory::iter::<Registration>()
            .map(|registration| (registration.descriptor)())
            .collect();

        let mut seen = HashSet::with_capacity(types.len());
        for marked in &types {
            if !seen.insert(marked.key()) {
                return Err(AutoCreateError::discovery(format!(
                    "type '{}' is registered more than once",
                    marked.key()
                )));
            }
        }

        if self.sorted {
            types.sort_by_key(MarkedType::key);
        }

        tracing::debug!("Discovered {} marked type(s)", types.len());
        Ok(types)
    }
}

/// Catalog over an explicit list of descriptors, returned in list order
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: Vec<MarkedType>,
}

impl StaticCatalog {
    pub fn new(types: Vec<MarkedType>) -> Self {
        Self { types }
    }

    /// Append a descriptor
    pub fn with(mut self, marked: MarkedType) -> Self {
        self.types.push(marked);
        self
    }

    pub fn push(&mut self, marked: MarkedType) {
        self.types.push(marked);
    }
}

impl TypeCatalog for StaticCatalog {
    fn marked_types(&self) -> Result<Vec<MarkedType>, AutoCreateError> {
        Ok(self.types.clone())
    }
}

/// Catalog backed by a closure, for descriptors produced on demand
pub struct FnCatalog<F> {
    source: F,
}

impl<F> FnCatalog<F>
where
    F: Fn() -> Result<Vec<MarkedType>, AutoCreateError> + Send + Sync,
{
    pub fn new(source: F) -> Self {
        Self { source }
    }
}

impl<F> TypeCatalog for FnCatalog<F>
where
    F: Fn() -> Result<Vec<MarkedType>, AutoCreateError> + Send + Sync,
{
    fn marked_types(&self) -> Result<Vec<MarkedType>, AutoCreateError> {
        (self.source)()
    }
}

/// Every marked type registered in the running binary, sorted by name
pub fn find_marked_types() -> Result<Vec<MarkedType>, AutoCreateError> {
    InventoryCatalog::new().marked_types()
}
