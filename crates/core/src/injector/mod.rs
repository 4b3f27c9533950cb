//! Field injection
//!
//! Objects opt in by implementing [`AutoResolve`] (usually through
//! `#[derive(AutoResolve)]`) and listing their `Option<Arc<K>>` fields.
//! Resolution assigns every field whose key is registered and leaves the
//! rest untouched, so it can be repeated safely.

use std::sync::Arc;

use crate::registry::{InstanceTable, TypeKey};

/// Implemented by objects whose fields are filled from the instance table
pub trait AutoResolve {
    fn auto_resolve(&mut self, resolver: &mut FieldResolver<'_>);
}

/// Field whose key had no registered instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub owner: &'static str,
    pub field: &'static str,
    pub type_name: &'static str,
}

/// Outcome of resolving one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub resolved: usize,
    pub missing: Vec<MissingField>,
}

impl ResolveReport {
    /// Whether every tagged field found an instance
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Assigns tagged fields from an instance table
pub struct FieldResolver<'a> {
    table: Option<&'a InstanceTable>,
    report: ResolveReport,
}

impl<'a> FieldResolver<'a> {
    /// Create a resolver. Without a table every field is reported missing.
    pub fn new(table: Option<&'a InstanceTable>) -> Self {
        Self {
            table,
            report: ResolveReport::default(),
        }
    }

    /// Assign `slot` with the instance registered under `K`.
    ///
    /// Returns `false` and leaves the slot unchanged when `K` has no
    /// instance.
    pub fn field<K: ?Sized + 'static>(
        &mut self,
        owner: &'static str,
        field: &'static str,
        slot: &mut Option<Arc<K>>,
    ) -> bool {
        match self.table.and_then(|table| table.resolve::<K>()) {
            Some(instance) => {
                *slot = Some(instance);
                self.report.resolved += 1;
                true
            }
            None => {
                let type_name = TypeKey::of::<K>().name();
                tracing::warn!(
                    "Could not autoresolve the field '{}.{}' of the type '{}'",
                    owner,
                    field,
                    type_name
                );
                self.report.missing.push(MissingField {
                    owner,
                    field,
                    type_name,
                });
                false
            }
        }
    }

    /// Resolve the fields of an embedded object
    pub fn nested<T: AutoResolve + ?Sized>(&mut self, target: &mut T) {
        target.auto_resolve(self);
    }

    pub fn finish(self) -> ResolveReport {
        self.report
    }
}

/// Resolve every tagged field of `target` from `table`
pub fn resolve_with<T: AutoResolve + ?Sized>(
    table: Option<&InstanceTable>,
    target: &mut T,
) -> ResolveReport {
    let mut resolver = FieldResolver::new(table);
    target.auto_resolve(&mut resolver);
    resolver.finish()
}
