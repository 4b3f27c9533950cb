use std::sync::Arc;

use crate::config::AutoCreateConfig;
use crate::errors::AutoCreateError;
use crate::persistence::{PayloadFormat, PersistenceBridge, StorageKey};
use crate::registry::descriptor::Activation;
use crate::registry::{AliasResolver, Erased, InstanceTable, MarkedType};

/// Alias skipped because it does not apply to the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAlias {
    pub concrete: &'static str,
    pub alias: &'static str,
}

/// Singleton skipped because its stored payload could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFailure {
    pub type_name: &'static str,
    pub storage_key: String,
    pub message: String,
}

/// Outcome of an initialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Instances default-constructed
    pub created: usize,
    /// Singletons restored from storage
    pub restored: usize,
    /// Singletons skipped because storage held no payload for them
    pub restore_absent: Vec<&'static str>,
    pub restore_failures: Vec<RestoreFailure>,
    pub rejected_aliases: Vec<RejectedAlias>,
    /// Abstract marked types, never instantiated
    pub skipped_abstract: usize,
    /// Keys registered in the table
    pub entries: usize,
    pub awake_invocations: usize,
    pub start_invocations: usize,
    /// The registry was already initialized, nothing was done
    pub already_initialized: bool,
}

impl InitReport {
    /// Distinct instances in the table
    pub fn instances(&self) -> usize {
        self.created + self.restored
    }

    /// Whether every marked type produced all of its entries
    pub fn is_clean(&self) -> bool {
        self.restore_failures.is_empty() && self.rejected_aliases.is_empty()
    }
}

/// Builds an instance table from marked type descriptors.
///
/// The build is all or nothing: entries are merged into a staging table
/// that is only returned once every marked type has been registered, so a
/// duplicate key leaves no partial table behind.
pub struct TableBuilder<'a> {
    bridge: &'a dyn PersistenceBridge,
    namespace: &'a str,
    format: PayloadFormat,
}

impl<'a> TableBuilder<'a> {
    pub fn new(bridge: &'a dyn PersistenceBridge, config: &'a AutoCreateConfig) -> Self {
        Self {
            bridge,
            namespace: &config.storage_namespace,
            format: config.payload_format,
        }
    }

    pub fn build(
        &self,
        types: &[MarkedType],
    ) -> Result<(InstanceTable, InitReport), AutoCreateError> {
        let mut staging = InstanceTable::new();
        let mut report = InitReport::default();

        for marked in types {
            let Some(instance) = self.instantiate(marked, &mut report) else {
                continue;
            };

            let (entries, rejected) = AliasResolver::expand(marked, &instance);
            report.rejected_aliases.extend(rejected);

            for entry in entries {
                if let Err(error) = staging.insert(entry, marked.hooks()) {
                    tracing::error!("{}", error);
                    return Err(error);
                }
            }
        }

        report.entries = staging.len();
        Ok((staging, report))
    }

    /// Create the instance of one marked type, or `None` when it is skipped
    fn instantiate(&self, marked: &MarkedType, report: &mut InitReport) -> Option<Erased> {
        let key = marked.key();

        match marked.activation() {
            Activation::Abstract => {
                tracing::debug!("Skipping abstract marked type '{}'", key);
                report.skipped_abstract += 1;
                None
            }
            Activation::Construct { create, .. } => {
                tracing::debug!("Creating instance of '{}'", key);
                report.created += 1;
                Some(Arc::from(create()))
            }
            Activation::Restore { decode, .. } => {
                let storage_key = StorageKey::for_type(self.namespace, &key);
                let failure = |message: String| {
                    tracing::warn!(
                        "Could not restore singleton '{}' from '{}': {}",
                        key,
                        storage_key,
                        message
                    );
                    RestoreFailure {
                        type_name: key.name(),
                        storage_key: storage_key.to_string(),
                        message,
                    }
                };

                let bytes = match self.bridge.try_load(&storage_key) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        tracing::debug!("No stored data for singleton '{}' at '{}'", key, storage_key);
                        report.restore_absent.push(key.name());
                        return None;
                    }
                    Err(error) => {
                        report.restore_failures.push(failure(error.to_string()));
                        return None;
                    }
                };

                match decode(&bytes, self.format) {
                    Ok(value) => {
                        tracing::debug!("Restored singleton '{}' from '{}'", key, storage_key);
                        report.restored += 1;
                        Some(Arc::from(value))
                    }
                    Err(error) => {
                        report.restore_failures.push(failure(error.to_string()));
                        None
                    }
                }
            }
        }
    }
}
