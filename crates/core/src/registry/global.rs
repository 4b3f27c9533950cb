//! Process-wide auto-creator
//!
//! Statics are never dropped, so the global creator is torn down through the
//! [`ShutdownGuard`] returned by [`initialize`] instead of `Drop`.

use std::sync::Arc;

use crate::errors::AutoCreateError;
use crate::injector::{AutoResolve, ResolveReport};
use crate::registry::{AutoCreator, InitReport};

/// Global auto-creator (can be set once before first use)
static GLOBAL_AUTO_CREATOR: std::sync::OnceLock<AutoCreator> = std::sync::OnceLock::new();

/// Install a configured creator as the global one.
///
/// Fails, handing the creator back, if the global creator already exists.
pub fn install(creator: AutoCreator) -> Result<(), AutoCreator> {
    GLOBAL_AUTO_CREATOR.set(creator)
}

/// Get the global auto-creator, creating a default one on first use
pub fn auto_creator() -> &'static AutoCreator {
    GLOBAL_AUTO_CREATOR.get_or_init(AutoCreator::new)
}

/// Initialize the global auto-creator.
///
/// Keep the guard alive for as long as the instances are in use; dropping it
/// runs the destroy hooks and clears the table. Only the call that built the
/// table gets an owning guard, guards from later calls drop without effect.
pub fn initialize() -> Result<ShutdownGuard, AutoCreateError> {
    let report = auto_creator().initialize()?;
    let owns_reset = !report.already_initialized;
    Ok(ShutdownGuard { report, owns_reset })
}

/// Reset the global auto-creator
pub fn reset() -> Result<(), AutoCreateError> {
    auto_creator().reset()
}

/// The globally registered instance of `K`, if any
pub fn as_singleton<K: ?Sized + 'static>() -> Option<Arc<K>> {
    auto_creator().as_singleton::<K>()
}

/// Resolve the tagged fields of `target` from the global creator
pub fn resolve<T: AutoResolve + ?Sized>(target: &mut T) -> ResolveReport {
    auto_creator().resolve(target)
}

/// Resets the global auto-creator when dropped
#[must_use = "dropping the guard immediately tears down every auto-created instance"]
#[derive(Debug)]
pub struct ShutdownGuard {
    report: InitReport,
    owns_reset: bool,
}

impl ShutdownGuard {
    /// Report of the initialization this guard belongs to
    pub fn report(&self) -> &InitReport {
        &self.report
    }

    /// Whether dropping this guard resets the global creator
    pub fn owns_reset(&self) -> bool {
        self.owns_reset
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if !self.owns_reset {
            return;
        }
        if let Err(error) = reset() {
            tracing::error!("Failed to reset global auto-creator: {}", error);
        }
    }
}
