use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::config::{AutoCreateConfig, EnvConfig};
use crate::discovery::{InventoryCatalog, StaticCatalog, TypeCatalog};
use crate::errors::AutoCreateError;
use crate::foundation::LifecycleState;
use crate::injector::{resolve_with, AutoResolve, FieldResolver, ResolveReport};
use crate::persistence::{FileStore, PersistenceBridge};
use crate::registry::{
    InitReport, InstanceTable, LifecycleDispatcher, LifecyclePhase, MarkedType, TableBuilder,
    TypeKey,
};

/// Owns the instance table and drives the auto-creation lifecycle.
///
/// Hooks run after the table is committed and outside of its lock, so they
/// may call [`AutoCreator::as_singleton`] and [`AutoCreator::resolve`]. They
/// must not call [`AutoCreator::initialize`] or [`AutoCreator::reset`] on
/// the same creator.
pub struct AutoCreator {
    catalog: Box<dyn TypeCatalog>,
    bridge: Arc<dyn PersistenceBridge>,
    config: AutoCreateConfig,
    table: RwLock<Option<Arc<InstanceTable>>>,
    state: RwLock<LifecycleState>,
    transition: Mutex<()>,
}

impl AutoCreator {
    /// Creator over every `#[auto_create]` type linked into the binary,
    /// restoring singletons from the default file store
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creator configured from `AUTOCREATE_*` environment variables
    pub fn from_env() -> Result<Self, AutoCreateError> {
        let config = AutoCreateConfig::from_env()?;
        Ok(Self::builder().with_config(config).build())
    }

    pub fn builder() -> AutoCreatorBuilder {
        AutoCreatorBuilder::new()
    }

    /// Discover marked types, build the instance table and run awake then
    /// start on every distinct instance.
    ///
    /// Calling it again while initialized does nothing and returns a report
    /// with `already_initialized` set. A duplicate key fails the call and
    /// leaves the creator uninitialized, and so does a hook that panics.
    pub fn initialize(&self) -> Result<InitReport, AutoCreateError> {
        let _transition = self.lock_transition();

        if self.current_table()?.is_some() {
            tracing::debug!("Auto-creator already initialized");
            return Ok(InitReport {
                already_initialized: true,
                ..InitReport::default()
            });
        }

        let types = self.catalog.marked_types()?;
        let (table, mut report) = TableBuilder::new(&*self.bridge, &self.config).build(&types)?;
        let table = Arc::new(table);

        *self
            .table
            .write()
            .map_err(|_| AutoCreateError::lock("instance_table"))? = Some(Arc::clone(&table));
        let mut rollback = DiscardOnAbort::new(self, "startup");

        self.set_state(LifecycleState::Awakening)?;
        report.awake_invocations = LifecycleDispatcher::dispatch(&table, LifecyclePhase::Awake);

        self.set_state(LifecycleState::Starting)?;
        report.start_invocations = LifecycleDispatcher::dispatch(&table, LifecyclePhase::Start);

        self.set_state(LifecycleState::Ready)?;
        rollback.completed = true;
        tracing::info!(
            "Auto-created {} instance(s) under {} key(s) from {} marked type(s)",
            report.instances(),
            report.entries,
            types.len()
        );
        Ok(report)
    }

    /// Run destroy on every distinct instance in reverse registration order,
    /// then discard the table. Does nothing when not initialized.
    pub fn reset(&self) -> Result<(), AutoCreateError> {
        let _transition = self.lock_transition();

        let Some(table) = self.current_table()? else {
            return Ok(());
        };

        let mut discard = DiscardOnAbort::new(self, "teardown");
        self.set_state(LifecycleState::Destroying)?;
        let destroyed = LifecycleDispatcher::dispatch(&table, LifecyclePhase::Destroy);

        *self
            .table
            .write()
            .map_err(|_| AutoCreateError::lock("instance_table"))? = None;
        self.set_state(LifecycleState::Uninitialized)?;
        discard.completed = true;

        tracing::info!(
            "Auto-creator reset, {} of {} instance(s) destroyed",
            destroyed,
            table.distinct_count()
        );
        Ok(())
    }

    /// The instance registered under `K`, if any
    pub fn as_singleton<K: ?Sized + 'static>(&self) -> Option<Arc<K>> {
        self.table().ok()??.resolve::<K>()
    }

    /// The canonical instance registered under `key`, if any
    pub fn as_singleton_by_key(&self, key: &TypeKey) -> Option<Arc<dyn Any + Send + Sync>> {
        let table = self.table().ok()??;
        table.get(key).map(|entry| Arc::clone(entry.instance()))
    }

    /// Distinct auto-created instances in creation order
    pub fn instances(&self) -> Vec<Arc<dyn Any + Send + Sync>> {
        match self.table() {
            Ok(Some(table)) => table.instances(),
            _ => Vec::new(),
        }
    }

    /// The committed instance table
    pub fn table(&self) -> Result<Option<Arc<InstanceTable>>, AutoCreateError> {
        self.current_table()
    }

    /// Fill every tagged field of `target` that has a registered instance
    pub fn resolve<T: AutoResolve + ?Sized>(&self, target: &mut T) -> ResolveReport {
        let table = self.table().ok().flatten();
        resolve_with(table.as_deref(), target)
    }

    /// Fill a single slot, returning whether an instance was found
    pub fn resolve_field<K: ?Sized + 'static>(&self, slot: &mut Option<Arc<K>>) -> bool {
        let table = self.table().ok().flatten();
        FieldResolver::new(table.as_deref()).field("<detached>", "<slot>", slot)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.current_table(), Ok(Some(_)))
    }

    pub fn config(&self) -> &AutoCreateConfig {
        &self.config
    }

    pub fn bridge(&self) -> &Arc<dyn PersistenceBridge> {
        &self.bridge
    }

    // The mutex guards no data, a panic inside a hook must not wedge it
    fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn current_table(&self) -> Result<Option<Arc<InstanceTable>>, AutoCreateError> {
        let table = self
            .table
            .read()
            .map_err(|_| AutoCreateError::lock("instance_table"))?;
        Ok(table.clone())
    }

    fn set_state(&self, next: LifecycleState) -> Result<(), AutoCreateError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| AutoCreateError::lock("lifecycle_state"))?;
        tracing::trace!("Auto-creator state {} -> {}", *state, next);
        *state = next;
        Ok(())
    }
}

/// Drops the committed table when a lifecycle pass does not run to the end,
/// either through an early error or a panicking hook
struct DiscardOnAbort<'a> {
    creator: &'a AutoCreator,
    pass: &'static str,
    completed: bool,
}

impl<'a> DiscardOnAbort<'a> {
    fn new(creator: &'a AutoCreator, pass: &'static str) -> Self {
        Self {
            creator,
            pass,
            completed: false,
        }
    }
}

impl Drop for DiscardOnAbort<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        tracing::error!(
            "Auto-creator {} aborted, discarding the instance table",
            self.pass
        );
        *self
            .creator
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self
            .creator
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = LifecycleState::Uninitialized;
    }
}

impl Default for AutoCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AutoCreator {
    fn drop(&mut self) {
        if let Err(error) = self.reset() {
            tracing::error!("Failed to reset auto-creator on drop: {}", error);
        }
    }
}

impl std::fmt::Debug for AutoCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCreator")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("table", &self.current_table().ok().flatten())
            .finish()
    }
}

/// Builder for [`AutoCreator`]
#[derive(Default)]
pub struct AutoCreatorBuilder {
    catalog: Option<Box<dyn TypeCatalog>>,
    bridge: Option<Arc<dyn PersistenceBridge>>,
    config: Option<AutoCreateConfig>,
}

impl AutoCreatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom source of marked types
    pub fn with_catalog(mut self, catalog: impl TypeCatalog + 'static) -> Self {
        self.catalog = Some(Box::new(catalog));
        self
    }

    /// Use an explicit list of marked types instead of link-time discovery
    pub fn with_types(self, types: Vec<MarkedType>) -> Self {
        self.with_catalog(StaticCatalog::new(types))
    }

    pub fn with_bridge(mut self, bridge: impl PersistenceBridge + 'static) -> Self {
        self.bridge = Some(Arc::new(bridge));
        self
    }

    /// Use a bridge the caller keeps a handle to
    pub fn with_shared_bridge(mut self, bridge: Arc<dyn PersistenceBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_config(mut self, config: AutoCreateConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> AutoCreator {
        let config = self.config.unwrap_or_default();
        let catalog = self
            .catalog
            .unwrap_or_else(|| Box::new(InventoryCatalog::from_config(&config)) as Box<dyn TypeCatalog>);
        let bridge = self
            .bridge
            .unwrap_or_else(|| Arc::new(FileStore::from_config(&config)) as Arc<dyn PersistenceBridge>);

        AutoCreator {
            catalog,
            bridge,
            config,
            table: RwLock::new(None),
            state: RwLock::new(LifecycleState::Uninitialized),
            transition: Mutex::new(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FnCatalog;
    use crate::foundation::{AutoAwake, AutoDestroy, AutoStart, ResolvableAs};
    use crate::persistence::{MemoryStore, StorageKey};
    use serde::{Deserialize, Serialize};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    trait Ticker: Send + Sync {
        fn ticks(&self) -> usize;
    }

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Clock {
        awake: AtomicUsize,
        start: AtomicUsize,
        destroy: AtomicUsize,
        awake_seen_before_start: AtomicUsize,
    }

    impl Ticker for Clock {
        fn ticks(&self) -> usize {
            42
        }
    }

    impl Named for Clock {
        fn name(&self) -> &'static str {
            "clock"
        }
    }

    impl ResolvableAs<dyn Ticker> for Clock {
        fn upcast(self: Arc<Self>) -> Arc<dyn Ticker> {
            self
        }
    }

    impl ResolvableAs<dyn Named> for Clock {
        fn upcast(self: Arc<Self>) -> Arc<dyn Named> {
            self
        }
    }

    impl AutoAwake for Clock {
        fn auto_awake(&self) {
            self.awake.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AutoStart for Clock {
        fn auto_start(&self) {
            let awakened = self.awake.load(Ordering::SeqCst);
            self.awake_seen_before_start.store(awakened, Ordering::SeqCst);
            self.start.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AutoDestroy for Clock {
        fn auto_destroy(&self) {
            self.destroy.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct Clash;

    impl Ticker for Clash {
        fn ticks(&self) -> usize {
            0
        }
    }

    impl ResolvableAs<dyn Ticker> for Clash {
        fn upcast(self: Arc<Self>) -> Arc<dyn Ticker> {
            self
        }
    }

    static FRAGILE_PANICS: AtomicBool = AtomicBool::new(true);

    #[derive(Default)]
    struct Fragile;

    impl AutoAwake for Fragile {
        fn auto_awake(&self) {
            if FRAGILE_PANICS.load(Ordering::SeqCst) {
                panic!("fragile awake failed");
            }
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Settings {
        difficulty: String,
    }

    fn clock_type() -> MarkedType {
        MarkedType::constructed::<Clock>()
            .resolvable_as::<dyn Ticker>()
            .resolvable_as::<dyn Named>()
            .on_awake()
            .on_start()
            .on_destroy()
            .build()
    }

    fn creator(types: Vec<MarkedType>) -> AutoCreator {
        AutoCreator::builder()
            .with_types(types)
            .with_bridge(MemoryStore::new())
            .build()
    }

    #[test]
    fn test_hooks_run_once_per_instance_despite_aliases() {
        let creator = creator(vec![clock_type()]);

        let report = creator.initialize().unwrap();

        let clock = creator.as_singleton::<Clock>().unwrap();
        assert_eq!(clock.awake.load(Ordering::SeqCst), 1);
        assert_eq!(clock.start.load(Ordering::SeqCst), 1);
        assert_eq!(clock.awake_seen_before_start.load(Ordering::SeqCst), 1);
        assert_eq!(report.awake_invocations, 1);
        assert_eq!(report.start_invocations, 1);
        assert_eq!(report.entries, 3);
        assert_eq!(creator.state(), LifecycleState::Ready);
    }

    #[test]
    fn test_aliases_resolve_to_identical_instance() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();

        let clock = creator.as_singleton::<Clock>().unwrap();
        let ticker = creator.as_singleton::<dyn Ticker>().unwrap();
        let named = creator.as_singleton::<dyn Named>().unwrap();

        assert_eq!(ticker.ticks(), 42);
        assert_eq!(named.name(), "clock");
        let address = Arc::as_ptr(&clock) as *const () as usize;
        assert_eq!(Arc::as_ptr(&ticker) as *const () as usize, address);
        assert_eq!(Arc::as_ptr(&named) as *const () as usize, address);
        assert_eq!(creator.instances().len(), 1);
    }

    #[test]
    fn test_second_initialize_is_noop() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();

        let again = creator.initialize().unwrap();

        assert!(again.already_initialized);
        let clock = creator.as_singleton::<Clock>().unwrap();
        assert_eq!(clock.awake.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_destroys_once_and_clears_table() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();
        let clock = creator.as_singleton::<Clock>().unwrap();

        creator.reset().unwrap();
        creator.reset().unwrap();

        assert_eq!(clock.destroy.load(Ordering::SeqCst), 1);
        assert!(creator.as_singleton::<Clock>().is_none());
        assert!(!creator.is_initialized());
        assert_eq!(creator.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_reinitialize_after_reset_creates_fresh_instances() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();
        let first = creator.as_singleton::<Clock>().unwrap();

        creator.reset().unwrap();
        creator.initialize().unwrap();
        let second = creator.as_singleton::<Clock>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.awake.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_destroy() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();
        let clock = creator.as_singleton::<Clock>().unwrap();

        drop(creator);

        assert_eq!(clock.destroy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_alias_leaves_creator_uninitialized() {
        let clashing = Arc::new(AtomicBool::new(true));
        let source = Arc::clone(&clashing);
        let creator = AutoCreator::builder()
            .with_catalog(FnCatalog::new(move || {
                let mut types = vec![clock_type()];
                if source.load(Ordering::SeqCst) {
                    types.push(
                        MarkedType::constructed::<Clash>()
                            .resolvable_as::<dyn Ticker>()
                            .build(),
                    );
                }
                Ok(types)
            }))
            .with_bridge(MemoryStore::new())
            .build();

        let error = creator.initialize().unwrap_err();

        assert!(error.is_fatal());
        assert!(!creator.is_initialized());
        assert!(creator.as_singleton::<Clock>().is_none());
        assert!(creator.instances().is_empty());

        // Same catalog, same failure
        assert!(creator.initialize().unwrap_err().is_duplicate_key());
        assert_eq!(creator.state(), LifecycleState::Uninitialized);

        clashing.store(false, Ordering::SeqCst);
        let report = creator.initialize().unwrap();

        let clock = creator.as_singleton::<Clock>().unwrap();
        assert!(!report.already_initialized);
        assert_eq!(report.awake_invocations, 1);
        assert_eq!(clock.awake.load(Ordering::SeqCst), 1);
        assert_eq!(clock.start.load(Ordering::SeqCst), 1);
        assert_eq!(creator.instances().len(), 1);
    }

    #[test]
    fn test_panicking_hook_discards_table_and_allows_retry() {
        let creator = creator(vec![
            MarkedType::constructed::<Fragile>().on_awake().build(),
            clock_type(),
        ]);

        let outcome = catch_unwind(AssertUnwindSafe(|| creator.initialize()));

        assert!(outcome.is_err());
        assert!(!creator.is_initialized());
        assert_eq!(creator.state(), LifecycleState::Uninitialized);
        assert!(creator.as_singleton::<Clock>().is_none());
        creator.reset().unwrap();

        FRAGILE_PANICS.store(false, Ordering::SeqCst);
        creator.initialize().unwrap();

        let clock = creator.as_singleton::<Clock>().unwrap();
        assert_eq!(clock.awake.load(Ordering::SeqCst), 1);
        assert_eq!(clock.start.load(Ordering::SeqCst), 1);
        assert!(creator.state().is_ready());
    }

    #[test]
    fn test_discovery_failure_is_surfaced() {
        let creator = AutoCreator::builder()
            .with_catalog(FnCatalog::new(|| {
                Err(AutoCreateError::discovery("assemblies unavailable"))
            }))
            .with_bridge(MemoryStore::new())
            .build();

        assert!(matches!(
            creator.initialize(),
            Err(AutoCreateError::Discovery { .. })
        ));
    }

    #[test]
    fn test_restored_singleton_uses_configured_namespace() {
        let config = AutoCreateConfig::new().with_storage_namespace("Saves");
        let store = MemoryStore::new().with_payload(
            StorageKey::new("Saves", "Settings"),
            r#"{"difficulty": "hard"}"#,
        );
        let creator = AutoCreator::builder()
            .with_types(vec![MarkedType::restored::<Settings>().build()])
            .with_bridge(store)
            .with_config(config)
            .build();

        let report = creator.initialize().unwrap();

        assert_eq!(report.restored, 1);
        assert_eq!(creator.as_singleton::<Settings>().unwrap().difficulty, "hard");
    }

    #[test]
    fn test_resolve_before_initialize_reports_missing() {
        #[derive(Default)]
        struct Hud {
            ticker: Option<Arc<dyn Ticker>>,
        }

        impl AutoResolve for Hud {
            fn auto_resolve(&mut self, resolver: &mut FieldResolver<'_>) {
                resolver.field("Hud", "ticker", &mut self.ticker);
            }
        }

        let creator = creator(vec![clock_type()]);
        let mut hud = Hud::default();

        assert!(!creator.resolve(&mut hud).is_complete());
        assert!(hud.ticker.is_none());

        creator.initialize().unwrap();
        assert!(creator.resolve(&mut hud).is_complete());
        assert_eq!(hud.ticker.as_ref().unwrap().ticks(), 42);

        let mut slot: Option<Arc<dyn Named>> = None;
        assert!(creator.resolve_field(&mut slot));
    }

    #[test]
    fn test_as_singleton_by_key_returns_canonical_instance() {
        let creator = creator(vec![clock_type()]);
        creator.initialize().unwrap();

        let erased = creator
            .as_singleton_by_key(&TypeKey::of::<dyn Ticker>())
            .unwrap();

        assert!(erased.downcast_ref::<Clock>().is_some());
    }
}
