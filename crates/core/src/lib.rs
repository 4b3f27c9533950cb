//! # autocreate-core
//!
//! Auto-instantiation registry for component runtimes.
//!
//! Types marked with `#[auto_create]` (or described by hand with
//! [`MarkedType`]) get exactly one instance at startup. Each instance is
//! reachable under its own type and under every alias it declares, receives
//! `auto_awake` once every instance exists and `auto_start` once every
//! instance has been awakened. Arbitrary objects pull those instances into
//! their `#[auto_resolve]` fields on demand.
//!
//! ```rust,ignore
//! use autocreate_core::{auto_create, AutoCreator, AutoResolve, AutoStart};
//! use std::sync::Arc;
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> f64;
//! }
//!
//! #[auto_create(resolvable_as(dyn Clock), hooks(start))]
//! #[derive(Default)]
//! pub struct GameClock;
//!
//! impl Clock for GameClock {
//!     fn now(&self) -> f64 {
//!         0.0
//!     }
//! }
//!
//! impl AutoStart for GameClock {
//!     fn auto_start(&self) {}
//! }
//!
//! #[derive(Default, AutoResolve)]
//! struct Hud {
//!     #[auto_resolve]
//!     clock: Option<Arc<dyn Clock>>,
//! }
//!
//! let creator = AutoCreator::new();
//! creator.initialize()?;
//!
//! let mut hud = Hud::default();
//! creator.resolve(&mut hud);
//! assert!(hud.clock.is_some());
//! ```

// Lets the derive output (which names `::autocreate_core`) compile inside this crate.
extern crate self as autocreate_core;

pub mod config;
pub mod discovery;
pub mod errors;
pub mod foundation;
pub mod injector;
pub mod persistence;
pub mod registry;

pub use config::{AutoCreateConfig, ConfigError, ConfigSource, EnvConfig};
pub use discovery::{
    find_marked_types, FnCatalog, InventoryCatalog, Registration, StaticCatalog, TypeCatalog,
};
pub use errors::AutoCreateError;
pub use foundation::{AutoAwake, AutoCreate, AutoDestroy, AutoStart, LifecycleState, ResolvableAs};
pub use injector::{AutoResolve, FieldResolver, MissingField, ResolveReport};
pub use persistence::{
    FileStore, MemoryStore, PayloadFormat, PersistenceBridge, PersistenceError, SingletonSettings,
    StorageKey,
};
pub use registry::{
    global, Alias, AliasResolver, AutoCreator, AutoCreatorBuilder, CreationPolicy, Erased,
    InitReport, InstanceEntry, InstanceTable, LifecycleDispatcher, LifecyclePhase, MarkedType,
    MarkedTypeBuilder, RejectedAlias, RestoreFailure, ShutdownGuard, TableBuilder, TypeKey,
};

#[cfg(feature = "derive")]
pub use autocreate_derive::{auto_create, AutoResolve};

#[doc(hidden)]
pub use inventory;
