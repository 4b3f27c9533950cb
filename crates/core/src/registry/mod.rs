//! Instance registry: descriptors, table construction, alias expansion,
//! lifecycle dispatch and the auto-creator that ties them together.

pub mod alias;
pub mod auto_creator;
pub mod builder;
pub mod descriptor;
pub mod global;
pub mod lifecycle;
pub mod table;

pub use alias::AliasResolver;
pub use auto_creator::{AutoCreator, AutoCreatorBuilder};
pub use builder::{InitReport, RejectedAlias, RestoreFailure, TableBuilder};
pub use descriptor::{
    Alias, AliasCast, Boxed, CreationPolicy, Erased, Hook, Hooks, MarkedType, MarkedTypeBuilder,
    TypeKey,
};
pub use global::ShutdownGuard;
pub use lifecycle::{LifecycleDispatcher, LifecyclePhase};
pub use table::{InstanceEntry, InstanceTable};
