pub mod lifecycle;
pub mod traits;

pub use lifecycle::LifecycleState;
pub use traits::{AutoAwake, AutoCreate, AutoDestroy, AutoStart, ResolvableAs};
