use std::sync::Arc;

use crate::registry::MarkedType;

/// Implemented by every type that should be instantiated once at startup.
///
/// Normally generated by `#[auto_create]`, which also submits the
/// descriptor to the link-time registry so discovery finds it.
pub trait AutoCreate: Send + Sync + 'static {
    /// Describe how this type is created and which keys it answers to
    fn descriptor() -> MarkedType
    where
        Self: Sized;
}

/// Upcast from a concrete auto-created type to one of its alias types.
///
/// An alias is usually a trait object (`dyn Trait`) the concrete type
/// implements. The returned `Arc` must share the allocation of `self` so
/// every alias observes the same instance.
pub trait ResolvableAs<A: ?Sized> {
    fn upcast(self: Arc<Self>) -> Arc<A>;
}

/// Invoked once after every auto-created instance exists
pub trait AutoAwake {
    fn auto_awake(&self);
}

/// Invoked once after every instance has been awakened
pub trait AutoStart {
    fn auto_start(&self);
}

/// Invoked once when the registry is reset or the process shuts down
pub trait AutoDestroy {
    fn auto_destroy(&self);
}
