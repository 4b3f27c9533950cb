use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::foundation::{AutoAwake, AutoDestroy, AutoStart, ResolvableAs};
use crate::persistence::{PayloadFormat, PersistenceError};
use crate::registry::LifecyclePhase;

/// Type-erased shared instance
pub type Erased = Arc<dyn Any + Send + Sync>;

/// Type-erased owned value
pub type Boxed = Box<dyn Any + Send + Sync>;

/// Turns the canonical instance into a boxed `Arc<K>` for one key
pub type AliasCast = fn(Erased) -> Option<Boxed>;

/// Lifecycle callback invoked with the canonical instance
pub type Hook = fn(&(dyn Any + Send + Sync));

/// Identity of a type used as a registry key.
///
/// Trait objects are valid keys, so `TypeKey::of::<dyn Clock>()` addresses
/// every instance registered as resolvable to `dyn Clock`.
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Create the key of a type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the full type name
    pub fn name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generic arguments
    pub fn simple_name(&self) -> &'static str {
        let name = self.type_name.strip_prefix("dyn ").unwrap_or(self.type_name);
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(other.type_name)
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// How the single instance of a marked type comes into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreationPolicy {
    /// Default-construct a fresh instance
    #[default]
    NoAction,
    /// Deserialize the instance from persisted storage
    RestoreFromStorage,
}

impl fmt::Display for CreationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreationPolicy::NoAction => write!(f, "NoAction"),
            CreationPolicy::RestoreFromStorage => write!(f, "RestoreFromStorage"),
        }
    }
}

/// Additional key an instance is registered under
#[derive(Clone, Copy)]
pub struct Alias {
    key: TypeKey,
    declared_for: TypeKey,
    cast: AliasCast,
}

impl Alias {
    /// Alias `A` for instances of the concrete type `C`
    pub fn of<C, A>() -> Self
    where
        C: ResolvableAs<A> + Send + Sync + 'static,
        A: ?Sized + Send + Sync + 'static,
    {
        Self {
            key: TypeKey::of::<A>(),
            declared_for: TypeKey::of::<C>(),
            cast: upcast_to::<C, A>,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Concrete type the alias cast expects
    pub fn declared_for(&self) -> TypeKey {
        self.declared_for
    }

    /// Produce the key-typed handle for `instance`, sharing its allocation.
    ///
    /// Returns `None` when the instance is not of the type the alias was
    /// declared for.
    pub fn cast(&self, instance: &Erased) -> Option<Boxed> {
        (self.cast)(Arc::clone(instance))
    }
}

impl fmt::Debug for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alias")
            .field("key", &self.key)
            .field("declared_for", &self.declared_for)
            .finish()
    }
}

fn upcast_to<C, A>(instance: Erased) -> Option<Boxed>
where
    C: ResolvableAs<A> + Send + Sync + 'static,
    A: ?Sized + Send + Sync + 'static,
{
    let concrete = instance.downcast::<C>().ok()?;
    let alias: Arc<A> = concrete.upcast();
    Some(Box::new(alias))
}

fn self_cast<T: Send + Sync + 'static>(instance: Erased) -> Option<Boxed> {
    let concrete = instance.downcast::<T>().ok()?;
    Some(Box::new(concrete))
}

/// Lifecycle capabilities of a marked type
#[derive(Clone, Copy, Default)]
pub struct Hooks {
    awake: Option<Hook>,
    start: Option<Hook>,
    destroy: Option<Hook>,
}

impl Hooks {
    /// Callback for a phase, if the type has that capability
    pub fn get(&self, phase: LifecyclePhase) -> Option<Hook> {
        match phase {
            LifecyclePhase::Awake => self.awake,
            LifecyclePhase::Start => self.start,
            LifecyclePhase::Destroy => self.destroy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.awake.is_none() && self.start.is_none() && self.destroy.is_none()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("awake", &self.awake.is_some())
            .field("start", &self.start.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

fn awake_hook<T: AutoAwake + 'static>(instance: &(dyn Any + Send + Sync)) {
    if let Some(instance) = instance.downcast_ref::<T>() {
        instance.auto_awake();
    }
}

fn start_hook<T: AutoStart + 'static>(instance: &(dyn Any + Send + Sync)) {
    if let Some(instance) = instance.downcast_ref::<T>() {
        instance.auto_start();
    }
}

fn destroy_hook<T: AutoDestroy + 'static>(instance: &(dyn Any + Send + Sync)) {
    if let Some(instance) = instance.downcast_ref::<T>() {
        instance.auto_destroy();
    }
}

/// Strategy for producing the instance of a marked type
#[derive(Clone, Copy)]
pub(crate) enum Activation {
    Construct {
        create: fn() -> Boxed,
        cast: AliasCast,
    },
    Restore {
        decode: fn(&[u8], PayloadFormat) -> Result<Boxed, PersistenceError>,
        fallback: fn() -> Boxed,
        encode: fn(&(dyn Any + Send + Sync), PayloadFormat) -> Result<Vec<u8>, PersistenceError>,
        cast: AliasCast,
    },
    Abstract,
}

impl Activation {
    fn self_cast(&self) -> Option<AliasCast> {
        match self {
            Activation::Construct { cast, .. } | Activation::Restore { cast, .. } => Some(*cast),
            Activation::Abstract => None,
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Construct { .. } => write!(f, "Construct(<default>)"),
            Activation::Restore { .. } => write!(f, "Restore(<payload>)"),
            Activation::Abstract => write!(f, "Abstract"),
        }
    }
}

fn construct<T: Default + Send + Sync + 'static>() -> Boxed {
    Box::new(T::default())
}

fn decode<T: DeserializeOwned + Send + Sync + 'static>(
    bytes: &[u8],
    format: PayloadFormat,
) -> Result<Boxed, PersistenceError> {
    let value: T = format.decode(bytes)?;
    Ok(Box::new(value) as Boxed)
}

fn encode<T: Serialize + 'static>(
    value: &(dyn Any + Send + Sync),
    format: PayloadFormat,
) -> Result<Vec<u8>, PersistenceError> {
    let value = value
        .downcast_ref::<T>()
        .ok_or(PersistenceError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })?;
    format.encode(value)
}

/// Descriptor of a type carrying the auto-create marker
#[derive(Clone)]
pub struct MarkedType {
    key: TypeKey,
    policy: CreationPolicy,
    activation: Activation,
    aliases: Vec<Alias>,
    hooks: Hooks,
}

impl MarkedType {
    /// Describe a type whose instance is default-constructed
    pub fn constructed<T>() -> MarkedTypeBuilder<T>
    where
        T: Default + Send + Sync + 'static,
    {
        MarkedTypeBuilder::new(Self {
            key: TypeKey::of::<T>(),
            policy: CreationPolicy::NoAction,
            activation: Activation::Construct {
                create: construct::<T>,
                cast: self_cast::<T>,
            },
            aliases: Vec::new(),
            hooks: Hooks::default(),
        })
    }

    /// Describe a singleton whose instance is restored from persisted storage
    pub fn restored<T>() -> MarkedTypeBuilder<T>
    where
        T: Default + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        MarkedTypeBuilder::new(Self {
            key: TypeKey::of::<T>(),
            policy: CreationPolicy::RestoreFromStorage,
            activation: Activation::Restore {
                decode: decode::<T>,
                fallback: construct::<T>,
                encode: encode::<T>,
                cast: self_cast::<T>,
            },
            aliases: Vec::new(),
            hooks: Hooks::default(),
        })
    }

    /// Describe a marked type that can never be instantiated
    pub fn abstract_type<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            policy: CreationPolicy::NoAction,
            activation: Activation::Abstract,
            aliases: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn policy(&self) -> CreationPolicy {
        self.policy
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.activation, Activation::Abstract)
    }

    /// Declared aliases in declaration order
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn hooks(&self) -> Hooks {
        self.hooks
    }

    pub(crate) fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Key-typed handle of `instance` under the marked type's own key
    pub(crate) fn cast_self(&self, instance: &Erased) -> Option<Boxed> {
        let cast = self.activation.self_cast()?;
        cast(Arc::clone(instance))
    }
}

impl fmt::Debug for MarkedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkedType")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .field("activation", &self.activation)
            .field("aliases", &self.aliases)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Typed builder returned by [`MarkedType::constructed`] and
/// [`MarkedType::restored`]
pub struct MarkedTypeBuilder<T> {
    marked: MarkedType,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> MarkedTypeBuilder<T> {
    fn new(marked: MarkedType) -> Self {
        Self {
            marked,
            _type: PhantomData,
        }
    }

    /// Also register the instance under `A`
    pub fn resolvable_as<A>(mut self) -> Self
    where
        T: ResolvableAs<A>,
        A: ?Sized + Send + Sync + 'static,
    {
        self.marked.aliases.push(Alias::of::<T, A>());
        self
    }

    /// Add a prebuilt alias. Aliases declared for another concrete type are
    /// rejected with a warning when the table is built.
    pub fn alias(mut self, alias: Alias) -> Self {
        self.marked.aliases.push(alias);
        self
    }

    pub fn on_awake(mut self) -> Self
    where
        T: AutoAwake,
    {
        self.marked.hooks.awake = Some(awake_hook::<T>);
        self
    }

    pub fn on_start(mut self) -> Self
    where
        T: AutoStart,
    {
        self.marked.hooks.start = Some(start_hook::<T>);
        self
    }

    pub fn on_destroy(mut self) -> Self
    where
        T: AutoDestroy,
    {
        self.marked.hooks.destroy = Some(destroy_hook::<T>);
        self
    }

    pub fn build(self) -> MarkedType {
        self.marked
    }
}
