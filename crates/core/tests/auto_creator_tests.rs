//! End-to-end tests against the process-wide auto-creator, with every type
//! discovered through `#[auto_create]` registrations in this binary.

use autocreate_core::{
    auto_create, find_marked_types, global, AutoAwake, AutoDestroy, AutoResolve, AutoStart,
    TypeKey,
};
use serial_test::serial;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[auto_create]
#[derive(Default)]
pub struct PlainService;

#[auto_create]
pub trait AbstractService: Send + Sync {}

const INITIALIZED_VALUE: i32 = 102;

#[auto_create]
pub struct ConstructedService {
    value: i32,
}

impl Default for ConstructedService {
    fn default() -> Self {
        Self {
            value: INITIALIZED_VALUE,
        }
    }
}

pub trait Locator: Send + Sync {
    fn locate(&self) -> &'static str;
}

#[auto_create(resolvable_as(dyn Locator))]
#[derive(Default)]
pub struct MapLocator;

impl Locator for MapLocator {
    fn locate(&self) -> &'static str {
        "map"
    }
}

pub trait Renderer: Send + Sync {}

#[auto_create(resolvable_as(dyn Renderer))]
#[derive(Default)]
pub struct ForwardRenderer;

impl Renderer for ForwardRenderer {}

#[auto_create(hooks(awake, start))]
#[derive(Default)]
pub struct Awakable {
    awake_flag: AtomicBool,
    flag_was_set_in_awake_first: AtomicBool,
    awake_calls: AtomicUsize,
    start_calls: AtomicUsize,
}

impl AutoAwake for Awakable {
    fn auto_awake(&self) {
        self.awake_flag.store(true, Ordering::SeqCst);
        self.awake_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl AutoStart for Awakable {
    fn auto_start(&self) {
        self.flag_was_set_in_awake_first
            .store(self.awake_flag.load(Ordering::SeqCst), Ordering::SeqCst);
        self.start_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub trait MultiAwake: Send + Sync {}

#[auto_create(resolvable_as(dyn MultiAwake), hooks(awake, start))]
#[derive(Default)]
pub struct MultiAwakable {
    awake_calls: AtomicUsize,
    start_calls: AtomicUsize,
}

impl MultiAwake for MultiAwakable {}

impl AutoAwake for MultiAwakable {
    fn auto_awake(&self) {
        self.awake_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl AutoStart for MultiAwakable {
    fn auto_start(&self) {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
    }
}

static DESTROY_COUNT: AtomicUsize = AtomicUsize::new(0);

#[auto_create(hooks(destroy))]
#[derive(Default)]
pub struct Destroyable {
    counting: AtomicBool,
}

impl AutoDestroy for Destroyable {
    fn auto_destroy(&self) {
        if self.counting.load(Ordering::SeqCst) {
            DESTROY_COUNT.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub trait MultiDestroy: Send + Sync {}

#[auto_create(resolvable_as(dyn MultiDestroy), hooks(destroy))]
#[derive(Default)]
pub struct MultiDestroyable {
    counting: AtomicBool,
}

impl MultiDestroy for MultiDestroyable {}

impl AutoDestroy for MultiDestroyable {
    fn auto_destroy(&self) {
        if self.counting.load(Ordering::SeqCst) {
            DESTROY_COUNT.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default, AutoResolve)]
struct Fixture {
    #[auto_resolve]
    plain: Option<Arc<PlainService>>,
    #[auto_resolve]
    constructed: Option<Arc<ConstructedService>>,
    #[auto_resolve]
    locator: Option<Arc<dyn Locator>>,
    #[auto_resolve]
    renderer: Option<Arc<dyn Renderer>>,
    #[auto_resolve]
    forward: Option<Arc<ForwardRenderer>>,
    #[auto_resolve]
    awakable: Option<Arc<Awakable>>,
    #[auto_resolve]
    multi_awake: Option<Arc<dyn MultiAwake>>,
    #[auto_resolve]
    multi_awakable: Option<Arc<MultiAwakable>>,
    #[auto_resolve]
    destroyable: Option<Arc<Destroyable>>,
    #[auto_resolve]
    multi_destroyable: Option<Arc<MultiDestroyable>>,
}

fn address<T: ?Sized>(instance: &Arc<T>) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

#[test]
#[serial]
fn types_with_auto_create_are_found() {
    let types = find_marked_types().unwrap();

    assert!(types
        .iter()
        .any(|marked| marked.key() == TypeKey::of::<PlainService>()));
    let abstract_service = types
        .iter()
        .find(|marked| marked.key() == TypeKey::of::<dyn AbstractService>())
        .unwrap();
    assert!(abstract_service.is_abstract());
}

#[test]
#[serial]
fn auto_creatables_are_instantiated() {
    let guard = global::initialize().unwrap();

    let instances = global::auto_creator().instances();
    assert!(instances
        .iter()
        .any(|instance| instance.downcast_ref::<PlainService>().is_some()));
    assert_eq!(guard.report().skipped_abstract, 1);
    assert!(global::as_singleton::<dyn AbstractService>().is_none());
}

#[test]
#[serial]
fn auto_created_types_are_resolvable() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();
    assert!(fixture.plain.is_none());

    let report = global::resolve(&mut fixture);

    assert!(report.is_complete());
    assert!(fixture.plain.is_some());
}

#[test]
#[serial]
fn resolvable_by_aliased_traits() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();

    global::resolve(&mut fixture);

    assert_eq!(fixture.locator.as_ref().unwrap().locate(), "map");
}

#[test]
#[serial]
fn invokes_default_constructor() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();

    global::resolve(&mut fixture);

    assert_eq!(fixture.constructed.unwrap().value, INITIALIZED_VALUE);
}

#[test]
#[serial]
fn different_resolved_types_point_to_same_object() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();

    global::resolve(&mut fixture);

    let renderer = fixture.renderer.unwrap();
    let forward = fixture.forward.unwrap();
    assert_eq!(address(&renderer), address(&forward));
}

#[test]
#[serial]
fn invokes_awake_and_start_once_in_order() {
    let _guard = global::initialize().unwrap();
    let awakable = global::as_singleton::<Awakable>().unwrap();

    assert_eq!(awakable.awake_calls.load(Ordering::SeqCst), 1);
    assert_eq!(awakable.start_calls.load(Ordering::SeqCst), 1);
    assert!(awakable.flag_was_set_in_awake_first.load(Ordering::SeqCst));
}

#[test]
#[serial]
fn alias_types_dont_invoke_awake_or_start_twice() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();
    global::resolve(&mut fixture);

    let multi = fixture.multi_awakable.unwrap();
    assert!(fixture.multi_awake.is_some());
    assert_eq!(multi.awake_calls.load(Ordering::SeqCst), 1);
    assert_eq!(multi.start_calls.load(Ordering::SeqCst), 1);
}

#[test]
#[serial]
fn invokes_destroy_once() {
    DESTROY_COUNT.store(0, Ordering::SeqCst);
    let guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();
    global::resolve(&mut fixture);

    let destroyable = fixture.destroyable.unwrap();
    destroyable.counting.store(true, Ordering::SeqCst);
    assert_eq!(DESTROY_COUNT.load(Ordering::SeqCst), 0);

    drop(guard);

    assert_eq!(DESTROY_COUNT.load(Ordering::SeqCst), 1);
    assert!(!global::auto_creator().is_initialized());
}

#[test]
#[serial]
fn alias_types_dont_invoke_destroy_twice() {
    DESTROY_COUNT.store(0, Ordering::SeqCst);
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();
    global::resolve(&mut fixture);

    fixture
        .multi_destroyable
        .unwrap()
        .counting
        .store(true, Ordering::SeqCst);

    global::reset().unwrap();
    global::reset().unwrap();

    assert_eq!(DESTROY_COUNT.load(Ordering::SeqCst), 1);
}

#[test]
#[serial]
fn resolving_again_keeps_the_same_instances() {
    let _guard = global::initialize().unwrap();
    let mut fixture = Fixture::default();

    global::resolve(&mut fixture);
    let first = fixture.plain.clone().unwrap();
    global::resolve(&mut fixture);

    assert!(Arc::ptr_eq(&first, fixture.plain.as_ref().unwrap()));
}

#[test]
#[serial]
fn only_the_initializing_guard_tears_down() {
    let first = global::initialize().unwrap();
    let second = global::initialize().unwrap();
    assert!(first.owns_reset());
    assert!(second.report().already_initialized);
    assert!(!second.owns_reset());

    drop(second);

    assert!(global::auto_creator().is_initialized());
    assert!(global::as_singleton::<PlainService>().is_some());

    drop(first);

    assert!(global::as_singleton::<PlainService>().is_none());
}
