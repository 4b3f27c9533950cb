use autocreate_core::{auto_create, AutoAwake, AutoCreate, AutoDestroy, AutoStart, LifecyclePhase};

pub trait Scheduler: Send + Sync {
    fn pending(&self) -> usize;
}

pub trait Tickable: Send + Sync {
    fn tick(&self);
}

#[auto_create(resolvable_as(dyn Scheduler, dyn Tickable), hooks(awake, start, destroy))]
#[derive(Default)]
pub struct FrameScheduler;

impl Scheduler for FrameScheduler {
    fn pending(&self) -> usize {
        0
    }
}

impl Tickable for FrameScheduler {
    fn tick(&self) {}
}

impl AutoAwake for FrameScheduler {
    fn auto_awake(&self) {}
}

impl AutoStart for FrameScheduler {
    fn auto_start(&self) {}
}

impl AutoDestroy for FrameScheduler {
    fn auto_destroy(&self) {}
}

fn main() {
    let marked = FrameScheduler::descriptor();
    assert_eq!(marked.aliases().len(), 2);
    assert!(marked.hooks().get(LifecyclePhase::Awake).is_some());
    assert!(marked.hooks().get(LifecyclePhase::Start).is_some());
    assert!(marked.hooks().get(LifecyclePhase::Destroy).is_some());
}
