use std::fmt;

use crate::registry::InstanceTable;

/// Lifecycle phase dispatched over the distinct instances of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Awake,
    Start,
    Destroy,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Awake => write!(f, "awake"),
            LifecyclePhase::Start => write!(f, "start"),
            LifecyclePhase::Destroy => write!(f, "destroy"),
        }
    }
}

/// Invokes lifecycle hooks exactly once per distinct instance
pub struct LifecycleDispatcher;

impl LifecycleDispatcher {
    /// Run `phase` over every distinct instance of `table`.
    ///
    /// Awake and start follow first-registration order, destroy runs in
    /// reverse. Instances without the capability are skipped. Returns the
    /// number of hooks invoked.
    pub fn dispatch(table: &InstanceTable, phase: LifecyclePhase) -> usize {
        let distinct = table.distinct();
        let mut invoked = 0;

        let mut run = |index: usize| {
            let target = &distinct[index];
            if let Some(hook) = target.hooks.get(phase) {
                tracing::trace!("Invoking {} on '{}'", phase, target.concrete);
                hook(&*target.instance);
                invoked += 1;
            }
        };

        match phase {
            LifecyclePhase::Awake | LifecyclePhase::Start => (0..distinct.len()).for_each(&mut run),
            LifecyclePhase::Destroy => (0..distinct.len()).rev().for_each(&mut run),
        }

        tracing::debug!("Dispatched {} to {} instance(s)", phase, invoked);
        invoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{AutoAwake, AutoDestroy, AutoStart};
    use crate::registry::{Erased, InstanceEntry, MarkedType, TypeKey};
    use std::sync::{Arc, Mutex};

    static JOURNAL: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn record(event: String) {
        JOURNAL.lock().unwrap().push(event);
    }

    #[derive(Default)]
    struct First;
    #[derive(Default)]
    struct Second;
    #[derive(Default)]
    struct Silent;

    impl AutoAwake for First {
        fn auto_awake(&self) {
            record("awake:first".into());
        }
    }

    impl AutoStart for First {
        fn auto_start(&self) {
            record("start:first".into());
        }
    }

    impl AutoDestroy for First {
        fn auto_destroy(&self) {
            record("destroy:first".into());
        }
    }

    impl AutoAwake for Second {
        fn auto_awake(&self) {
            record("awake:second".into());
        }
    }

    impl AutoDestroy for Second {
        fn auto_destroy(&self) {
            record("destroy:second".into());
        }
    }

    fn insert<T: Send + Sync + 'static>(table: &mut InstanceTable, value: T, marked: MarkedType) {
        let instance = Arc::new(value);
        let erased: Erased = instance.clone();
        let entry = InstanceEntry::new(
            TypeKey::of::<T>(),
            TypeKey::of::<T>(),
            erased,
            Box::new(instance),
        );
        table.insert(entry, marked.hooks()).unwrap();
    }

    #[test]
    fn test_dispatch_order_and_counts() {
        let mut table = InstanceTable::new();
        insert(
            &mut table,
            First,
            MarkedType::constructed::<First>()
                .on_awake()
                .on_start()
                .on_destroy()
                .build(),
        );
        insert(
            &mut table,
            Second,
            MarkedType::constructed::<Second>()
                .on_awake()
                .on_destroy()
                .build(),
        );
        insert(&mut table, Silent, MarkedType::constructed::<Silent>().build());

        assert_eq!(LifecycleDispatcher::dispatch(&table, LifecyclePhase::Awake), 2);
        assert_eq!(LifecycleDispatcher::dispatch(&table, LifecyclePhase::Start), 1);
        assert_eq!(LifecycleDispatcher::dispatch(&table, LifecyclePhase::Destroy), 2);

        assert_eq!(
            *JOURNAL.lock().unwrap(),
            vec![
                "awake:first",
                "awake:second",
                "start:first",
                "destroy:second",
                "destroy:first",
            ]
        );
    }
}
