//! Example: startup of a small game runtime
//!
//! Demonstrates link-time discovery, trait aliases, the awake/start/destroy
//! lifecycle, field injection and a settings singleton persisted between
//! runs. Run it twice to see the saved high score restored.
//!
//! ```text
//! RUST_LOG=debug cargo run -p autocreate-core --example startup
//! ```

use autocreate_core::{
    auto_create, global, AutoAwake, AutoCreateConfig, AutoCreator, AutoDestroy, AutoResolve,
    AutoStart, FileStore, InventoryCatalog, SingletonSettings,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub trait Clock: Send + Sync {
    fn frame(&self) -> u64;
    fn advance(&self);
}

pub trait EventLog: Send + Sync {
    fn record(&self, event: &str);
    fn events(&self) -> Vec<String>;
}

#[auto_create(resolvable_as(dyn Clock), hooks(awake, destroy))]
#[derive(Default)]
pub struct FrameClock {
    frame: AtomicU64,
}

impl Clock for FrameClock {
    fn frame(&self) -> u64 {
        self.frame.load(Ordering::SeqCst)
    }

    fn advance(&self) {
        self.frame.fetch_add(1, Ordering::SeqCst);
    }
}

impl AutoAwake for FrameClock {
    fn auto_awake(&self) {
        self.frame.store(0, Ordering::SeqCst);
    }
}

impl AutoDestroy for FrameClock {
    fn auto_destroy(&self) {
        println!("clock stopped at frame {}", self.frame());
    }
}

#[auto_create(resolvable_as(dyn EventLog), hooks(start))]
#[derive(Default)]
pub struct MemoryLog {
    events: Mutex<Vec<String>>,
}

impl EventLog for MemoryLog {
    fn record(&self, event: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.to_string());
        }
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AutoStart for MemoryLog {
    fn auto_start(&self) {
        // Every instance is awake by now, so the clock is reachable
        let frame = global::as_singleton::<dyn Clock>().map(|clock| clock.frame());
        self.record(&format!("log started at frame {:?}", frame));
    }
}

#[auto_create(restore)]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HighScore {
    best: u64,
}

#[derive(Default, AutoResolve)]
struct GameLoop {
    #[auto_resolve]
    clock: Option<Arc<dyn Clock>>,
    #[auto_resolve]
    log: Option<Arc<dyn EventLog>>,
    #[auto_resolve]
    high_score: Option<Arc<HighScore>>,
}

fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(Layer::new().with_writer(std::io::stdout))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging()?;

    let config = AutoCreateConfig::new()
        .with_storage_root(std::env::temp_dir().join("autocreate-startup-demo"));

    global::install(AutoCreator::builder().with_config(config.clone()).build())
        .map_err(|_| "global auto-creator already installed")?;

    let guard = global::initialize()?;
    println!(
        "created {} instance(s), {} restored, {} singleton(s) without saved data",
        guard.report().created,
        guard.report().restored,
        guard.report().restore_absent.len()
    );

    let mut game = GameLoop::default();
    let report = global::resolve(&mut game);
    if !report.is_complete() {
        println!("unresolved fields: {:?}", report.missing);
    }

    if let (Some(clock), Some(log)) = (&game.clock, &game.log) {
        for _ in 0..3 {
            clock.advance();
        }
        log.record(&format!("ran until frame {}", clock.frame()));
        for event in log.events() {
            println!("event: {}", event);
        }
    }

    let previous = game.high_score.as_ref().map(|score| score.best).unwrap_or(0);
    println!("previous high score: {}", previous);

    // Persist a new high score for the next run through the settings tooling
    let bridge = Arc::new(FileStore::from_config(&config));
    let mut settings = SingletonSettings::load(&InventoryCatalog::new(), bridge, &config)?;
    settings.update::<HighScore>(|score| score.best = previous + 100);
    settings.save::<HighScore>()?;
    println!("saved high score: {}", previous + 100);

    drop(guard);
    Ok(())
}
