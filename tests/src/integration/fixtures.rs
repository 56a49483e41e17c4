//! Test components shared by the integration scenarios and benchmarks.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use component_manager::{Component, Descriptor, GracefulStop, Init, LifecycleContext, Start, Stop};
use parking_lot::Mutex;

/// Ordered record of hook calls, shared by every probe in a scenario.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Labels of the probes whose `hook` ran, in call order.
pub fn calls(journal: &Journal, hook: Hook) -> Vec<String> {
    let prefix = format!("{hook}:");
    journal
        .lock()
        .iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Init,
    Start,
    GracefulStop,
    Stop,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Init => write!(f, "init"),
            Hook::Start => write!(f, "start"),
            Hook::GracefulStop => write!(f, "graceful_stop"),
            Hook::Stop => write!(f, "stop"),
        }
    }
}

/// Implements every hook, journals each call and can be told to fail one.
pub struct Probe {
    label: &'static str,
    journal: Journal,
    fail_on: Option<Hook>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Probe {
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: Arc::clone(journal),
            fail_on: None,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn failing(mut self, hook: Hook) -> Self {
        self.fail_on = Some(hook);
        self
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn record(&self, hook: Hook) -> anyhow::Result<()> {
        self.journal.lock().push(format!("{hook}:{}", self.label));
        if self.fail_on == Some(hook) {
            anyhow::bail!("{} failed in {hook}", self.label);
        }
        Ok(())
    }
}

impl Component for Probe {
    fn name(&self) -> &str {
        self.label
    }

    fn describe(self: Arc<Self>, d: &mut Descriptor) {
        d.on_init(self.clone())
            .on_start(self.clone())
            .on_graceful_stop(self.clone())
            .on_stop(self);
    }
}

#[async_trait]
impl Init for Probe {
    async fn init(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
        self.record(Hook::Init)
    }
}

#[async_trait]
impl Start for Probe {
    async fn start(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
        self.record(Hook::Start)?;
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl GracefulStop for Probe {
    async fn graceful_stop(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
        self.record(Hook::GracefulStop)
    }
}

#[async_trait]
impl Stop for Probe {
    async fn stop(&self, _ctx: &LifecycleContext) -> anyhow::Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        self.record(Hook::Stop)
    }
}
