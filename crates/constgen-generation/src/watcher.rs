//! Change watching
//!
//! The file system callback only raises a flag. All work happens on the
//! next scheduler tick: re-arming the watch when the configured path
//! changed, otherwise consuming the flag and triggering a run. Closely
//! spaced notifications within one tick interval collapse into a single
//! regeneration.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use constgen_storage::GeneratorItem;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::GenerationResult;
use crate::pipeline::GenerationPipeline;

/// Pending-change flag set by the notification callback, cleared by the tick handler
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag(Arc<AtomicBool>);

impl ChangeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Low-level change notification source
pub trait WatchBackend: Send {
    /// Start watching `path`, setting `flag` on every change
    fn watch(&mut self, path: &Path, flag: ChangeFlag) -> GenerationResult<()>;

    /// Tear down the current watch, if any
    fn unwatch(&mut self);
}

/// [`WatchBackend`] on top of `notify`
///
/// Watches the parent directory and filters by file name, so the watch
/// survives editors that replace the file and can be armed before the
/// file exists.
#[derive(Default)]
pub struct NotifyBackend {
    watcher: Option<RecommendedWatcher>,
}

impl NotifyBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, path: &Path, flag: ChangeFlag) -> GenerationResult<()> {
        self.unwatch();

        let Some(file_name) = path.file_name().map(|name| name.to_os_string()) else {
            warn!(path = %path.display(), "Watch path has no file name, not watching");
            return Ok(());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            warn!(dir = %dir.display(), "Watch directory does not exist, not watching");
            return Ok(());
        }

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name() == Some(file_name.as_os_str()))
                    {
                        flag.set();
                    }
                }
                Err(e) => {
                    tracing::error!("File watching error: {}", e);
                }
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!(path = %path.display(), "Watching for changes");
        self.watcher = Some(watcher);
        Ok(())
    }

    fn unwatch(&mut self) {
        if self.watcher.take().is_some() {
            debug!("Stopped previous watch");
        }
    }
}

/// What a scheduler tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// The tick interval has not elapsed yet
    NotDue,
    /// The watched path changed and the watch was re-armed
    Rearmed,
    /// A change was pending; the caller should regenerate
    Changed,
    /// Nothing to do
    Idle,
}

/// Debounced watcher state machine
pub struct ChangeWatcher<B: WatchBackend> {
    backend: B,
    tick_rate: Duration,
    last_watched_path: Option<PathBuf>,
    pending: ChangeFlag,
    next_tick: Option<Instant>,
}

impl<B: WatchBackend> ChangeWatcher<B> {
    pub fn new(backend: B, tick_rate: Duration) -> Self {
        Self {
            backend,
            tick_rate,
            last_watched_path: None,
            pending: ChangeFlag::new(),
            next_tick: None,
        }
    }

    /// Flag shared with the backend callback
    pub fn pending_flag(&self) -> ChangeFlag {
        self.pending.clone()
    }

    pub fn last_watched_path(&self) -> Option<&Path> {
        self.last_watched_path.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Advance the state machine
    ///
    /// A failed re-arm leaves the previous path recorded so the next due
    /// tick retries it.
    pub fn tick(&mut self, now: Instant, watched: Option<&Path>) -> GenerationResult<TickAction> {
        if let Some(next_tick) = self.next_tick {
            if now < next_tick {
                return Ok(TickAction::NotDue);
            }
        }
        self.next_tick = Some(now + self.tick_rate);

        if watched != self.last_watched_path.as_deref() {
            self.backend.unwatch();
            if let Some(path) = watched {
                self.backend.watch(path, self.pending.clone())?;
            }
            self.last_watched_path = watched.map(Path::to_path_buf);
            return Ok(TickAction::Rearmed);
        }

        if self.pending.take() {
            return Ok(TickAction::Changed);
        }

        Ok(TickAction::Idle)
    }
}

/// Scheduler loop feeding watcher ticks into the pipeline
pub struct WatchLoop<B: WatchBackend> {
    watcher: ChangeWatcher<B>,
    pipeline: GenerationPipeline,
    items: Vec<GeneratorItem>,
    filter: Option<Vec<String>>,
    path: watch::Receiver<Option<PathBuf>>,
    min_tick: Duration,
}

impl<B: WatchBackend> WatchLoop<B> {
    /// `path` carries the watched path; sending a new value re-arms on the next due tick
    pub fn new(
        watcher: ChangeWatcher<B>,
        pipeline: GenerationPipeline,
        items: Vec<GeneratorItem>,
        path: watch::Receiver<Option<PathBuf>>,
    ) -> Self {
        Self {
            watcher,
            pipeline,
            items,
            filter: None,
            path,
            min_tick: Duration::from_millis(100),
        }
    }

    /// Only regenerate these logic IDs on change
    pub fn with_filter(mut self, filter: Option<Vec<String>>) -> Self {
        self.filter = filter;
        self
    }

    /// Scheduler tick interval, at least one millisecond
    pub fn with_min_tick(mut self, min_tick: Duration) -> Self {
        self.min_tick = min_tick.max(Duration::from_millis(1));
        self
    }

    pub fn watcher(&self) -> &ChangeWatcher<B> {
        &self.watcher
    }

    /// One scheduler tick, returning whether a run was started
    pub fn tick_once(&mut self, now: Instant) -> bool {
        let watched = self.path.borrow().clone();
        match self.watcher.tick(now, watched.as_deref()) {
            Ok(TickAction::Changed) => {
                info!("Watched file changed, regenerating");
                match self.pipeline.trigger(self.items.clone(), self.filter.clone()) {
                    Some(_handle) => true,
                    None => {
                        debug!("Generation in progress, change dropped");
                        false
                    }
                }
            }
            Ok(_) => false,
            Err(e) => {
                error!(error = %e, "Failed to arm watch");
                false
            }
        }
    }

    /// Tick until `shutdown` completes
    pub async fn run<F>(mut self, shutdown: F) -> GenerationResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut interval = time::interval(self.min_tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick_once(Instant::now());
                }
                _ = &mut shutdown => {
                    info!("Watch loop shutting down");
                    break;
                }
            }
        }

        self.watcher.backend.unwatch();
        Ok(())
    }
}
