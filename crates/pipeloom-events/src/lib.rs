//! Event/effect channel plumbing (ambient stack).
//!
//! Mirrors the async-event-source design this workspace descends from: a
//! single bounded channel, one `Event` enum every producer feeds, and a
//! registry so background producers (the tick source, the async tag-cleanup
//! worker) can be spawned uniformly at startup.

use pipeloom_types::Key;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event consumed by the builder controller's single-threaded
/// dispatch loop: handlers run to completion, with no interleaving.
#[derive(Debug, Clone)]
pub enum Event {
    Input(Key),
    Resize(u16, u16),
    /// Periodic tick driving ephemeral status-message expiry.
    Tick,
    /// Delivered after the in-TUI content editor's save effect completes.
    ComponentSaveResult {
        path: PathBuf,
        result: Result<(), String>,
    },
    /// Delivered after the external-editor suspend/resume effect completes.
    ExternalEditResult {
        path: PathBuf,
        result: Result<(), String>,
    },
    /// The detached tag-registry cleanup finished. Feeds nothing back into
    /// the builder beyond a log line, but the event still exists so the
    /// runtime can observe the worker finished.
    TagCleanupDone,
    Shutdown,
}

/// A side effect an event handler asks the runtime to carry out, rather
/// than performing synchronously inline. Intentionally plain data: this
/// crate has no collaborator access, so the runtime (in
/// `pipeloom-bin`) is what interprets these against the real store/composer.
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    /// Suspend the TUI and hand `path` to `$EDITOR`.
    OpenExternalEditor { path: PathBuf },
    /// Persist `content` to `path` (the in-TUI content editor's save).
    SaveComponentContent { path: PathBuf, content: String },
    /// Run the registry-wide orphan sweep on a detached worker.
    CleanupOrphanedTags { candidates: Vec<String> },
    /// Compose and write the pipeline's generated output file.
    WriteOutput { content: String, path: PathBuf },
    /// Invoke the external mermaid command against the composed output.
    GenerateMermaidDiagram { content: String },
    /// Normal-mode `esc` with nothing to dismiss, or a confirmed exit:
    /// the runtime should tear down the terminal and return.
    Quit,
}

impl Default for Effect {
    fn default() -> Self {
        Effect::None
    }
}

/// Implemented by any background producer that pushes `Event`s into the
/// shared channel. Each source owns its task's lifecycle and must stop
/// promptly once the channel closes.
pub trait AsyncEventSource: Send + 'static {
    fn name(&self) -> &'static str;
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

#[derive(Default)]
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: AsyncEventSource>(&mut self, source: S) {
        self.sources.push(Box::new(source));
    }

    /// Spawns every registered source, each with its own cloned sender, and
    /// returns the join handles. Drains the registry so a second call spawns
    /// nothing.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.sources.len());
        for source in self.sources.drain(..) {
            let name = source.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            handles.push(source.spawn(tx.clone()));
        }
        handles
    }
}

/// Emits `Event::Tick` on a fixed interval, driving ephemeral status-message
/// expiry without the controller having to poll a clock itself.
pub struct TickEventSource {
    interval: Duration,
}

impl TickEventSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let interval_dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_dur);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).await.is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct MockOnceSource;
    impl AsyncEventSource for MockOnceSource {
        fn name(&self) -> &'static str {
            "mock_once"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            tokio::spawn(async move {
                let _ = tx.send(Event::Shutdown).await;
            })
        }
    }

    struct MockCloseSource {
        observed_close: Arc<AtomicBool>,
    }
    impl AsyncEventSource for MockCloseSource {
        fn name(&self) -> &'static str {
            "mock_close"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            let flag = self.observed_close;
            tokio::spawn(async move {
                tx.closed().await;
                flag.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn registry_spawns_all_sources_and_delivers_events() {
        let (tx, mut rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
        let mut registry = EventSourceRegistry::new();
        registry.register(MockOnceSource);
        registry.register(TickEventSource::new(Duration::from_millis(5)));

        let handles = registry.spawn_all(&tx);
        let mut got_shutdown = false;
        let mut got_tick = false;
        let deadline = tokio::time::Instant::now() + Duration::from_millis(200);
        while tokio::time::Instant::now() < deadline && !(got_shutdown && got_tick) {
            if let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(10), rx.recv()).await
            {
                match event {
                    Event::Shutdown => got_shutdown = true,
                    Event::Tick => got_tick = true,
                    _ => {}
                }
            }
        }
        assert!(got_shutdown);
        assert!(got_tick);

        drop(tx);
        drop(rx);
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_millis(50), handle).await;
        }
    }

    #[tokio::test]
    async fn sources_exit_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
        let mut registry = EventSourceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        registry.register(MockCloseSource {
            observed_close: flag.clone(),
        });
        let handles = registry.spawn_all(&tx);

        drop(tx);
        drop(rx);

        for handle in handles {
            tokio::time::timeout(Duration::from_millis(100), handle)
                .await
                .expect("source task should exit on channel close")
                .expect("source task should not panic");
        }
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn spawn_all_drains_registry_so_a_second_call_spawns_nothing() {
        let mut registry = EventSourceRegistry::new();
        registry.register(MockOnceSource);
        let (tx, _rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let first = rt.block_on(async { registry.spawn_all(&tx).len() });
        let second = rt.block_on(async { registry.spawn_all(&tx).len() });
        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }
}
