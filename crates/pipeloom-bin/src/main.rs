//! Pipeline builder entrypoint.

use anyhow::{Context, Result};
use clap::Parser;
use pipeloom_collab::{ComponentStore, Composer, TagRegistry};
use pipeloom_controller::{BuilderController, Collaborators};
use pipeloom_events::{Effect, Event, EventSourceRegistry, TickEventSource, EVENT_CHANNEL_CAP};
use pipeloom_store::{
    FilesystemComponentStore, FilesystemPipelineStore, FilesystemTagRegistry, FuzzySearchEngine,
    HeuristicTokens, PlainComposer, SystemClipboard,
};
use pipeloom_tui::{CrosstermBackend, CrosstermInputSource};
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "pipeloom", version, about = "Pipeline builder TUI")]
struct Args {
    /// Pipeline to open at startup, relative to `--base-dir/pipelines` (e.g.
    /// `api-pipeline.yaml`). Omit to start the new-pipeline name prompt.
    pipeline: Option<String>,
    /// Root directory holding `components/` and `pipelines/`.
    #[arg(long = "base-dir", default_value = ".")]
    base_dir: PathBuf,
    /// Optional configuration file path (overrides discovery of `pipeloom.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn configure_logging() -> Result<Option<WorkerGuard>> {
    let log_dir = std::path::Path::new(".");
    let log_path = log_dir.join("pipeloom.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "pipeloom.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        Err(_err) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging()?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = pipeloom_config::load_from(args.config.clone())?;

    let components = FilesystemComponentStore::new(args.base_dir.clone());
    let pipelines = FilesystemPipelineStore::new(args.base_dir.clone());
    let composer = PlainComposer::new(args.base_dir.clone());
    let search = FuzzySearchEngine::new();
    let tags = FilesystemTagRegistry::new(args.base_dir.clone());
    let clipboard = SystemClipboard::new();
    let tokens = HeuristicTokens::default();

    let collab = Collaborators::new(
        Box::new(components),
        Box::new(pipelines),
        Box::new(composer),
        Box::new(search),
        Box::new(tags),
        Box::new(clipboard),
        Box::new(tokens),
    );

    let mut controller = BuilderController::new(collab, config.section_order(), 80);
    controller
        .init(args.pipeline.as_deref())
        .context("initializing builder controller")?;

    let mut backend = CrosstermBackend::new();
    backend.set_title("Pipeloom")?;
    let _guard = backend.enter_guard()?;

    let mut terminal = ratatui::Terminal::new(ratatui::backend::CrosstermBackend::new(std::io::stdout()))?;

    let (tx, mut rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::new(TICK_INTERVAL));
    registry.register(CrosstermInputSource);
    let source_handles = registry.spawn_all(&tx);

    terminal.draw(|frame| pipeloom_tui::draw(frame, &controller))?;

    while let Some(event) = rx.recv().await {
        if matches!(event, Event::Shutdown) {
            break;
        }
        let effect = controller.handle_event(event);
        if matches!(effect, Effect::Quit) {
            break;
        }
        if let Some(followup) =
            interpret_effect(effect, &args.base_dir, config.mermaid_command(), tx.clone()).await
        {
            let _ = controller.handle_event(followup);
        }
        terminal.draw(|frame| pipeloom_tui::draw(frame, &controller))?;
    }

    drop(tx);
    for handle in source_handles {
        let _ = handle.await;
    }

    Ok(())
}

/// Interprets a side effect the controller's dispatch asked for, against the
/// real collaborators, returning a follow-up `Event` to feed straight back
/// into the controller when the effect produces one (e.g.
/// `ComponentSaveResult`/`ExternalEditResult`). Builds fresh, cheap store
/// handles per call rather than sharing the controller's boxed,
/// private ones — this crate has no access to those, by design (see
/// `pipeloom-events`'s `Effect` doc comment).
async fn interpret_effect(
    effect: Effect,
    base_dir: &std::path::Path,
    mermaid_command: &str,
    tx: mpsc::Sender<Event>,
) -> Option<Event> {
    match effect {
        Effect::None => None,
        Effect::OpenExternalEditor { path } => {
            let bridge = pipeloom_editor_bridge::ExternalEditorBridge::new();
            let mut status = pipeloom_status::StatusBus::default();
            let mut guard = EditorTerminalHandle;
            let full_path = base_dir.join("components").join(&path);
            let result = bridge.open(&full_path, &mut guard, &mut status).map_err(|e| e.to_string());
            Some(Event::ExternalEditResult { path, result })
        }
        Effect::SaveComponentContent { path, content } => {
            let components = FilesystemComponentStore::new(base_dir.to_path_buf());
            let result = components.write(&path, &content).map_err(|e| e.to_string());
            Some(Event::ComponentSaveResult { path, result })
        }
        Effect::CleanupOrphanedTags { candidates } => {
            let base = base_dir.to_path_buf();
            let _ = tokio::task::spawn_blocking(move || {
                let registry = FilesystemTagRegistry::new(base);
                registry.cleanup_orphaned(&candidates);
            })
            .await;
            let _ = tx.send(Event::TagCleanupDone).await;
            None
        }
        Effect::WriteOutput { content, path } => {
            let composer = PlainComposer::new(base_dir.to_path_buf());
            if let Err(err) = composer.write_output(&content, &path) {
                error!(target: "runtime.output", error = %err, "failed to write pipeline output");
            }
            None
        }
        Effect::GenerateMermaidDiagram { content } => {
            let command = mermaid_command.to_string();
            let result = tokio::task::spawn_blocking(move || run_mermaid(&command, &content)).await;
            match result {
                Ok(Ok(())) => info!(target: "runtime.mermaid", "diagram generated"),
                Ok(Err(err)) => error!(target: "runtime.mermaid", error = %err, "mermaid generation failed"),
                Err(err) => error!(target: "runtime.mermaid", error = %err, "mermaid task panicked"),
            }
            None
        }
        Effect::Quit => None,
    }
}

fn run_mermaid(command: &str, content: &str) -> Result<()> {
    use std::io::Write;
    let mut parts = command.split_whitespace();
    let program = parts.next().context("empty mermaid command")?;
    let mut child = std::process::Command::new(program)
        .args(parts)
        .stdin(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {command}"))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(content.as_bytes())?;
    }
    let status = child.wait()?;
    if !status.success() {
        anyhow::bail!("{command} exited with {status}");
    }
    Ok(())
}

/// Suspends/resumes via the real terminal backend's enter/leave pair. Kept
/// as a unit struct rather than threading the `TerminalGuard` through: the
/// guard borrows the backend, and the backend already lives for the whole
/// process, so a fresh raw-mode toggle here is equivalent and avoids
/// juggling the guard's lifetime across the effect-interpretation boundary.
struct EditorTerminalHandle;

impl pipeloom_editor_bridge::TerminalSuspend for EditorTerminalHandle {
    fn suspend(&mut self) -> Result<()> {
        use crossterm::{cursor::Show, execute, terminal::{disable_raw_mode, LeaveAlternateScreen}};
        execute!(std::io::stdout(), LeaveAlternateScreen, Show)?;
        disable_raw_mode()?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        use crossterm::{cursor::Hide, execute, terminal::{enable_raw_mode, EnterAlternateScreen}};
        enable_raw_mode()?;
        execute!(std::io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(())
    }
}
