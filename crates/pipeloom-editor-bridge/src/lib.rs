//! External-Editor Bridge.
//!
//! Shells out to whatever `$EDITOR` names, tolerating editors that take
//! flags in the environment variable itself (`EDITOR="code -w"`). The TUI
//! is suspended for the child's whole lifetime; the actual suspend/resume
//! mechanics are the terminal backend's (`pipeloom-tui`'s `TerminalGuard`),
//! which is why this crate only asks for a small trait rather than owning
//! a crossterm handle.

use anyhow::{anyhow, Context, Result};
use pipeloom_status::StatusBus;
use std::path::Path;
use std::process::Command;

/// Whatever leaves raw mode / the alternate screen for the child's
/// lifetime and restores it afterwards.
pub trait TerminalSuspend {
    fn suspend(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
}

pub struct ExternalEditorBridge;

impl Default for ExternalEditorBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalEditorBridge {
    pub fn new() -> Self {
        Self
    }

    fn editor_command(&self) -> Result<String> {
        std::env::var("EDITOR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("$EDITOR is not set"))
    }

    fn build_command(&self, editor: &str, path: &Path) -> Result<Command> {
        let mut parts = editor.split_whitespace();
        let program = parts.next().ok_or_else(|| anyhow!("$EDITOR is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(parts);
        cmd.arg(path);
        Ok(cmd)
    }

    /// Suspends `terminal`, runs `$EDITOR <path>` to completion with the
    /// terminal's own stdio, resumes, and posts before/after status
    /// banners. Catalog reload and preview refresh are the controller's
    /// job once this returns `Ok`.
    pub fn open(&self, path: &Path, terminal: &mut dyn TerminalSuspend, status: &mut StatusBus) -> Result<()> {
        let editor = self.editor_command()?;
        let mut cmd = self.build_command(&editor, path)?;

        status.post(pipeloom_status::StatusMessage::persistent(
            "Editing in external editor — save and close to continue",
        ));

        terminal.suspend().context("suspending terminal for external editor")?;
        let spawn_result = cmd.status();
        terminal.resume().context("resuming terminal after external editor")?;

        let exit_status = spawn_result.with_context(|| format!("running {editor}"))?;
        if !exit_status.success() {
            return Err(anyhow!("{editor} exited with {exit_status}"));
        }

        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        status.post(pipeloom_status::StatusMessage::ephemeral(format!(
            "Edited: {basename}"
        )));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    // Guards env::set_var("EDITOR", ..) across tests in this module; std::env
    // mutation is process-global and this crate's test binary runs them on
    // one thread by default, but be defensive anyway.
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    struct FakeTerminal {
        suspended: bool,
        resumed: bool,
    }

    impl TerminalSuspend for FakeTerminal {
        fn suspend(&mut self) -> Result<()> {
            self.suspended = true;
            Ok(())
        }
        fn resume(&mut self) -> Result<()> {
            self.resumed = true;
            Ok(())
        }
    }

    #[test]
    fn build_command_splits_flag_bearing_editor_strings() {
        let bridge = ExternalEditorBridge::new();
        let cmd = bridge
            .build_command("code -w", &PathBuf::from("/tmp/x.md"))
            .unwrap();
        assert_eq!(cmd.get_program(), "code");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["-w".to_string(), "/tmp/x.md".to_string()]);
    }

    #[test]
    fn missing_editor_env_var_is_an_error() {
        let _guard = env_lock().lock().unwrap();
        std::env::remove_var("EDITOR");
        let bridge = ExternalEditorBridge::new();
        assert!(bridge.editor_command().is_err());
    }

    #[test]
    fn open_suspends_and_resumes_the_terminal_around_the_child() {
        let _guard = env_lock().lock().unwrap();
        std::env::set_var("EDITOR", "true");
        let bridge = ExternalEditorBridge::new();
        let mut terminal = FakeTerminal { suspended: false, resumed: false };
        let mut status = StatusBus::default();
        let result = bridge.open(&PathBuf::from("/tmp/does-not-need-to-exist.md"), &mut terminal, &mut status);
        assert!(result.is_ok());
        assert!(terminal.suspended);
        assert!(terminal.resumed);
        assert_eq!(status.current().map(|m| m.text.clone()), Some("Edited: does-not-need-to-exist.md".to_string()));
        std::env::remove_var("EDITOR");
    }

    #[test]
    fn failing_child_surfaces_as_an_error_but_still_resumes() {
        let _guard = env_lock().lock().unwrap();
        std::env::set_var("EDITOR", "false");
        let bridge = ExternalEditorBridge::new();
        let mut terminal = FakeTerminal { suspended: false, resumed: false };
        let mut status = StatusBus::default();
        let result = bridge.open(&PathBuf::from("/tmp/whatever.md"), &mut terminal, &mut status);
        assert!(result.is_err());
        assert!(terminal.resumed);
        std::env::remove_var("EDITOR");
    }
}
