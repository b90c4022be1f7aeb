//! System-clipboard-backed `Clipboard`.

use anyhow::{anyhow, Result};
use pipeloom_collab::Clipboard;

#[derive(Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn write_all(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| anyhow!("opening system clipboard: {err}"))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| anyhow!("writing to system clipboard: {err}"))
    }
}
