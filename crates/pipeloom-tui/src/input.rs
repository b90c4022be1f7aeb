//! Async crossterm input source (ambient, mirrors `core-input`'s
//! `EventStream`-backed task). Translates raw terminal events into
//! `pipeloom_events::Event` and feeds them into the runtime's single
//! channel; `pipeloom-keymap` does the actual key -> `Key` mapping, this
//! module only knows about crossterm and resize.

use crossterm::event::{Event as CEvent, EventStream, KeyEventKind};
use pipeloom_events::{AsyncEventSource, Event};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

pub struct CrosstermInputSource;

impl AsyncEventSource for CrosstermInputSource {
    fn name(&self) -> &'static str {
        "crossterm_input"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut stream = EventStream::new();
            loop {
                let next = tokio::select! {
                    event = stream.next() => event,
                    _ = tx.closed() => break,
                };
                let Some(Ok(event)) = next else { break };
                let mapped = match event {
                    CEvent::Key(key) => {
                        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            continue;
                        }
                        pipeloom_keymap::from_crossterm(key).map(Event::Input)
                    }
                    CEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
                    _ => None,
                };
                if let Some(event) = mapped {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_name_identifies_crossterm() {
        assert_eq!(CrosstermInputSource.name(), "crossterm_input");
    }
}
