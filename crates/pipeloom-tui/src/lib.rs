//! Terminal plumbing and rendering for the pipeline builder (ambient
//! stack). Deliberately does not own the event loop: interpreting
//! `Effect`s against the real collaborators, and the `rx.recv().await`
//! loop itself, belong to the binary crate (mirrors how `core-terminal`
//! stays a thin backend while `ox-bin` owns the loop).

mod input;
mod layout;
mod render;
mod terminal;

pub use input::CrosstermInputSource;
pub use layout::{compute as compute_layout, Panes};
pub use render::draw;
pub use terminal::{CrosstermBackend, TerminalBackend, TerminalGuard};
