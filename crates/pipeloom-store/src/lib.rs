//! Concrete, filesystem-backed implementations of every external
//! collaborator trait `pipeloom-collab` declares — storage, composition,
//! search, tags, clipboard, and token estimation, kept out of the core so
//! it never touches a filesystem or external process directly.
//!
//! Everything here is ordinary I/O plumbing — there is deliberately no
//! state machine in this crate. `pipeloom-bin` owns wiring these into a
//! `pipeloom_controller::Collaborators`.

mod clipboard;
mod component_store;
mod composer;
mod front_matter;
mod pipeline_store;
mod search;
mod tags;
mod tokens;

pub use clipboard::SystemClipboard;
pub use component_store::FilesystemComponentStore;
pub use composer::PlainComposer;
pub use pipeline_store::{ComponentRefFile, FilesystemPipelineStore, PipelineFile};
pub use search::FuzzySearchEngine;
pub use tags::FilesystemTagRegistry;
pub use tokens::HeuristicTokens;
