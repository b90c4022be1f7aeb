//! Bundles the boxed external-collaborator trait objects the
//! controller drives. Built once at startup from the concrete
//! `pipeloom-store` implementations and handed to `BuilderController::new`.

use pipeloom_collab::{
    Clipboard, Composer, ComponentStore, PipelineStore, SearchEngine, TagRegistry, Tokens,
};

pub struct Collaborators {
    pub components: Box<dyn ComponentStore>,
    pub pipelines: Box<dyn PipelineStore>,
    pub composer: Box<dyn Composer>,
    pub search: Box<dyn SearchEngine>,
    pub tags: Box<dyn TagRegistry>,
    pub clipboard: Box<dyn Clipboard>,
    pub tokens: Box<dyn Tokens>,
}

impl Collaborators {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        components: Box<dyn ComponentStore>,
        pipelines: Box<dyn PipelineStore>,
        composer: Box<dyn Composer>,
        search: Box<dyn SearchEngine>,
        tags: Box<dyn TagRegistry>,
        clipboard: Box<dyn Clipboard>,
        tokens: Box<dyn Tokens>,
    ) -> Self {
        Self {
            components,
            pipelines,
            composer,
            search,
            tags,
            clipboard,
            tokens,
        }
    }
}
