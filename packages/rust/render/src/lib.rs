//! Chunk rendering for the three output targets.
//!
//! Each target has a [`Render`] implementation; [`render`] picks one from the
//! [`Target`]. Rendering is pure: no filesystem access and no execution.

mod documenter;
mod markdown;
mod notebook;
mod script;

use tracing::{debug, instrument};

use literate_shared::{Chunk, GenerateConfig, RenderedDocument, Target};

pub use markdown::MarkdownRenderer;
pub use notebook::NotebookRenderer;
pub use script::ScriptRenderer;

/// Turns a chunk sequence into a target-specific document.
pub trait Render {
    fn render(&self, chunks: &[Chunk], config: &GenerateConfig) -> RenderedDocument;
}

/// Render `chunks` with the renderer for `target`.
#[instrument(skip_all, fields(output = %target, chunks = chunks.len()))]
pub fn render(target: Target, chunks: &[Chunk], config: &GenerateConfig) -> RenderedDocument {
    let doc = match target {
        Target::Markdown => MarkdownRenderer.render(chunks, config),
        Target::Notebook => NotebookRenderer.render(chunks, config),
        Target::Script => ScriptRenderer.render(chunks, config),
    };

    match &doc {
        RenderedDocument::Text(text) => debug!(len = text.len(), "rendered text"),
        RenderedDocument::Notebook(nb) => debug!(cells = nb.cells.len(), "rendered notebook"),
    }

    doc
}
