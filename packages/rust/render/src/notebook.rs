//! Notebook rendering.

use literate_shared::{
    Cell, Chunk, ChunkKind, GenerateConfig, KernelSpec, LanguageInfo, NBFORMAT, NBFORMAT_MINOR,
    Notebook, NotebookMetadata, RenderedDocument,
};

use crate::{Render, documenter};

/// One cell per chunk. Code cells are left unexecuted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotebookRenderer;

impl Render for NotebookRenderer {
    fn render(&self, chunks: &[Chunk], config: &GenerateConfig) -> RenderedDocument {
        RenderedDocument::Notebook(render_notebook(chunks, config))
    }
}

fn render_notebook(chunks: &[Chunk], config: &GenerateConfig) -> Notebook {
    let cells = chunks
        .iter()
        .map(|chunk| match chunk.kind {
            ChunkKind::Markdown if config.documenter => {
                Cell::markdown(documenter::run_pipeline(&chunk.content()))
            }
            ChunkKind::Markdown => Cell::markdown(chunk.content()),
            ChunkKind::Code => Cell::code(chunk.content()),
        })
        .collect();

    Notebook {
        cells,
        metadata: metadata(config),
        nbformat: NBFORMAT,
        nbformat_minor: NBFORMAT_MINOR,
    }
}

fn metadata(config: &GenerateConfig) -> NotebookMetadata {
    NotebookMetadata {
        kernelspec: KernelSpec {
            display_name: config.kernel_display_name.clone(),
            language: config.language.clone(),
            name: config.kernel_name.clone(),
        },
        language_info: LanguageInfo {
            file_extension: config.file_extension.clone(),
            mimetype: format!("application/{}", config.language),
            name: config.language.clone(),
        },
    }
}
