//! Markdown document rendering.

use literate_shared::{Chunk, ChunkKind, GenerateConfig, RenderedDocument};

use crate::Render;

/// Markdown chunks as-is, code chunks inside the configured code fence.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Render for MarkdownRenderer {
    fn render(&self, chunks: &[Chunk], config: &GenerateConfig) -> RenderedDocument {
        RenderedDocument::Text(render_markdown(chunks, config))
    }
}

fn render_markdown(chunks: &[Chunk], config: &GenerateConfig) -> String {
    let mut out = String::new();

    if config.documenter {
        if let Some(edit_url) = &config.edit_url {
            out.push_str(&meta_block(edit_url));
        }
    }

    let (open, close) = config.codefence();

    for chunk in chunks {
        match chunk.kind {
            ChunkKind::Markdown => push_lines(&mut out, &chunk.lines),
            ChunkKind::Code => {
                out.push_str(&open);
                out.push('\n');
                push_lines(&mut out, &chunk.lines);
                out.push_str(&close);
                out.push('\n');
            }
        }
        out.push('\n');
    }

    out
}

/// The `@meta` block pointing Documenter's edit link at the source file.
fn meta_block(edit_url: &str) -> String {
    format!("```@meta\nEditURL = \"{}\"\n```\n\n", edit_url.replace('"', "\\\""))
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}
