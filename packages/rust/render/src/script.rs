//! Plain script rendering.

use literate_shared::{Chunk, ChunkKind, GenerateConfig, RenderedDocument};

use crate::Render;

/// Code chunks only, separated by one blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRenderer;

impl Render for ScriptRenderer {
    fn render(&self, chunks: &[Chunk], _config: &GenerateConfig) -> RenderedDocument {
        let code: Vec<String> = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Code)
            .map(Chunk::content)
            .collect();

        RenderedDocument::Text(code.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literate_shared::Target;

    fn script_for(source: &str) -> String {
        let chunks = literate_parser::parse(source, Target::Script).expect("parse");
        match ScriptRenderer.render(&chunks, &GenerateConfig::new("ex")) {
            RenderedDocument::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn title_code_split_example() {
        let out = script_for("#' # Title\nx = 1\ny = 2\n#-\nz = x + y");
        assert_eq!(out, "x = 1\ny = 2\n\nz = x + y");
    }

    #[test]
    fn markdown_is_discarded() {
        let out = script_for("#' only prose\n#' more prose");
        assert_eq!(out, "");
    }

    #[test]
    fn script_only_lines_render() {
        let out = script_for("#jl using Test\n#nb display(x)\nx = 1");
        assert_eq!(out, "using Test\nx = 1");
    }
}
