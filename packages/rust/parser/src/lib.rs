//! Source script parsing: line classification, target filtering, and chunking.
//!
//! The three stages are exposed separately so the pipeline driver can tag
//! failures with the step they came from; [`parse`] runs them back to back.

pub mod chunk;
pub mod classify;
pub mod filter;

use tracing::debug;

use literate_shared::{Chunk, Result, Target};

pub use chunk::{chunk, trim_blank_lines};
pub use classify::{ClassifiedLine, Inner, LineKind, MARKDOWN_TOKEN, SPLIT_TOKEN, classify, classify_lines};
pub use filter::{FilteredLine, Line, filter};

/// Classify, filter, and chunk `source` for `target`.
pub fn parse(source: &str, target: Target) -> Result<Vec<Chunk>> {
    let classified = classify_lines(source);
    let filtered = filter(&classified, target)?;
    let chunks = chunk(&filtered);

    debug!(
        output = %target,
        lines = classified.len(),
        kept = filtered.len(),
        chunks = chunks.len(),
        "parsed source"
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use literate_shared::ChunkKind;

    #[test]
    fn parse_respects_target_filtering() {
        let source = "#md #' only markdown\n#nb #' only notebook\nx = 1";

        let md = parse(source, Target::Markdown).expect("parse");
        assert_eq!(md[0].lines, vec!["only markdown"]);

        let nb = parse(source, Target::Notebook).expect("parse");
        assert_eq!(nb[0].lines, vec!["only notebook"]);

        let jl = parse(source, Target::Script).expect("parse");
        assert_eq!(jl.len(), 1);
        assert_eq!(jl[0].kind, ChunkKind::Code);
    }

    #[test]
    fn parse_surfaces_nested_directives() {
        assert!(parse("#jl #md x", Target::Script).is_err());
    }
}
