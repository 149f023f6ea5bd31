//! Chunk segmentation.
//!
//! Adjacent lines of the same kind are collected into one chunk. A kind
//! change or a split line closes the open chunk. Closed chunks are trimmed of
//! leading and trailing blank lines, and chunks left empty are dropped.
//!
//! Dropping a chunk can leave two chunks of the same kind next to each other.
//! Unless a split sits between them they are merged, keeping one blank line
//! at the seam, so same-kind neighbours only ever come from an explicit split.

use literate_shared::{Chunk, ChunkKind};

use crate::filter::{FilteredLine, Line};

/// Group filtered lines into chunks, in input order.
pub fn chunk(lines: &[FilteredLine<'_>]) -> Vec<Chunk> {
    let mut chunker = Chunker::default();

    for filtered in lines {
        match filtered.line {
            Line::Markdown(text) => chunker.push(ChunkKind::Markdown, text),
            Line::Code(text) => chunker.push(ChunkKind::Code, text),
            Line::Split => chunker.close(Boundary::Split),
        }
    }

    chunker.close(Boundary::End);
    chunker.chunks
}

/// What closed a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Split,
    KindChange,
    End,
}

#[derive(Default)]
struct Chunker {
    chunks: Vec<Chunk>,
    open: Option<Chunk>,
    /// The last emitted chunk has no split after it yet.
    joinable: bool,
}

impl Chunker {
    fn push(&mut self, kind: ChunkKind, text: &str) {
        if self.open.as_ref().is_some_and(|open| open.kind != kind) {
            self.close(Boundary::KindChange);
        }

        self.open
            .get_or_insert_with(|| Chunk::new(kind))
            .lines
            .push(text.to_string());
    }

    fn close(&mut self, boundary: Boundary) {
        if let Some(mut chunk) = self.open.take() {
            trim_blank_lines(&mut chunk.lines);
            if !chunk.lines.is_empty() {
                self.emit(chunk);
            }
        }

        if boundary == Boundary::Split {
            self.joinable = false;
        }
    }

    fn emit(&mut self, chunk: Chunk) {
        match self.chunks.last_mut() {
            Some(last) if self.joinable && last.kind == chunk.kind => {
                last.lines.push(String::new());
                last.lines.extend(chunk.lines);
            }
            _ => self.chunks.push(chunk),
        }
        self.joinable = true;
    }
}

/// Remove leading and trailing whitespace-only lines, keeping interior ones.
pub fn trim_blank_lines(lines: &mut Vec<String>) {
    let is_blank = |line: &String| line.trim().is_empty();

    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(0, |i| i + 1);
    lines.truncate(end);

    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    lines.drain(..start);
}
