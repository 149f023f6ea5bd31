//! Line classification.
//!
//! Every line is tagged from its leading token, matched at column 0:
//! - `#md `, `#nb `, `#jl `: line only exists for one target
//! - `#-`: chunk split, rest of the line discarded
//! - `#'`: markdown
//! - anything else: code

use literate_shared::Target;

/// Marks a markdown line.
pub const MARKDOWN_TOKEN: &str = "#'";

/// Marks an explicit chunk boundary.
pub const SPLIT_TOKEN: &str = "#-";

/// What a line is before target filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Markdown,
    Code,
    ChunkSplit,
    /// Only kept for `Target`; the remainder of the line classifies as `Inner`.
    Directive(Target, Inner),
}

/// Classification of the text behind a directive token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inner {
    Markdown,
    Code,
    ChunkSplit,
    /// Another directive. Rejected by the filter.
    Nested(Target),
}

/// A classified line.
///
/// `content` is the text left once every recognized token is removed: the
/// directive token plus one space, then the markdown token plus one optional
/// space. Split lines have empty content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Zero-based line index in the (preprocessed) source.
    pub index: usize,
    pub kind: LineKind,
    pub content: &'a str,
}

/// Classify every line of `source`.
pub fn classify_lines(source: &str) -> Vec<ClassifiedLine<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let (kind, content) = classify(line);
            ClassifiedLine {
                index,
                kind,
                content,
            }
        })
        .collect()
}

/// Classify a single line, returning its kind and content.
pub fn classify(line: &str) -> (LineKind, &str) {
    if let Some((target, rest)) = strip_directive(line) {
        let (inner, content) = match strip_directive(rest) {
            Some((nested, _)) => (Inner::Nested(nested), rest),
            None => match classify_plain(rest) {
                (LineKind::Markdown, content) => (Inner::Markdown, content),
                (LineKind::ChunkSplit, content) => (Inner::ChunkSplit, content),
                (_, content) => (Inner::Code, content),
            },
        };
        return (LineKind::Directive(target, inner), content);
    }

    classify_plain(line)
}

/// Rules 2–4: split, markdown, code.
fn classify_plain(line: &str) -> (LineKind, &str) {
    if line.starts_with(SPLIT_TOKEN) {
        return (LineKind::ChunkSplit, "");
    }

    if let Some(rest) = line.strip_prefix(MARKDOWN_TOKEN) {
        return (LineKind::Markdown, rest.strip_prefix(' ').unwrap_or(rest));
    }

    (LineKind::Code, line)
}

/// Match a target directive token followed by a space or the end of the line.
fn strip_directive(line: &str) -> Option<(Target, &str)> {
    Target::ALL.into_iter().find_map(|target| {
        let rest = line.strip_prefix(target.directive_token())?;
        if rest.is_empty() {
            Some((target, rest))
        } else {
            rest.strip_prefix(' ').map(|rest| (target, rest))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_line_strips_token_and_one_space() {
        assert_eq!(classify("#' # Title"), (LineKind::Markdown, "# Title"));
        assert_eq!(classify("#'  indented"), (LineKind::Markdown, " indented"));
        assert_eq!(classify("#'"), (LineKind::Markdown, ""));
        assert_eq!(classify("#'no space"), (LineKind::Markdown, "no space"));
    }

    #[test]
    fn token_must_be_at_column_zero() {
        assert_eq!(classify("  #' not markdown"), (LineKind::Code, "  #' not markdown"));
        assert_eq!(classify(" #-"), (LineKind::Code, " #-"));
    }

    #[test]
    fn split_discards_rest_of_line() {
        assert_eq!(classify("#-"), (LineKind::ChunkSplit, ""));
        assert_eq!(classify("#-------------"), (LineKind::ChunkSplit, ""));
    }

    #[test]
    fn plain_comments_are_code() {
        assert_eq!(classify("# a comment"), (LineKind::Code, "# a comment"));
        assert_eq!(classify("x = 1"), (LineKind::Code, "x = 1"));
        assert_eq!(classify(""), (LineKind::Code, ""));
    }

    #[test]
    fn directive_wraps_markdown() {
        assert_eq!(
            classify("#md #' shown only in markdown"),
            (
                LineKind::Directive(Target::Markdown, Inner::Markdown),
                "shown only in markdown"
            )
        );
    }

    #[test]
    fn directive_wraps_code_and_split() {
        assert_eq!(
            classify("#nb using Plots"),
            (LineKind::Directive(Target::Notebook, Inner::Code), "using Plots")
        );
        assert_eq!(
            classify("#jl #-"),
            (LineKind::Directive(Target::Script, Inner::ChunkSplit), "")
        );
        assert_eq!(
            classify("#md"),
            (LineKind::Directive(Target::Markdown, Inner::Code), "")
        );
    }

    #[test]
    fn directive_requires_delimiter() {
        assert_eq!(classify("#mdx = 1"), (LineKind::Code, "#mdx = 1"));
        assert_eq!(classify("#nbsp"), (LineKind::Code, "#nbsp"));
    }

    #[test]
    fn nested_directive_is_flagged() {
        assert_eq!(
            classify("#md #nb x = 1"),
            (
                LineKind::Directive(Target::Markdown, Inner::Nested(Target::Notebook)),
                "#nb x = 1"
            )
        );
    }

    #[test]
    fn classify_lines_keeps_indices() {
        let lines = classify_lines("#' a\nx = 1\n#-\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].index, 1);
        assert_eq!(lines[2].kind, LineKind::ChunkSplit);
    }
}
