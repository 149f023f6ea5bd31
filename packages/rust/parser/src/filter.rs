//! Target filtering of directive lines.

use literate_shared::{LiterateError, Result, Target};

use crate::classify::{ClassifiedLine, Inner, LineKind};

/// A line after target filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Markdown(&'a str),
    Code(&'a str),
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredLine<'a> {
    pub index: usize,
    pub line: Line<'a>,
}

/// Resolve directives for `target`.
///
/// Directives for the active target are kept under their inner kind,
/// directives for other targets are removed from the stream. Order is
/// preserved. A directive wrapping another directive is an error whatever
/// the target.
pub fn filter<'a>(lines: &[ClassifiedLine<'a>], target: Target) -> Result<Vec<FilteredLine<'a>>> {
    let mut out = Vec::with_capacity(lines.len());

    for classified in lines {
        let line = match classified.kind {
            LineKind::Markdown => Line::Markdown(classified.content),
            LineKind::Code => Line::Code(classified.content),
            LineKind::ChunkSplit => Line::Split,
            LineKind::Directive(outer, Inner::Nested(inner)) => {
                return Err(LiterateError::UnsupportedDirective {
                    line: classified.index + 1,
                    outer: outer.directive_token().to_string(),
                    inner: inner.directive_token().to_string(),
                });
            }
            LineKind::Directive(only, _) if only != target => continue,
            LineKind::Directive(_, Inner::Markdown) => Line::Markdown(classified.content),
            LineKind::Directive(_, Inner::Code) => Line::Code(classified.content),
            LineKind::Directive(_, Inner::ChunkSplit) => Line::Split,
        };

        out.push(FilteredLine {
            index: classified.index,
            line,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_lines;

    fn lines_for(source: &str, target: Target) -> Vec<Line<'_>> {
        let classified = classify_lines(source);
        filter(&classified, target)
            .expect("filter")
            .into_iter()
            .map(|l| l.line)
            .collect()
    }

    #[test]
    fn active_directive_is_kept_and_retagged() {
        let lines = lines_for("#md #' shown only in markdown", Target::Markdown);
        assert_eq!(lines, vec![Line::Markdown("shown only in markdown")]);
    }

    #[test]
    fn inactive_directive_is_dropped_not_blanked() {
        let source = "x = 1\n#md #' shown only in markdown\ny = 2";
        for target in [Target::Notebook, Target::Script] {
            assert_eq!(
                lines_for(source, target),
                vec![Line::Code("x = 1"), Line::Code("y = 2")]
            );
        }
    }

    #[test]
    fn plain_lines_pass_through_in_order() {
        let lines = lines_for("#' a\nx\n#-\ny", Target::Script);
        assert_eq!(
            lines,
            vec![Line::Markdown("a"), Line::Code("x"), Line::Split, Line::Code("y")]
        );
    }

    #[test]
    fn directive_split_only_for_its_target() {
        let source = "a\n#nb #-\nb";
        assert_eq!(
            lines_for(source, Target::Notebook),
            vec![Line::Code("a"), Line::Split, Line::Code("b")]
        );
        assert_eq!(
            lines_for(source, Target::Markdown),
            vec![Line::Code("a"), Line::Code("b")]
        );
    }

    #[test]
    fn source_indices_survive_dropped_lines() {
        let classified = classify_lines("#jl a\nb");
        let filtered = filter(&classified, Target::Markdown).expect("filter");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].index, 1);
    }

    #[test]
    fn nested_directive_is_rejected_for_every_target() {
        for target in Target::ALL {
            let classified = classify_lines("x\n#md #nb y");
            let err = filter(&classified, target).unwrap_err();
            match err {
                LiterateError::UnsupportedDirective { line, outer, inner } => {
                    assert_eq!(line, 2);
                    assert_eq!(outer, "#md");
                    assert_eq!(inner, "#nb");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
