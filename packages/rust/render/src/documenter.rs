//! Documenter cleanup passes for notebook markdown cells.
//!
//! Each pass is a function `&str -> String` applied in sequence. Cross
//! references only Documenter understands are reduced to their text, and
//! Documenter math blocks become notebook-native equations.

use std::sync::LazyLock;

use regex::Regex;

/// Run every Documenter pass on one markdown cell.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = strip_cross_references(md);
    result = rewrite_math_blocks(&result);
    result
}

// ---------------------------------------------------------------------------
// Pass 1: Cross references
// ---------------------------------------------------------------------------

/// `[text](@ref)`, `[text](@ref target)` and `[text](@id target)` become `text`.
fn strip_cross_references(md: &str) -> String {
    static XREF_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[([^\]]*)\]\(@(?:ref|id)(?:\s[^)]*)?\)").expect("valid regex")
    });

    XREF_RE.replace_all(md, "${1}").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Math blocks
// ---------------------------------------------------------------------------

/// Rewrite fenced ```` ```math ```` blocks as `\begin{equation}` blocks.
fn rewrite_math_blocks(md: &str) -> String {
    static MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?ms)^```math[ \t]*\n(.*?)^```$").expect("valid regex")
    });

    MATH_RE
        .replace_all(md, "\\begin{equation}\n${1}\\end{equation}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bare_ref() {
        let input = "See [`Examples.markdown`](@ref) for details.";
        assert_eq!(
            strip_cross_references(input),
            "See `Examples.markdown` for details."
        );
    }

    #[test]
    fn strips_ref_and_id_with_arguments() {
        let input = "Go to [the syntax](@ref Syntax) or [here](@id filtering).";
        assert_eq!(strip_cross_references(input), "Go to the syntax or here.");
    }

    #[test]
    fn leaves_regular_links_alone() {
        let input = "[Julia](https://julialang.org) and [docs](@ref)";
        assert_eq!(
            strip_cross_references(input),
            "[Julia](https://julialang.org) and docs"
        );
    }

    #[test]
    fn rewrites_math_block() {
        let input = "Integral:\n```math\n\\int f dx\n```\nDone.";
        assert_eq!(
            rewrite_math_blocks(input),
            "Integral:\n\\begin{equation}\n\\int f dx\n\\end{equation}\nDone."
        );
    }

    #[test]
    fn math_block_keeps_first_line_indent() {
        let input = "```math\n  a \\\\\n  b\n```";
        assert_eq!(
            rewrite_math_blocks(input),
            "\\begin{equation}\n  a \\\\\n  b\n\\end{equation}"
        );

        let input = "```math  \n\nx\n```";
        assert_eq!(
            rewrite_math_blocks(input),
            "\\begin{equation}\n\nx\n\\end{equation}"
        );
    }

    #[test]
    fn leaves_other_fences_alone() {
        let input = "```julia\nx = 1\n```";
        assert_eq!(rewrite_math_blocks(input), input);
    }

    #[test]
    fn rewrites_multiple_math_blocks() {
        let input = "```math\na\n```\ntext\n```math\nb\n```";
        assert_eq!(
            rewrite_math_blocks(input),
            "\\begin{equation}\na\n\\end{equation}\ntext\n\\begin{equation}\nb\n\\end{equation}"
        );
    }

    #[test]
    fn full_pipeline() {
        let input = "See [f](@ref).\n```math\nx^2\n```";
        assert_eq!(
            run_pipeline(input),
            "See f.\n\\begin{equation}\nx^2\n\\end{equation}"
        );
    }
}
