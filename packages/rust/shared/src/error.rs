//! Error types for literate.
//!
//! Library crates use [`LiterateError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::fmt;
use std::path::PathBuf;

/// Pipeline steps, used to tag errors with where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Read,
    Preprocess,
    Filter,
    Postprocess,
    Execute,
    Write,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Preprocess => "preprocess",
            Self::Filter => "filter",
            Self::Postprocess => "postprocess",
            Self::Execute => "execute",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all literate operations.
#[derive(Debug, thiserror::Error)]
pub enum LiterateError {
    /// Output target name not recognized.
    #[error("invalid target '{0}': expected markdown, notebook, or script")]
    InvalidTarget(String),

    /// A user-supplied pre- or post-processing hook returned an error.
    #[error("{hook} hook failed: {message}")]
    Hook { hook: &'static str, message: String },

    /// A target-only directive wraps another target-only directive.
    #[error("line {line}: `{outer}` wraps `{inner}`, nested directives are not supported")]
    UnsupportedDirective {
        line: usize,
        outer: String,
        inner: String,
    },

    /// An error raised by a pipeline step, tagged with the step name.
    #[error("{step} step failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: Box<LiterateError>,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Notebook (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Notebook execution bridge error.
    #[error("execution error: {0}")]
    Execution(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LiterateError>;

impl LiterateError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a hook error, keeping only the hook's message.
    pub fn hook(hook: &'static str, err: impl fmt::Display) -> Self {
        Self::Hook {
            hook,
            message: err.to_string(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag this error with the pipeline step that produced it.
    ///
    /// Already-tagged errors keep their original step.
    pub fn at(self, step: Step) -> Self {
        match self {
            Self::Step { .. } => self,
            other => Self::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    /// The step this error was raised in, if it has been tagged.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The underlying error with any step tag removed.
    pub fn root(&self) -> &LiterateError {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
