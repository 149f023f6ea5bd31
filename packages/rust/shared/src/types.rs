//! Core domain types: output targets, chunks, and the notebook document model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LiterateError;

/// Notebook format version written into every generated notebook.
pub const NBFORMAT: u32 = 4;
/// Notebook format minor version.
pub const NBFORMAT_MINOR: u32 = 2;

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// The output artifact a pipeline run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A markdown document.
    Markdown,
    /// An interactive notebook.
    Notebook,
    /// A plain script with all markdown removed.
    Script,
}

impl Target {
    /// All targets, in the order they are usually generated.
    pub const ALL: [Target; 3] = [Target::Markdown, Target::Notebook, Target::Script];

    /// File extension (without the dot) of the artifact written for this target.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Notebook => "ipynb",
            Self::Script => "jl",
        }
    }

    /// The directive token that restricts a line to this target.
    pub fn directive_token(&self) -> &'static str {
        match self {
            Self::Markdown => "#md",
            Self::Notebook => "#nb",
            Self::Script => "#jl",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Notebook => "notebook",
            Self::Script => "script",
        };
        f.write_str(name)
    }
}

impl FromStr for Target {
    type Err = LiterateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "notebook" | "nb" | "ipynb" => Ok(Self::Notebook),
            "script" | "jl" => Ok(Self::Script),
            _ => Err(LiterateError::InvalidTarget(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

/// What a chunk holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Markdown,
    Code,
}

/// A maximal run of same-kind lines, with directive and markdown tokens removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub lines: Vec<String>,
}

impl Chunk {
    pub fn new(kind: ChunkKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    /// The chunk content with lines joined by `\n` (no trailing newline).
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Rendered output
// ---------------------------------------------------------------------------

/// The output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedDocument {
    /// Markdown or script output.
    Text(String),
    /// Notebook output, serialized later by the writer.
    Notebook(Notebook),
}

impl RenderedDocument {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Notebook(_) => None,
        }
    }

    pub fn as_notebook(&self) -> Option<&Notebook> {
        match self {
            Self::Notebook(nb) => Some(nb),
            Self::Text(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Notebook (nbformat 4 subset)
// ---------------------------------------------------------------------------

/// A notebook document in the nbformat 4 layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

/// A single notebook cell.
///
/// Fields are declared in alphabetical order so serialized cells match what
/// Jupyter itself writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        #[serde(default)]
        metadata: serde_json::Map<String, serde_json::Value>,
        #[serde(with = "multiline")]
        source: String,
    },
    Code {
        execution_count: Option<u32>,
        #[serde(default)]
        metadata: serde_json::Map<String, serde_json::Value>,
        #[serde(default)]
        outputs: Vec<serde_json::Value>,
        #[serde(with = "multiline")]
        source: String,
    },
}

impl Cell {
    pub fn markdown(source: impl Into<String>) -> Self {
        Self::Markdown {
            metadata: serde_json::Map::new(),
            source: source.into(),
        }
    }

    /// A code cell with no outputs and no execution count.
    pub fn code(source: impl Into<String>) -> Self {
        Self::Code {
            execution_count: None,
            metadata: serde_json::Map::new(),
            outputs: Vec::new(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ChunkKind {
        match self {
            Self::Markdown { .. } => ChunkKind::Markdown,
            Self::Code { .. } => ChunkKind::Code,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Markdown { source, .. } | Self::Code { source, .. } => source,
        }
    }
}

/// Notebook-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub file_extension: String,
    pub mimetype: String,
    pub name: String,
}

/// Cell sources are stored as one string but serialized as a list of lines,
/// every line but the last keeping its `\n`.
mod multiline {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(source: &str, serializer: S) -> Result<S::Ok, S::Error> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        lines.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Source {
            Text(String),
            Lines(Vec<String>),
        }

        Ok(match Source::deserialize(deserializer)? {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        })
    }
}
