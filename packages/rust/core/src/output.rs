//! Writing generated documents to disk.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use literate_shared::{LiterateError, Notebook, RenderedDocument, Result, Target};

/// Write `doc` to `<output_dir>/<name>.<ext>` and return the written path.
///
/// The output directory is created if needed. The file is written to a
/// temporary sibling first, then renamed into place.
#[instrument(skip(doc), fields(dir = %output_dir.display()))]
pub fn write_document(
    doc: &RenderedDocument,
    output_dir: &Path,
    name: &str,
    target: Target,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| LiterateError::io(output_dir, e))?;

    let content = match doc {
        RenderedDocument::Text(text) => ensure_trailing_newline(text),
        RenderedDocument::Notebook(nb) => notebook_json(nb)?,
    };

    let filename = format!("{name}.{}", target.extension());
    let path = output_dir.join(&filename);
    let temp = output_dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, &content).map_err(|e| LiterateError::io(&temp, e))?;
    std::fs::rename(&temp, &path).map_err(|e| LiterateError::io(&path, e))?;

    info!(path = %path.display(), size = content.len(), "wrote output");
    Ok(path)
}

/// Serialize a notebook the way Jupyter does: one-space indent, trailing newline.
pub fn notebook_json(nb: &Notebook) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    nb.serialize(&mut ser)
        .map_err(|e| LiterateError::Serialization(e.to_string()))?;

    let mut json =
        String::from_utf8(buf).map_err(|e| LiterateError::Serialization(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

/// Ensure the text ends with exactly one newline.
fn ensure_trailing_newline(text: &str) -> String {
    let trimmed = text.trim_end_matches('\n');
    format!("{trimmed}\n")
}

/// Output name for an input file: its file stem.
pub fn default_name(input: &Path) -> Result<String> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            LiterateError::config(format!(
                "cannot derive an output name from {}",
                input.display()
            ))
        })
}

/// Path of `file` relative to `dir`, with `/` separators.
///
/// Both paths are made absolute against the current directory first; no
/// symlinks are resolved.
pub fn relative_path(file: &Path, dir: &Path) -> Result<String> {
    let file = std::path::absolute(file).map_err(|e| LiterateError::io(file, e))?;
    let dir = std::path::absolute(dir).map_err(|e| LiterateError::io(dir, e))?;

    let file_parts = normalized(&file);
    let dir_parts = normalized(&dir);

    let common = file_parts
        .iter()
        .zip(&dir_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<String> = std::iter::repeat_n("..".to_string(), dir_parts.len() - common)
        .chain(file_parts[common..].iter().cloned())
        .collect();

    let rel = parts.join("/");
    debug!(rel, "computed relative path");
    Ok(rel)
}

/// Path components as strings with `.` dropped and `..` applied.
fn normalized(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir => {}
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    parts
}
