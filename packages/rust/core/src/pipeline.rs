//! The generation pipeline: source text → chunks → rendered document → file.
//!
//! [`run`] is the pure part: line ending normalization, preprocess hook,
//! classification, filtering, chunking, rendering, and postprocess hook.
//! [`generate`] wraps it with reading the input, optional notebook
//! execution, and writing the result.

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};

use literate_shared::{
    GenerateConfig, LiterateError, Notebook, RenderedDocument, Result, Step, Target,
};

use crate::execute::{Executor, execute_notebook};
use crate::output;

/// Error type returned by user hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A text-to-text hook.
pub type TextHook = Box<dyn Fn(String) -> std::result::Result<String, HookError> + Send + Sync>;

/// A notebook-to-notebook hook.
pub type NotebookHook =
    Box<dyn Fn(Notebook) -> std::result::Result<Notebook, HookError> + Send + Sync>;

/// User-supplied pre- and post-processing. Every hook defaults to identity.
#[derive(Default)]
pub struct Hooks {
    /// Applied to the source text after line ending normalization.
    pub preprocess: Option<TextHook>,
    /// Applied to markdown and script output.
    pub postprocess_text: Option<TextHook>,
    /// Applied to notebook output.
    pub postprocess_notebook: Option<NotebookHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> std::result::Result<String, HookError> + Send + Sync + 'static,
    {
        self.preprocess = Some(Box::new(f));
        self
    }

    pub fn postprocess_text<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> std::result::Result<String, HookError> + Send + Sync + 'static,
    {
        self.postprocess_text = Some(Box::new(f));
        self
    }

    pub fn postprocess_notebook<F>(mut self, f: F) -> Self
    where
        F: Fn(Notebook) -> std::result::Result<Notebook, HookError> + Send + Sync + 'static,
    {
        self.postprocess_notebook = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("preprocess", &self.preprocess.is_some())
            .field("postprocess_text", &self.postprocess_text.is_some())
            .field("postprocess_notebook", &self.postprocess_notebook.is_some())
            .finish()
    }
}

/// Replace CRLF line endings with LF.
pub fn normalize_line_endings(source: &str) -> String {
    source.replace("\r\n", "\n")
}

/// Run the pipeline on `source` for `target`.
///
/// 1. Normalize line endings
/// 2. Preprocess hook
/// 3. Classify lines
/// 4. Filter directives for `target`
/// 5. Chunk
/// 6. Render
/// 7. Postprocess hook
///
/// Errors are tagged with the step that raised them.
#[instrument(skip_all, fields(output = %target, name = %config.name))]
pub fn run(
    source: &str,
    target: Target,
    config: &GenerateConfig,
    hooks: &Hooks,
) -> Result<RenderedDocument> {
    let mut text = normalize_line_endings(source);

    if let Some(preprocess) = &hooks.preprocess {
        text = preprocess(text)
            .map_err(|e| LiterateError::hook("preprocess", e).at(Step::Preprocess))?;
    }

    // Classification and chunking are infallible; only filtering can fail.
    let chunks = literate_parser::parse(&text, target).map_err(|e| e.at(Step::Filter))?;

    let rendered = literate_render::render(target, &chunks, config);
    postprocess(rendered, hooks)
}

fn postprocess(rendered: RenderedDocument, hooks: &Hooks) -> Result<RenderedDocument> {
    let hook_err = |e: HookError| LiterateError::hook("postprocess", e).at(Step::Postprocess);

    match rendered {
        RenderedDocument::Text(text) => match &hooks.postprocess_text {
            Some(hook) => hook(text).map(RenderedDocument::Text).map_err(hook_err),
            None => Ok(RenderedDocument::Text(text)),
        },
        RenderedDocument::Notebook(nb) => match &hooks.postprocess_notebook {
            Some(hook) => hook(nb).map(RenderedDocument::Notebook).map_err(hook_err),
            None => Ok(RenderedDocument::Notebook(nb)),
        },
    }
}

// ---------------------------------------------------------------------------
// File-level generation
// ---------------------------------------------------------------------------

/// One file generation request.
#[derive(Debug, Clone)]
pub struct GenerateJob {
    /// Annotated source script.
    pub input: PathBuf,
    /// Directory the artifact is written to.
    pub output_dir: PathBuf,
    pub target: Target,
    pub config: GenerateConfig,
}

/// Result of a successful generation.
#[derive(Debug)]
pub struct GenerateResult {
    /// Path of the written artifact.
    pub path: PathBuf,
    pub target: Target,
    /// Whether notebook cells were executed.
    pub executed: bool,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the artifact has been written.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Read, run, optionally execute, and write one artifact.
///
/// With Documenter integration and no explicit `edit_url`, the input's
/// path relative to the output directory is used. Nothing is written when
/// any step fails.
#[instrument(skip_all, fields(input = %job.input.display(), output = %job.target))]
pub fn generate(
    job: &GenerateJob,
    hooks: &Hooks,
    executor: Option<&dyn Executor>,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    progress.phase("Reading source");
    let source = std::fs::read_to_string(&job.input)
        .map_err(|e| LiterateError::io(&job.input, e).at(Step::Read))?;

    let mut config = job.config.clone();
    if config.documenter && config.edit_url.is_none() {
        config.edit_url = Some(output::relative_path(&job.input, &job.output_dir)?);
    }

    progress.phase(&format!("Generating {}", job.target));
    let mut doc = run(&source, job.target, &config, hooks)?;

    let mut executed = false;
    if let RenderedDocument::Notebook(nb) = &mut doc {
        if config.execute {
            match executor {
                Some(executor) => {
                    progress.phase("Executing notebook");
                    execute_notebook(nb, executor).map_err(|e| e.at(Step::Execute))?;
                    executed = true;
                }
                None => warn!("notebook execution requested but no kernel is configured"),
            }
        }
    }

    progress.phase("Writing output");
    let path = output::write_document(&doc, &job.output_dir, &config.name, job.target)
        .map_err(|e| e.at(Step::Write))?;

    let result = GenerateResult {
        path,
        target: job.target,
        executed,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        path = %result.path.display(),
        executed,
        elapsed_ms = result.elapsed.as_millis(),
        "generation complete"
    );

    Ok(result)
}
