//! Pipeline orchestration for literate script conversion.
//!
//! This crate ties together parsing, rendering, notebook execution, and
//! output writing into the file-level `generate_*` workflows.

pub mod execute;
pub mod output;
pub mod pipeline;

use std::path::Path;

use literate_shared::{GenerateConfig, Result, Target};

pub use execute::{Executor, KernelBridge, execute_notebook};
pub use pipeline::{
    GenerateJob, GenerateResult, HookError, Hooks, NotebookHook, ProgressReporter,
    SilentProgress, TextHook, generate, run,
};

/// Generate `<output_dir>/<name>.md` from `input`.
pub fn generate_markdown(
    input: &Path,
    output_dir: &Path,
    config: &GenerateConfig,
    hooks: &Hooks,
) -> Result<GenerateResult> {
    generate_target(input, output_dir, Target::Markdown, config, hooks, None)
}

/// Generate `<output_dir>/<name>.ipynb` from `input`, executing it with
/// `executor` when `config.execute` is set.
pub fn generate_notebook(
    input: &Path,
    output_dir: &Path,
    config: &GenerateConfig,
    hooks: &Hooks,
    executor: Option<&dyn Executor>,
) -> Result<GenerateResult> {
    generate_target(input, output_dir, Target::Notebook, config, hooks, executor)
}

/// Generate `<output_dir>/<name>.jl` from `input`.
pub fn generate_script(
    input: &Path,
    output_dir: &Path,
    config: &GenerateConfig,
    hooks: &Hooks,
) -> Result<GenerateResult> {
    generate_target(input, output_dir, Target::Script, config, hooks, None)
}

fn generate_target(
    input: &Path,
    output_dir: &Path,
    target: Target,
    config: &GenerateConfig,
    hooks: &Hooks,
    executor: Option<&dyn Executor>,
) -> Result<GenerateResult> {
    let job = GenerateJob {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        target,
        config: config.clone(),
    };
    generate(&job, hooks, executor, &SilentProgress)
}
