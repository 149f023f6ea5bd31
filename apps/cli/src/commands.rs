//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use literate_core::output::default_name;
use literate_core::pipeline::{GenerateJob, GenerateResult, Hooks, ProgressReporter};
use literate_core::{Executor, KernelBridge};
use literate_shared::{AppConfig, GenerateConfig, Target, init_config, load_config};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// literate: one annotated script, three outputs.
#[derive(Parser)]
#[command(
    name = "literate",
    version,
    about = "Generate markdown pages, Jupyter notebooks, and plain scripts from annotated source files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ./literate.toml or ~/.literate/literate.toml.
    #[arg(long, global = true, env = "LITERATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Options shared by every generate command.
#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Annotated source script.
    pub input: PathBuf,

    /// Output directory (defaults to `output_dir` from config).
    pub output_dir: Option<PathBuf>,

    /// Output name without extension (defaults to the input file stem).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Literal substitution applied to the source before parsing. Repeatable.
    #[arg(long, value_name = "FROM=TO", value_parser = parse_replacement)]
    pub replace: Vec<(String, String)>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a markdown page.
    Markdown {
        #[command(flatten)]
        args: GenerateArgs,

        /// Skip Documenter-specific output.
        #[arg(long)]
        no_documenter: bool,

        /// Opening and closing code fence.
        #[arg(long, num_args = 2, value_names = ["OPEN", "CLOSE"])]
        codefence: Option<Vec<String>>,
    },

    /// Generate a Jupyter notebook.
    Notebook {
        #[command(flatten)]
        args: GenerateArgs,

        /// Skip Documenter-specific output.
        #[arg(long)]
        no_documenter: bool,

        /// Write the notebook without executing it.
        #[arg(long)]
        no_execute: bool,
    },

    /// Generate a plain script with all prose removed.
    Script {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Parse a `FROM=TO` replacement pair.
fn parse_replacement(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, _)) if from.is_empty() => Err("replacement pattern must not be empty".into()),
        Some((from, to)) => Ok((from.to_string(), to.to_string())),
        None => Err(format!("expected FROM=TO, got '{s}'")),
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "literate=info",
        1 => "literate=debug",
        _ => "literate=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Markdown {
            args,
            no_documenter,
            codefence,
        } => {
            let codefence = match codefence.as_deref() {
                Some([open, close]) => Some((open.clone(), close.clone())),
                Some(_) => return Err(eyre!("--codefence takes exactly two values")),
                None => None,
            };
            cmd_generate(config_path, Target::Markdown, &args, |config| {
                if no_documenter {
                    config.documenter = false;
                }
                if codefence.is_some() {
                    config.codefence = codefence.clone();
                }
            })
        }
        Command::Notebook {
            args,
            no_documenter,
            no_execute,
        } => cmd_generate(config_path, Target::Notebook, &args, |config| {
            if no_documenter {
                config.documenter = false;
            }
            if no_execute {
                config.execute = false;
            }
        }),
        Command::Script { args } => cmd_generate(config_path, Target::Script, &args, |_| {}),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    config_path: Option<&Path>,
    target: Target,
    args: &GenerateArgs,
    overrides: impl FnOnce(&mut GenerateConfig),
) -> Result<()> {
    let app_config = load_config(config_path)?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => default_name(&args.input)?,
    };
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&app_config.defaults.output_dir));

    let mut config = GenerateConfig::from_app(&app_config, name);
    overrides(&mut config);

    let hooks = replacement_hooks(&args.replace);
    let bridge = kernel_bridge(&app_config, target, &config, &output_dir)?;

    info!(
        input = %args.input.display(),
        output = %target,
        name = %config.name,
        "generating"
    );

    let job = GenerateJob {
        input: args.input.clone(),
        output_dir,
        target,
        config,
    };

    let reporter = CliProgress::new();
    let result = literate_core::generate(
        &job,
        &hooks,
        bridge.as_ref().map(|b| b as &dyn Executor),
        &reporter,
    )?;

    println!(
        "Wrote {} ({:.2}s{})",
        result.path.display(),
        result.elapsed.as_secs_f64(),
        if result.executed { ", executed" } else { "" }
    );

    Ok(())
}

/// Preprocess hook applying `--replace` pairs in the order given.
fn replacement_hooks(replacements: &[(String, String)]) -> Hooks {
    if replacements.is_empty() {
        return Hooks::new();
    }

    let replacements = replacements.to_vec();
    Hooks::new().preprocess(move |text| {
        Ok(replacements
            .iter()
            .fold(text, |text, (from, to)| text.replace(from.as_str(), to)))
    })
}

/// The configured kernel bridge, when the notebook is going to be executed.
fn kernel_bridge(
    app_config: &AppConfig,
    target: Target,
    config: &GenerateConfig,
    output_dir: &Path,
) -> Result<Option<KernelBridge>> {
    if target != Target::Notebook || !config.execute {
        return Ok(None);
    }

    let Some(bridge) = KernelBridge::from_config(&app_config.kernel) else {
        warn!("no [kernel] command configured, notebook will not be executed");
        return Ok(None);
    };

    // Cells run relative to the output directory, which must exist first.
    std::fs::create_dir_all(output_dir)
        .map_err(|e| eyre!("cannot create output directory {}: {e}", output_dir.display()))?;

    Ok(Some(bridge.with_working_dir(output_dir)))
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = init_config(path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
