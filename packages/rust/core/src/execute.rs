//! Notebook execution.
//!
//! Execution is delegated to an [`Executor`]. [`KernelBridge`] is the stock
//! one: it spawns a bridge subprocess and talks to it over a JSON-lines
//! stdin/stdout protocol.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use literate_shared::{Cell, KernelConfig, LiterateError, Notebook, Result};

/// Runs notebook code cells and returns their outputs.
pub trait Executor {
    /// Execute `sources` in order. Returns one output list per source.
    fn execute(&self, sources: &[String]) -> Result<Vec<Vec<Value>>>;
}

/// Execute every code cell of `notebook` and attach the outputs.
///
/// The executor is called once with all code cells. Execution counts are
/// numbered from 1 in cell order.
#[instrument(skip_all, fields(cells = notebook.cells.len()))]
pub fn execute_notebook(notebook: &mut Notebook, executor: &dyn Executor) -> Result<()> {
    let sources: Vec<String> = notebook
        .cells
        .iter()
        .filter_map(|cell| match cell {
            Cell::Code { source, .. } => Some(source.clone()),
            Cell::Markdown { .. } => None,
        })
        .collect();

    if sources.is_empty() {
        debug!("no code cells to execute");
        return Ok(());
    }

    let results = executor.execute(&sources)?;
    if results.len() != sources.len() {
        return Err(LiterateError::Execution(format!(
            "executor returned outputs for {} cells, expected {}",
            results.len(),
            sources.len()
        )));
    }

    let code_cells = notebook.cells.iter_mut().filter_map(|cell| match cell {
        Cell::Code {
            execution_count,
            outputs,
            ..
        } => Some((execution_count, outputs)),
        Cell::Markdown { .. } => None,
    });

    for (count, ((execution_count, outputs), result)) in
        (1u32..).zip(code_cells.zip(results))
    {
        *execution_count = Some(count);
        *outputs = result;
    }

    info!(executed = sources.len(), "notebook executed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

/// Request message sent to the bridge.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestMessage<'a> {
    Execute { cells: &'a [String] },
    Shutdown,
}

/// Response message received from the bridge.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseMessage {
    Ready,
    Result { outputs: Vec<Vec<Value>> },
    Error { error: String },
}

// ---------------------------------------------------------------------------
// Kernel bridge
// ---------------------------------------------------------------------------

/// Executes cells through an external bridge process.
///
/// The bridge prints `{"type":"ready"}` once started, answers one
/// `{"type":"execute","cells":[...]}` request with
/// `{"type":"result","outputs":[[...], ...]}` or `{"type":"error","error":"..."}`,
/// and exits on `{"type":"shutdown"}`.
#[derive(Debug, Clone)]
pub struct KernelBridge {
    /// Executable to spawn.
    pub command: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Working directory for the subprocess; inherits ours when `None`.
    pub working_dir: Option<PathBuf>,
}

impl KernelBridge {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            working_dir: None,
        }
    }

    /// A bridge for the `[kernel]` config section, if a command is set.
    pub fn from_config(config: &KernelConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|command| Self::new(command.clone(), config.args.clone()))
    }

    /// Run cells relative to `dir`, typically the output directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl Executor for KernelBridge {
    fn execute(&self, sources: &[String]) -> Result<Vec<Vec<Value>>> {
        let mut handle = BridgeHandle::spawn(self)?;
        let result = handle.send_cells(sources);
        handle.shutdown();
        result
    }
}

/// Handle to a spawned bridge subprocess.
struct BridgeHandle {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl BridgeHandle {
    /// Spawn the bridge and wait for its ready message.
    fn spawn(bridge: &KernelBridge) -> Result<Self> {
        info!(cmd = %bridge.command, args = ?bridge.args, "spawning kernel bridge");

        let mut command = Command::new(&bridge.command);
        command
            .args(&bridge.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit()); // Bridge logs go to parent stderr
        if let Some(dir) = &bridge.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            LiterateError::Execution(format!(
                "failed to spawn bridge: {e}. Is `{}` installed?",
                bridge.command
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LiterateError::Execution("failed to capture bridge stdin".into()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LiterateError::Execution("failed to capture bridge stdout".into()))?;

        let mut handle = Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
        };

        match handle.read_message() {
            Ok(ResponseMessage::Ready) => {
                debug!("bridge is ready");
                Ok(handle)
            }
            Ok(other) => {
                handle.shutdown();
                Err(LiterateError::Execution(format!(
                    "expected ready message, got: {other:?}"
                )))
            }
            Err(e) => {
                handle.shutdown();
                Err(e)
            }
        }
    }

    /// Send all cells and wait for their outputs.
    fn send_cells(&mut self, cells: &[String]) -> Result<Vec<Vec<Value>>> {
        self.write_message(&RequestMessage::Execute { cells })?;

        match self.read_message()? {
            ResponseMessage::Result { outputs } => Ok(outputs),
            ResponseMessage::Error { error } => Err(LiterateError::Execution(error)),
            ResponseMessage::Ready => Err(LiterateError::Execution(
                "unexpected ready message during execution".into(),
            )),
        }
    }

    fn write_message(&mut self, msg: &RequestMessage<'_>) -> Result<()> {
        let json = serde_json::to_string(msg).map_err(|e| {
            LiterateError::Execution(format!("failed to serialize request: {e}"))
        })?;

        writeln!(self.stdin, "{json}").map_err(|e| {
            LiterateError::Execution(format!("failed to write to bridge stdin: {e}"))
        })?;
        self.stdin.flush().map_err(|e| {
            LiterateError::Execution(format!("failed to flush bridge stdin: {e}"))
        })
    }

    fn read_message(&mut self) -> Result<ResponseMessage> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| LiterateError::Execution(format!("bridge read error: {e}")))?;

        if line.is_empty() {
            return Err(LiterateError::Execution(
                "bridge closed stdout unexpectedly".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| {
            let preview: String = line.trim_end().chars().take(200).collect();
            LiterateError::Execution(format!("invalid bridge message: {e} (got: {preview})"))
        })
    }

    /// Send shutdown, close stdin, and wait for the bridge to exit.
    fn shutdown(mut self) {
        let _ = self.write_message(&RequestMessage::Shutdown);

        let Self {
            mut child, stdin, ..
        } = self;
        drop(stdin);

        match child.wait() {
            Ok(status) => debug!(?status, "bridge exited"),
            Err(e) => warn!("bridge wait error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as CallCount;

    use literate_shared::{GenerateConfig, RenderedDocument, Target};
    use serde_json::json;

    use super::*;

    /// Echoes each source back as a stream output.
    struct EchoExecutor {
        calls: CallCount<usize>,
    }

    impl EchoExecutor {
        fn new() -> Self {
            Self {
                calls: CallCount::new(0),
            }
        }
    }

    impl Executor for EchoExecutor {
        fn execute(&self, sources: &[String]) -> Result<Vec<Vec<Value>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(sources
                .iter()
                .map(|s| vec![json!({"output_type": "stream", "name": "stdout", "text": s})])
                .collect())
        }
    }

    struct ShortExecutor;

    impl Executor for ShortExecutor {
        fn execute(&self, _sources: &[String]) -> Result<Vec<Vec<Value>>> {
            Ok(vec![])
        }
    }

    fn sample_notebook() -> Notebook {
        let source = "#' # Title\nx = 1\n#' more\ny = 2";
        let chunks = literate_parser::parse(source, Target::Notebook).expect("parse");
        match literate_render::render(Target::Notebook, &chunks, &GenerateConfig::new("ex")) {
            RenderedDocument::Notebook(nb) => nb,
            other => panic!("expected notebook, got {other:?}"),
        }
    }

    #[test]
    fn outputs_attached_to_code_cells_in_order() {
        let mut nb = sample_notebook();
        let executor = EchoExecutor::new();
        execute_notebook(&mut nb, &executor).expect("execute");

        assert_eq!(executor.calls.get(), 1);
        match &nb.cells[3] {
            Cell::Code {
                execution_count,
                outputs,
                ..
            } => {
                assert_eq!(*execution_count, Some(2));
                assert_eq!(outputs[0]["text"], "y = 2");
            }
            other => panic!("expected code cell, got {other:?}"),
        }
        assert_eq!(nb.cells[0], Cell::markdown("# Title"));
    }

    #[test]
    fn executor_not_called_without_code_cells() {
        let mut nb = sample_notebook();
        nb.cells.retain(|c| matches!(c, Cell::Markdown { .. }));
        let executor = EchoExecutor::new();
        execute_notebook(&mut nb, &executor).expect("execute");
        assert_eq!(executor.calls.get(), 0);
    }

    #[test]
    fn output_count_mismatch_is_an_error() {
        let mut nb = sample_notebook();
        let err = execute_notebook(&mut nb, &ShortExecutor).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn bridge_from_config_requires_command() {
        assert!(KernelBridge::from_config(&KernelConfig::default()).is_none());

        let config = KernelConfig {
            command: Some("julia".into()),
            args: vec!["bridge.jl".into()],
        };
        let bridge = KernelBridge::from_config(&config).expect("bridge");
        assert_eq!(bridge.command, "julia");
        assert_eq!(bridge.args, vec!["bridge.jl"]);
    }

    #[test]
    fn missing_bridge_command_fails_cleanly() {
        let bridge = KernelBridge::new("literate-no-such-bridge-binary", vec![]);
        let err = bridge.execute(&["x = 1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("failed to spawn bridge"));
    }

    #[cfg(unix)]
    #[test]
    fn bridge_speaks_json_lines() {
        let script = r#"echo '{"type":"ready"}'
read request
echo '{"type":"result","outputs":[[{"output_type":"stream","name":"stdout","text":"1"}]]}'
read shutdown"#;
        let bridge = KernelBridge::new("sh", vec!["-c".into(), script.into()]);

        let outputs = bridge.execute(&["x = 1".to_string()]).expect("execute");
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0][0]["text"], "1");
    }

    #[cfg(unix)]
    #[test]
    fn bridge_error_message_is_surfaced() {
        let script = r#"echo '{"type":"ready"}'
read request
echo '{"type":"error","error":"UndefVarError: x not defined"}'
read shutdown"#;
        let bridge = KernelBridge::new("sh", vec!["-c".into(), script.into()]);

        let err = bridge.execute(&["x".to_string()]).unwrap_err();
        assert!(matches!(err, LiterateError::Execution(ref m) if m.contains("UndefVarError")));
    }

    #[cfg(unix)]
    #[test]
    fn garbled_startup_line_with_multibyte_text_is_an_error() {
        let script = format!("echo '{}é trailing'\nread shutdown", "x".repeat(199));
        let bridge = KernelBridge::new("sh", vec!["-c".into(), script]);

        let err = bridge.execute(&["x = 1".to_string()]).unwrap_err();
        match err {
            LiterateError::Execution(message) => {
                assert!(message.contains("invalid bridge message"));
                assert!(message.contains(&"x".repeat(199)));
                assert!(!message.contains("é trailing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn bridge_not_ready_is_shut_down() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("exited");
        let script = format!(
            "echo '{{\"type\":\"result\",\"outputs\":[]}}'\nread shutdown\ntouch '{}'",
            marker.display()
        );
        let bridge = KernelBridge::new("sh", vec!["-c".into(), script]);

        let err = bridge.execute(&["x = 1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("expected ready message"));
        // The bridge was waited on, so its last command has already run.
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn bridge_closing_before_ready_is_reaped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("exited");
        let script = format!("exec 1>&-\nread shutdown\ntouch '{}'", marker.display());
        let bridge = KernelBridge::new("sh", vec!["-c".into(), script]);

        let err = bridge.execute(&["x = 1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("closed stdout"));
        assert!(marker.exists());
    }
}
