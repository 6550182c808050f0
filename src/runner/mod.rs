// file: src/runner/mod.rs
// version: 1.1.0
// guid: dbc66a73-d1c7-4f89-ab8c-80bc8fff0a97

//! External command execution
//!
//! Runs one external program to completion, streaming stdout and stderr
//! through independent drain tasks so neither pipe can fill up and stall the
//! child, and returns everything it printed as a [`CommandResult`]. Expected
//! failures (missing binary, non-zero exit, timeout) are values, not errors.

pub mod classifier;
pub mod sink;

pub use classifier::{classify, MarkerRule, MarkerSeverity, Outcome, OutcomeKind};
pub use sink::{ConsoleSink, LineSink, NullSink};

use std::fmt;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Exit code reserved for failures of the runner itself
pub const RUNNER_FAILURE_CODE: i32 = -1;

/// How long to keep reading pipes once the child has exited or been killed
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Lines collected by a drain task, readable even if the task is aborted
type SharedLines = Arc<Mutex<Vec<String>>>;

fn lock(lines: &SharedLines) -> MutexGuard<'_, Vec<String>> {
    lines.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Which output channel a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// An executable and its arguments, passed to the OS without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Everything a finished command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    exit_code: i32,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl CommandResult {
    pub fn new(exit_code: i32, stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Build a result from raw text, one line per `\n`
    pub fn from_text(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let split = |text: &str| text.lines().map(str::to_string).collect();
        Self::new(exit_code, split(stdout), split(stderr))
    }

    /// The process could not be launched at all
    pub fn start_failure(spec: &CommandSpec, err: &std::io::Error) -> Self {
        Self::new(
            RUNNER_FAILURE_CODE,
            Vec::new(),
            vec![format!("failed to start '{}': {}", spec.program(), err)],
        )
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn is_runner_failure(&self) -> bool {
        self.exit_code == RUNNER_FAILURE_CODE
    }

    pub fn stdout_lines(&self) -> &[String] {
        &self.stdout
    }

    pub fn stderr_lines(&self) -> &[String] {
        &self.stderr
    }

    pub fn lines(&self, stream: StreamKind) -> &[String] {
        match stream {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }

    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.join("\n")
    }

    pub fn text(&self, stream: StreamKind) -> String {
        self.lines(stream).join("\n")
    }
}

/// Seam between workflows and the operating system
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `spec` to completion, echoing its output live when `echo` is set
    async fn execute(&self, spec: &CommandSpec, echo: bool) -> CommandResult;
}

/// Spawns real processes with tokio
pub struct CommandRunner {
    sink: Arc<dyn LineSink>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Runner that echoes to the terminal and never times out
    pub fn new() -> Self {
        Self {
            sink: Arc::new(ConsoleSink),
            timeout: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a command, sending each line to `sink` as it arrives
    pub async fn run(&self, spec: &CommandSpec, sink: Arc<dyn LineSink>) -> CommandResult {
        debug!(command = %spec, "Starting command");

        let mut command = Command::new(spec.program());
        command
            .args(spec.arguments())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %spec, error = %e, "Failed to start command");
                return CommandResult::start_failure(spec, &e);
            }
        };

        let stdout_lines = SharedLines::default();
        let stderr_lines = SharedLines::default();
        let stdout_task = tokio::spawn(drain(
            child.stdout.take(),
            StreamKind::Stdout,
            Arc::clone(&sink),
            Arc::clone(&stdout_lines),
        ));
        let stderr_task = tokio::spawn(drain(
            child.stderr.take(),
            StreamKind::Stderr,
            sink,
            Arc::clone(&stderr_lines),
        ));

        let (status, timed_out) = match self.timeout {
            None => (child.wait().await, None),
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => (status, None),
                Err(_) => {
                    warn!(command = %spec, "Command exceeded {}s, killing it", limit.as_secs());
                    if let Err(e) = child.kill().await {
                        error!(command = %spec, error = %e, "Failed to kill timed-out command");
                    }
                    (child.wait().await, Some(limit))
                }
            },
        };

        let (stdout, stdout_open) = join_drain(stdout_task, &stdout_lines).await;
        let (mut stderr, stderr_open) = join_drain(stderr_task, &stderr_lines).await;
        if stdout_open || stderr_open {
            warn!(command = %spec, "Output pipe still open after the command exited");
            stderr.push(format!(
                "output pipe still open {}s after '{}' exited; later output was not captured",
                DRAIN_GRACE.as_secs(),
                spec.program()
            ));
        }

        if let Some(limit) = timed_out {
            stderr.push(format!("command aborted after {}s timeout", limit.as_secs()));
            return CommandResult::new(RUNNER_FAILURE_CODE, stdout, stderr);
        }

        match status {
            Ok(status) => {
                let exit_code = status.code().unwrap_or(RUNNER_FAILURE_CODE);
                info!(command = %spec, exit_code, "Command finished");
                CommandResult::new(exit_code, stdout, stderr)
            }
            Err(e) => {
                error!(command = %spec, error = %e, "Failed to wait for command");
                stderr.push(format!("failed to wait for '{}': {}", spec.program(), e));
                CommandResult::new(RUNNER_FAILURE_CODE, stdout, stderr)
            }
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for CommandRunner {
    async fn execute(&self, spec: &CommandSpec, echo: bool) -> CommandResult {
        let sink: Arc<dyn LineSink> = if echo {
            Arc::clone(&self.sink)
        } else {
            Arc::new(NullSink)
        };
        self.run(spec, sink).await
    }
}

/// Read one pipe to EOF, forwarding every line to `sink` and into `lines`
async fn drain<R>(
    reader: Option<R>,
    stream: StreamKind,
    sink: Arc<dyn LineSink>,
    lines: SharedLines,
) where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buffer);
                sink.emit(stream, &line);
                lock(&lines).push(line);
            }
            Err(e) => {
                warn!(stream = stream.as_str(), error = %e, "Stopped reading command output");
                break;
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Wait up to [`DRAIN_GRACE`] for a drain task, then take whatever it
/// collected. The flag is set when the pipe was still open and the task was
/// abandoned.
async fn join_drain(mut task: JoinHandle<()>, lines: &SharedLines) -> (Vec<String>, bool) {
    let still_open = match tokio::time::timeout(DRAIN_GRACE, &mut task).await {
        Ok(Ok(())) => false,
        Ok(Err(e)) => {
            error!(error = %e, "Output drain task failed");
            false
        }
        Err(_) => {
            // A grandchild can keep the pipe open after the child is gone.
            task.abort();
            true
        }
    };

    let collected = std::mem::take(&mut *lock(lines));
    (collected, still_open)
}
