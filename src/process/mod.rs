// ── Process runner ────────────────────────────────────────────────────────────
//
// Launches a child process, optionally streams its output, and waits
// according to a `WaitPolicy`.  Every failure is folded into a
// `ProcessStatus` so callers never handle launch errors themselves.
//
// Ownership: `run` owns the `Child` until it has an answer.  A child still
// running at that point (no-wait or timed out) is handed to a detached
// reaper thread so it never lingers as a zombie.  When output is captured
// the pipe ends move into two reader threads, which exit on EOF; after a
// normal exit `run` waits for them, but never past the wait deadline, since
// a grandchild holding the pipes open can delay EOF indefinitely.

mod cmdline;

pub(crate) use cmdline::split_command_line;

use std::{
    ffi::{OsStr, OsString},
    fmt,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::{mpsc, Arc},
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::platform;

// ── Exit-code contract ────────────────────────────────────────────────────────

/// Exit code reported when a bounded wait expires (`ERROR_TIMEOUT`).
pub const TIMEOUT_EXIT_CODE: i32 = 1460;

/// Exit code reported when the process could not be launched or waited on.
pub const LAUNCH_FAILED_EXIT_CODE: i32 = -1;

/// How often a bounded wait polls the child.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ── WaitPolicy ────────────────────────────────────────────────────────────────

/// How long `run` waits for the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Fire-and-forget: return as soon as the process has started.
    NoWait,
    /// Wait at most this long.  The child is left running on expiry.
    WaitUpTo(Duration),
    /// Block until the child exits.
    #[default]
    WaitIndefinitely,
}

impl WaitPolicy {
    /// Map the legacy signed millisecond timeout: `0` never waits, a
    /// negative value waits forever, a positive value bounds the wait.
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            0 => Self::NoWait,
            ms if ms < 0 => Self::WaitIndefinitely,
            ms => Self::WaitUpTo(Duration::from_millis(ms.unsigned_abs())),
        }
    }
}

/// Whether the child may show a console window.  Only meaningful on Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowHint {
    #[default]
    Normal,
    Hidden,
}

// ── Output ────────────────────────────────────────────────────────────────────

/// One line of captured output, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Stdout(s) | Self::Stderr(s) => s,
        }
    }
}

/// Receives each output line as it arrives.
///
/// Called from reader threads, possibly from two at once, and never on the
/// thread that called `run`.
pub type OutputSink = Arc<dyn Fn(&OutputLine) + Send + Sync>;

// ── ProcessSpec ───────────────────────────────────────────────────────────────

/// Everything needed to launch one process.
#[derive(Clone)]
pub struct ProcessSpec {
    program: PathBuf,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
    wait: WaitPolicy,
    capture: bool,
    sink: Option<OutputSink>,
    window: WindowHint,
}

impl ProcessSpec {
    /// A spec for `program` with no arguments that waits indefinitely and
    /// discards output.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            wait: WaitPolicy::default(),
            capture: false,
            sink: None,
            window: WindowHint::default(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Append the arguments of a single command-line string, split with
    /// Windows quoting rules.
    pub fn command_line(mut self, line: &str) -> Self {
        self.args.extend(cmdline::split_command_line(line));
        self
    }

    /// Run the child in `dir` instead of the caller's current directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Collect stdout and stderr lines into the result.
    pub fn capture_output(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Collect output and also forward each line to `sink` as it arrives.
    pub fn on_output(mut self, sink: impl Fn(&OutputLine) + Send + Sync + 'static) -> Self {
        self.capture = true;
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn window(mut self, window: WindowHint) -> Self {
        self.window = window;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    pub fn captures_output(&self) -> bool {
        self.capture
    }
}

impl fmt::Debug for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("wait", &self.wait)
            .field("capture", &self.capture)
            .field("sink", &self.sink.as_ref().map(|_| ".."))
            .field("window", &self.window)
            .finish()
    }
}

// ── ProcessResult ─────────────────────────────────────────────────────────────

/// How a `run` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The child exited with this code.  On Unix a child killed by signal
    /// `n` reports `128 + n`, as shells do.
    Exited(i32),
    /// `WaitPolicy::NoWait`: the child started and was not waited on.
    Launched,
    /// The bounded wait expired; the child may still be running.
    TimedOut,
    /// The child could not be spawned, or waiting on it failed.
    LaunchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub status: ProcessStatus,
    /// Captured lines in arrival order.  Empty unless capture was requested.
    pub output: Vec<OutputLine>,
}

impl ProcessResult {
    pub(crate) fn launch_failed() -> Self {
        Self {
            status: ProcessStatus::LaunchFailed,
            output: Vec::new(),
        }
    }

    /// The integer exit-code contract callers branch on.
    ///
    /// | Status | Code |
    /// |---|---|
    /// | `Exited(n)` | `n` |
    /// | `Launched` | `0` |
    /// | `TimedOut` | [`TIMEOUT_EXIT_CODE`] |
    /// | `LaunchFailed` | [`LAUNCH_FAILED_EXIT_CODE`] |
    ///
    /// Windows reports crashes as NTSTATUS codes (`0xC0000005`), which are
    /// negative as `i32` and overlap the launch-failure range.  Use
    /// [`ProcessResult::failed_to_launch`] rather than the sign of the code
    /// to tell the two apart.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            ProcessStatus::Exited(code) => code,
            ProcessStatus::Launched => 0,
            ProcessStatus::TimedOut => TIMEOUT_EXIT_CODE,
            ProcessStatus::LaunchFailed => LAUNCH_FAILED_EXIT_CODE,
        }
    }

    /// `true` only when the process never ran (or could not be waited on).
    pub fn failed_to_launch(&self) -> bool {
        self.status == ProcessStatus::LaunchFailed
    }

    /// `true` for a zero exit or a successful fire-and-forget launch.
    pub fn success(&self) -> bool {
        matches!(
            self.status,
            ProcessStatus::Exited(0) | ProcessStatus::Launched
        )
    }

    pub fn stdout(&self) -> impl Iterator<Item = &str> {
        self.output.iter().filter_map(|l| match l {
            OutputLine::Stdout(s) => Some(s.as_str()),
            OutputLine::Stderr(_) => None,
        })
    }

    pub fn stderr(&self) -> impl Iterator<Item = &str> {
        self.output.iter().filter_map(|l| match l {
            OutputLine::Stderr(s) => Some(s.as_str()),
            OutputLine::Stdout(_) => None,
        })
    }
}

// ── Launcher ──────────────────────────────────────────────────────────────────

/// Something that can run a `ProcessSpec`.  `ProcessRunner` is the real one;
/// tests substitute recording fakes.
pub trait Launcher {
    fn launch(&self, spec: ProcessSpec) -> ProcessResult;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, spec: ProcessSpec) -> ProcessResult {
        (**self).launch(spec)
    }
}

/// Launches real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Launcher for ProcessRunner {
    fn launch(&self, spec: ProcessSpec) -> ProcessResult {
        run(spec)
    }
}

/// Launch `spec` and wait according to its policy.  Never panics; every
/// launch or wait error becomes `ProcessStatus::LaunchFailed`.
pub fn run(spec: ProcessSpec) -> ProcessResult {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args).stdin(Stdio::null());
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }
    if spec.capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
    platform::apply_window_hint(&mut cmd, spec.window);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program = %spec.program.display(), error = %e, "failed to launch process");
            return ProcessResult::launch_failed();
        }
    };
    tracing::debug!(
        program = %spec.program.display(),
        pid = child.id(),
        wait = ?spec.wait,
        "launched process"
    );

    let capture = spec
        .capture
        .then(|| Capture::start(&mut child, spec.sink.clone()));

    let deadline = match spec.wait {
        WaitPolicy::WaitUpTo(limit) => Some(Instant::now() + limit),
        WaitPolicy::NoWait | WaitPolicy::WaitIndefinitely => None,
    };
    let status = match (spec.wait, deadline) {
        (WaitPolicy::NoWait, _) => ProcessStatus::Launched,
        (_, Some(deadline)) => wait_until(&mut child, deadline, &spec.program),
        (_, None) => match child.wait() {
            Ok(status) => exit_status(status),
            Err(e) => {
                tracing::warn!(program = %spec.program.display(), error = %e, "wait failed");
                ProcessStatus::LaunchFailed
            }
        },
    };

    // Not killed: a timed-out or fire-and-forget child keeps running, and
    // is reaped in the background once it exits.
    if matches!(status, ProcessStatus::Launched | ProcessStatus::TimedOut) {
        if status == ProcessStatus::TimedOut {
            tracing::debug!(program = %spec.program.display(), "process still running after timeout");
        }
        reap_in_background(child);
    }

    let output = match capture {
        Some(capture) if matches!(status, ProcessStatus::Exited(_)) => capture.finish(deadline),
        Some(capture) => capture.snapshot(),
        None => Vec::new(),
    };

    ProcessResult { status, output }
}

fn wait_until(child: &mut Child, deadline: Instant, program: &Path) -> ProcessStatus {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return exit_status(status),
            Ok(None) => {
                let now = Instant::now();
                if now >= deadline {
                    return ProcessStatus::TimedOut;
                }
                thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
            Err(e) => {
                tracing::warn!(program = %program.display(), error = %e, "wait failed");
                return ProcessStatus::LaunchFailed;
            }
        }
    }
}

/// Wait for `child` on a detached thread.  Nobody joins it; its only job is
/// to collect the exit status so the OS can release the process entry.
fn reap_in_background(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name("rivet-reaper".to_owned())
        .spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!(pid, error = %e, "could not reap child");
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(pid, error = %e, "could not start reaper thread");
    }
}

fn exit_status(status: ExitStatus) -> ProcessStatus {
    if let Some(code) = status.code() {
        return ProcessStatus::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ProcessStatus::Exited(128 + signal);
        }
    }
    ProcessStatus::LaunchFailed
}

// ── Output capture ────────────────────────────────────────────────────────────

struct Capture {
    lines: Arc<Mutex<Vec<OutputLine>>>,
    /// One message per reader that reached EOF.
    done: mpsc::Receiver<()>,
    readers: usize,
}

impl Capture {
    fn start(child: &mut Child, sink: Option<OutputSink>) -> Self {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done) = mpsc::channel();
        let mut readers = 0;
        if let Some(stdout) = child.stdout.take() {
            readers += usize::from(spawn_reader(
                "rivet-stdout",
                stdout,
                OutputLine::Stdout,
                Arc::clone(&lines),
                sink.clone(),
                done_tx.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers += usize::from(spawn_reader(
                "rivet-stderr",
                stderr,
                OutputLine::Stderr,
                Arc::clone(&lines),
                sink,
                done_tx,
            ));
        }
        Self {
            lines,
            done,
            readers,
        }
    }

    /// Wait for both streams to reach EOF, but not past `deadline`, then
    /// return what has been read.  Readers still blocked at the deadline
    /// keep running detached.
    fn finish(self, deadline: Option<Instant>) -> Vec<OutputLine> {
        for _ in 0..self.readers {
            let drained = match deadline {
                Some(deadline) => self
                    .done
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    .is_ok(),
                None => self.done.recv().is_ok(),
            };
            if !drained {
                tracing::debug!("output pipes still open after the process exited");
                break;
            }
        }
        self.snapshot()
    }

    /// Lines received so far; the readers keep running.
    fn snapshot(&self) -> Vec<OutputLine> {
        self.lines.lock().clone()
    }
}

fn spawn_reader<R>(
    name: &str,
    stream: R,
    wrap: fn(String) -> OutputLine,
    lines: Arc<Mutex<Vec<OutputLine>>>,
    sink: Option<OutputSink>,
    done: mpsc::Sender<()>,
) -> bool
where
    R: Read + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        while matches!(buf.last(), Some(b'\n' | b'\r')) {
                            buf.pop();
                        }
                        let line = wrap(String::from_utf8_lossy(&buf).into_owned());
                        if let Some(sink) = &sink {
                            sink(&line);
                        }
                        lines.lock().push(line);
                    }
                }
            }
            // The receiver is gone once `run` stopped waiting.
            let _ = done.send(());
        });
    match spawned {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "could not start output reader");
            false
        }
    }
}

// ── Test support ──────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::{Launcher, ProcessResult, ProcessSpec, ProcessStatus};

    /// Records every spec it is asked to launch and answers with scripted
    /// statuses (`Exited(0)` once the script runs out).
    #[derive(Default)]
    pub(crate) struct RecordingLauncher {
        calls: Mutex<Vec<ProcessSpec>>,
        script: Mutex<VecDeque<ProcessStatus>>,
    }

    impl RecordingLauncher {
        pub(crate) fn with_statuses(statuses: impl IntoIterator<Item = ProcessStatus>) -> Self {
            Self {
                calls: Mutex::default(),
                script: Mutex::new(statuses.into_iter().collect()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<ProcessSpec> {
            self.calls.lock().clone()
        }

        /// Arguments of call `n` as strings.
        pub(crate) fn args_of(&self, n: usize) -> Vec<String> {
            self.calls.lock()[n]
                .arguments()
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect()
        }
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, spec: ProcessSpec) -> ProcessResult {
            self.calls.lock().push(spec);
            let status = self
                .script
                .lock()
                .pop_front()
                .unwrap_or(ProcessStatus::Exited(0));
            ProcessResult {
                status,
                output: Vec::new(),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
