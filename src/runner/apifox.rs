use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::runner::error::RunnerError;
use crate::runner::harvest::harvest_report_urls;
use crate::runner::runner_model::{ReportHandle, ReportStems, SuiteRun, SuiteRunner};

/// How to invoke the Apifox CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApifoxSettings {
    /// Executable name or path
    pub bin: String,

    /// Value passed to `-r`; must include `json`
    pub reporters: String,

    /// Where the CLI writes reports, relative to `working_dir`
    pub report_dir: PathBuf,

    /// Working directory of the CLI process (default: current dir)
    pub working_dir: Option<PathBuf>,

    /// Kill a suite that runs longer than this
    pub timeout: Option<Duration>,
}

impl ApifoxSettings {
    /// The report directory as seen from this process.
    pub fn report_root(&self) -> PathBuf {
        match &self.working_dir {
            Some(cwd) => cwd.join(&self.report_dir),
            None => self.report_dir.clone(),
        }
    }
}

impl Default for ApifoxSettings {
    fn default() -> Self {
        Self {
            bin: "apifox".to_string(),
            reporters: "json,cli".to_string(),
            report_dir: PathBuf::from("apifox-reports"),
            working_dir: None,
            timeout: None,
        }
    }
}

/// Runs suites through `apifox run`, one blocking process at a time.
pub struct ApifoxCli {
    settings: ApifoxSettings,
    stems: ReportStems,
}

impl ApifoxCli {
    pub fn new(settings: ApifoxSettings) -> Self {
        Self {
            settings,
            stems: ReportStems::new(),
        }
    }

    /// Arguments for one invocation. The suite identifier is split on
    /// whitespace so configured entries may carry extra CLI flags
    /// (e.g. `<ci-url> -e 123`).
    pub fn command_args(&self, suite: &str, stem: &str) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        args.extend(suite.split_whitespace().map(str::to_string));
        args.extend([
            "-r".to_string(),
            self.settings.reporters.clone(),
            "--out-file".to_string(),
            stem.to_string(),
        ]);
        args
    }

    fn report_handle(&self, stem: &str) -> ReportHandle {
        ReportHandle::in_dir(&self.settings.report_root(), stem)
    }

    fn spawn(&self, args: &[String]) -> Result<Child, RunnerError> {
        let mut command = Command::new(&self.settings.bin);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &self.settings.working_dir {
            command.current_dir(cwd);
        }
        command.spawn().map_err(|source| RunnerError::Spawn {
            bin: self.settings.bin.clone(),
            source,
        })
    }

    fn capture_error(&self, stream: &'static str) -> RunnerError {
        RunnerError::Capture {
            bin: self.settings.bin.clone(),
            stream,
        }
    }
}

impl SuiteRunner for ApifoxCli {
    fn run_suite(&mut self, suite: &str) -> Result<SuiteRun, RunnerError> {
        if suite.trim().is_empty() {
            return Err(RunnerError::EmptySuite);
        }

        let stem = self.stems.next(Local::now().naive_local());
        let args = self.command_args(suite, &stem);
        tracing::info!(suite, report = %stem, "running {} {}", self.settings.bin, args.join(" "));

        let mut child = self.spawn(&args)?;
        let stdout = child.stdout.take().ok_or_else(|| self.capture_error("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| self.capture_error("stderr"))?;

        // stdout and stderr interleave into one line stream, as a terminal would show them
        let (tx, rx) = mpsc::channel();
        let readers = [forward_lines(stdout, tx.clone()), forward_lines(stderr, tx)];

        let deadline = self.settings.timeout.map(|limit| Instant::now() + limit);
        let finished = stream_output(&rx, deadline)
            .and_then(|urls| wait_until(&mut child, deadline).map(|status| (status, urls)));

        let (status, report_urls) = match finished {
            Ok((Ok(status), urls)) => (status, urls),
            Ok((Err(source), _)) => {
                return Err(RunnerError::Wait {
                    bin: self.settings.bin.clone(),
                    source,
                });
            }
            Err(Expired) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunnerError::Timeout {
                    suite: suite.to_string(),
                    secs: self.settings.timeout.map_or(0, |t| t.as_secs()),
                });
            }
        };
        for reader in readers {
            let _ = reader.join();
        }

        // The CLI exits non-zero when any case fails; the report is still written.
        match status.code() {
            Some(0) => tracing::info!(suite, "apifox finished with exit code 0"),
            Some(code) => tracing::warn!(suite, code, "apifox finished with non-zero exit code"),
            None => tracing::warn!(suite, "apifox terminated by signal"),
        }

        Ok(SuiteRun::new(self.report_handle(&stem)).with_report_urls(report_urls))
    }
}

// ============================================================================
// Output streaming
// ============================================================================

/// The per-suite deadline passed.
#[derive(Debug)]
struct Expired;

fn forward_lines<R: Read + Send + 'static>(source: R, tx: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(source).split(b'\n') {
            let Ok(bytes) = line else { break };
            let text = String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string();
            if tx.send(text).is_err() {
                break;
            }
        }
    })
}

/// Echo every line and collect report links until both streams close.
fn stream_output(rx: &Receiver<String>, deadline: Option<Instant>) -> Result<Vec<String>, Expired> {
    let mut urls = Vec::new();
    loop {
        let line = match deadline {
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(line) => line,
                    Err(RecvTimeoutError::Timeout) => return Err(Expired),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(line) => line,
                Err(_) => break,
            },
        };
        tracing::info!(target: "apifox", "{}", line);
        urls.extend(harvest_report_urls(&line));
    }
    Ok(urls)
}

fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> Result<std::io::Result<ExitStatus>, Expired> {
    let Some(deadline) = deadline else {
        return Ok(child.wait());
    };
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Ok(status)),
            Ok(None) if Instant::now() >= deadline => return Err(Expired),
            Ok(None) => thread::sleep(Duration::from_millis(50)),
            Err(e) => return Ok(Err(e)),
        }
    }
}
