use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use apifox_ci::notify::error::NotifyError;
use apifox_ci::notify::notifier::{Notification, Notifier};
use apifox_ci::report::report_model::FailureRecord;
use apifox_ci::runner::error::RunnerError;
use apifox_ci::runner::runner_model::{ReportHandle, SuiteRun, SuiteRunner};

/// What a fake runner does for one suite.
pub enum Scripted {
    /// Return the report at this path, with these streamed links
    Report(PathBuf, Vec<String>),
    /// Fail the invocation
    Fail,
}

/// Runner that replays scripted outcomes and records the suites it saw.
pub struct FakeRunner {
    pub script: HashMap<String, Scripted>,
    pub invoked: Vec<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            invoked: Vec::new(),
        }
    }

    pub fn report(mut self, suite: &str, path: PathBuf) -> Self {
        self.script
            .insert(suite.to_string(), Scripted::Report(path, Vec::new()));
        self
    }

    pub fn streamed(mut self, suite: &str, path: PathBuf, urls: &[&str]) -> Self {
        let urls = urls.iter().map(|u| u.to_string()).collect();
        self.script
            .insert(suite.to_string(), Scripted::Report(path, urls));
        self
    }

    pub fn failing(mut self, suite: &str) -> Self {
        self.script.insert(suite.to_string(), Scripted::Fail);
        self
    }
}

impl SuiteRunner for FakeRunner {
    fn run_suite(&mut self, suite: &str) -> Result<SuiteRun, RunnerError> {
        self.invoked.push(suite.to_string());
        match self.script.get(suite) {
            Some(Scripted::Report(path, urls)) => {
                Ok(SuiteRun::new(ReportHandle::new(path.clone())).with_report_urls(urls.clone()))
            }
            Some(Scripted::Fail) | None => Err(RunnerError::Spawn {
                bin: "apifox".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            }),
        }
    }
}

/// Owned copy of a delivered notification.
#[derive(Debug, Clone)]
pub struct Sent {
    pub message: String,
    pub report_urls: Vec<String>,
    pub is_success: bool,
    pub failures: Vec<(String, FailureRecord)>,
}

/// Notifier that records every notification, optionally failing.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, n: &Notification<'_>) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(Sent {
            message: n.message.clone(),
            report_urls: n.report_urls.to_vec(),
            is_success: n.is_success,
            failures: n
                .failures
                .iter()
                .map(|(name, record)| (name.to_string(), record.clone()))
                .collect(),
        });
        if self.fail {
            Err(NotifyError::Rejected {
                code: 19001,
                msg: "param invalid".into(),
            })
        } else {
            Ok(())
        }
    }
}
