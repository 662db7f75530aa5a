use thiserror::Error;

/// The runner produced no report for a suite. The suite is skipped.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("suite identifier is empty")]
    EmptySuite,

    #[error("failed to spawn `{bin}` (is the Apifox CLI installed?): {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture {stream} of `{bin}`")]
    Capture { bin: String, stream: &'static str },

    #[error("waiting for `{bin}` failed: {source}")]
    Wait {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("suite `{suite}` did not finish within {secs}s; process killed")]
    Timeout { suite: String, secs: u64 },
}
