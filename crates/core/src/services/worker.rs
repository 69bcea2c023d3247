//! One-shot Python subprocess shared by the evaluator and the materializer.
//!
//! Each request spawns a fresh interpreter running the embedded worker script,
//! writes a JSON request to its stdin and waits for the reply line on stdout
//! for at most the configured budget. A hung interpreter is killed and reaped.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::materialize::ValueFacts;

const WORKER_SOURCE: &str = include_str!("worker.py");

/// Prefix of the reply line; evaluated code is free to print anything else.
pub const REPLY_MARKER: &str = "\u{1e}RISKYCOMB ";

/// Modules the worker imports before evaluating, with the alias each is bound to.
pub fn default_imports() -> Vec<(String, String)> {
    [("numpy", "np"), ("pandas", "pd"), ("matplotlib.pyplot", "plt"), ("csv", "csv")]
        .into_iter()
        .map(|(m, a)| (m.to_string(), a.to_string()))
        .collect()
}

/// Interpreter used when neither config nor flags name one.
pub fn resolve_python_path() -> PathBuf {
    std::env::var_os("RISKYCOMB_PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("python3"))
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn {python}: {source}")]
    Spawn { python: String, source: std::io::Error },
    #[error("worker i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker exceeded {0:?}")]
    TimedOut(Duration),
    #[error("{0}")]
    Raised(String),
    #[error("malformed worker reply: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMode {
    /// Only report whether evaluation succeeded.
    Evaluate,
    /// Evaluate and report [`ValueFacts`] about the result.
    Describe,
    /// As `Describe`, plus the distinct cell types of each table column.
    DescribeCells,
}

#[derive(Serialize)]
struct WorkerRequest<'a> {
    mode: WorkerMode,
    imports: &'a [(String, String)],
    inputs: &'a [(String, String)],
    expression: &'a str,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum WorkerReply {
    Ok {
        #[serde(default)]
        facts: Option<ValueFacts>,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct PythonWorker {
    pub python: PathBuf,
    pub budget: Duration,
    pub imports: Vec<(String, String)>,
    pub working_dir: Option<PathBuf>,
}

impl PythonWorker {
    pub fn new(python: PathBuf, budget: Duration) -> Self {
        Self { python, budget, imports: default_imports(), working_dir: None }
    }

    pub fn with_imports(mut self, imports: Vec<(String, String)>) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Evaluate `expression` after binding `inputs`. `Ok(None)` in evaluate
    /// mode, `Ok(Some(facts))` in describe mode.
    pub fn run(
        &self,
        mode: WorkerMode,
        inputs: &[(String, String)],
        expression: &str,
    ) -> Result<Option<ValueFacts>, WorkerError> {
        let payload = serde_json::to_string(&WorkerRequest {
            mode,
            imports: &self.imports,
            inputs,
            expression,
        })
        .map_err(|e| WorkerError::Protocol(e.to_string()))?;

        let mut cmd = Command::new(&self.python);
        cmd.arg("-c")
            .arg(WORKER_SOURCE)
            .env("MPLBACKEND", "Agg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd.spawn().map_err(|source| WorkerError::Spawn {
            python: self.python.display().to_string(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A worker that exits before reading still gets judged by its reply.
            if let Err(err) = stdin.write_all(payload.as_bytes()) {
                tracing::debug!(error = %err, "worker closed stdin early");
            }
        }

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WorkerError::Protocol("worker stdout unavailable".into()));
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = String::new();
            let res = stdout.read_to_string(&mut buf).map(|_| buf);
            let _ = tx.send(res);
        });

        match rx.recv_timeout(self.budget) {
            Ok(Ok(output)) => {
                child.wait()?;
                parse_reply(&output)
            }
            Ok(Err(err)) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(WorkerError::Io(err))
            }
            Err(RecvTimeoutError::Timeout) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(WorkerError::TimedOut(self.budget))
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = child.wait();
                Err(WorkerError::Protocol("worker output reader vanished".into()))
            }
        }
    }
}

fn parse_reply(output: &str) -> Result<Option<ValueFacts>, WorkerError> {
    let line = output
        .lines()
        .rev()
        .find_map(|l| l.strip_prefix(REPLY_MARKER))
        .ok_or_else(|| WorkerError::Protocol("worker produced no reply".into()))?;
    let reply: WorkerReply =
        serde_json::from_str(line).map_err(|e| WorkerError::Protocol(e.to_string()))?;
    match reply {
        WorkerReply::Ok { facts } => Ok(facts),
        WorkerReply::Error { error } => Err(WorkerError::Raised(error)),
    }
}
