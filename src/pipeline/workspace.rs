//! Output and log directory preparation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether a directory was already present or had to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirState {
    Existed,
    Created,
}

/// Explicit existence check, no exception-driven branching
pub fn ensure_dir(path: &Path) -> io::Result<DirState> {
    if path.is_dir() {
        Ok(DirState::Existed)
    } else {
        fs::create_dir_all(path)?;
        Ok(DirState::Created)
    }
}

/// The run's filesystem layout: a `logs/` directory for the execution log
/// and an `outputs/` directory for the table and charts.
pub struct Workspace {
    logs: PathBuf,
    outputs: PathBuf,
}

impl Workspace {
    /// Prepare both directories under `root`, reporting for each whether it
    /// already existed.
    pub fn prepare(root: &Path) -> io::Result<(Workspace, [(PathBuf, DirState); 2])> {
        let logs = root.join("logs");
        let outputs = root.join("outputs");

        let states = [
            (logs.clone(), ensure_dir(&logs)?),
            (outputs.clone(), ensure_dir(&outputs)?),
        ];

        Ok((Workspace { logs, outputs }, states))
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs.join("execution.log")
    }

    pub fn outputs(&self) -> &Path {
        &self.outputs
    }

    /// An output path of the form `outputs/{YYYYMMDD}{suffix}`
    pub fn dated(&self, suffix: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d");
        self.outputs.join(format!("{}{}", stamp, suffix))
    }
}
