use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::models::ReconciliationResult;
use crate::summary::Summary;

/// One completed reconciliation and the inputs it came from.
#[derive(Debug, Clone)]
pub struct Run {
    pub template: PathBuf,
    pub output: PathBuf,
    pub finished_at: DateTime<Local>,
    pub result: ReconciliationResult,
    pub summary: Summary,
}

/// Holds the latest run. A new run replaces the previous one.
#[derive(Debug, Default)]
pub struct ResultStore {
    current: Option<Run>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh run, dropping whatever was held before.
    pub fn record(&mut self, template: &Path, output: &Path, result: ReconciliationResult) -> &Run {
        let summary = Summary::from_result(&result);
        self.current.insert(Run {
            template: template.to_path_buf(),
            output: output.to_path_buf(),
            finished_at: Local::now(),
            result,
            summary,
        })
    }

    pub fn current(&self) -> Option<&Run> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
