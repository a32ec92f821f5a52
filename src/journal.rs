//! Append-only step journal (JSON lines)

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::grid::GridResult;

/// Outcome of a single planning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed,
    Skipped,
}

/// One journal line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub run_id: Uuid,
    pub step: String,
    pub status: StepStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub detail: Value,
}

/// Journal sink; a journal without a path records nothing
#[derive(Debug, Clone, Default)]
pub struct StepJournal {
    path: Option<PathBuf>,
}

impl StepJournal {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one record as a JSON line
    pub fn record(
        &self,
        run_id: Uuid,
        step: &str,
        status: StepStatus,
        detail: Value,
    ) -> GridResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let record = StepRecord {
            run_id,
            step: step.to_string(),
            status,
            at: Utc::now(),
            detail,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        debug!("Journaled step '{}' ({:?}) to {:?}", step, status, path);
        Ok(())
    }

    /// Read every record back, oldest first
    pub fn read_all(&self) -> GridResult<Vec<StepRecord>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        std::fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Into::into))
            .collect()
    }
}
