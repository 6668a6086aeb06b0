//! Run reports
//!
//! A completed run reports what happened to every selected item, in
//! configuration order, plus every template that lacked a repeat-line
//! marker so callers can detect output files without a data block.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::GenerationError;
use crate::output_writer::FileWriteResult;
use crate::templates::TemplateKind;

/// Result of one pipeline entry point call
#[derive(Debug)]
pub enum RunOutcome {
    /// The run executed
    Completed(RunReport),
    /// Another run was in progress; the request was dropped
    Skipped,
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Skipped => None,
        }
    }

    pub fn into_report(self) -> Option<RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped)
    }
}

/// What happened to one generator item
#[derive(Debug)]
pub enum ItemOutcome {
    /// Files were produced (or computed, in dry-run mode)
    Written { files: Vec<FileWriteResult> },
    /// The item was not processed
    Skipped { reason: String },
    /// The item was aborted; remaining items were still processed
    Failed { error: GenerationError },
}

/// Per-item entry of a run report
#[derive(Debug)]
pub struct ItemReport {
    /// Position of the item in the configured list
    pub index: usize,
    pub logic_id: String,
    /// Number of entries produced by the item's data source
    pub entries: usize,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Skipped { .. })
    }

    /// Files of a successful item
    pub fn files(&self) -> &[FileWriteResult] {
        match &self.outcome {
            ItemOutcome::Written { files } => files,
            _ => &[],
        }
    }
}

/// A template used by an item that has no repeat-line marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMarker {
    pub logic_id: String,
    pub kind: TemplateKind,
    pub template_path: PathBuf,
}

/// Summary of a completed run
#[derive(Debug, Default)]
pub struct RunReport {
    pub items: Vec<ItemReport>,
    pub missing_markers: Vec<MissingMarker>,
    pub dry_run: bool,
    pub duration: Duration,
}

impl RunReport {
    /// Every file produced by the run, in write order
    pub fn files(&self) -> impl Iterator<Item = &FileWriteResult> {
        self.items.iter().flat_map(ItemReport::files)
    }

    pub fn files_written(&self) -> usize {
        self.files().filter(|file| file.written).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|item| item.is_failed())
    }

    /// Whether no item failed
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
