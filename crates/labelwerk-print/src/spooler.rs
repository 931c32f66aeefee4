// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print spooler capability.
//
// Labelwerk needs exactly two things from the spooler: submit a file with
// options to a named printer, and look a printer up by name. `CupsSpooler`
// does this over IPP; `MemorySpooler` is a deterministic double that records
// every call for tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use labelwerk_core::types::{JobId, PrinterAttributes};

/// Options passed to the spooler with a submission, e.g. `media` or `copies`.
pub type PrintOptions = BTreeMap<String, String>;

/// Failure talking to the spooler. Kept separate from `LabelwerkError`; the
/// submitter decides what each failure means to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SpoolerError {
    #[error("Invalid printer URI: {0}")]
    InvalidUri(String),

    #[error("Spooler unreachable: {0}")]
    Connection(String),

    /// The spooler answered but refused the operation.
    #[error("{0}")]
    Rejected(String),

    #[error("Could not read print file: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow interface to an external print spooler.
pub trait Spooler: Send + Sync {
    /// Submit the file at `path` to `printer`; returns the spooler's job id.
    ///
    /// The file only needs to exist for the duration of the call.
    fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> impl Future<Output = Result<JobId, SpoolerError>> + Send;

    /// Attributes of `printer`, or `None` if the spooler has no such printer.
    fn printer_attributes(
        &self,
        printer: &str,
    ) -> impl Future<Output = Result<Option<PrinterAttributes>, SpoolerError>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory test double
// ---------------------------------------------------------------------------

/// One recorded `print_file` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolerCall {
    pub printer: String,
    pub path: PathBuf,
    pub title: String,
    pub options: PrintOptions,
    /// Whether `path` existed when the spooler was called.
    pub file_existed: bool,
    /// Size of the file at call time (0 if it did not exist).
    pub file_len: u64,
}

#[derive(Debug, Default)]
struct MemoryState {
    calls: Vec<SpoolerCall>,
    status_queries: Vec<String>,
}

/// Deterministic spooler for tests.
///
/// Accepts every job with a fixed id unless told to fail, and answers status
/// queries from a fixed printer table.
#[derive(Debug)]
pub struct MemorySpooler {
    job_id: JobId,
    submit_failure: Option<String>,
    query_failure: Option<String>,
    printers: BTreeMap<String, PrinterAttributes>,
    state: Mutex<MemoryState>,
}

impl Default for MemorySpooler {
    fn default() -> Self {
        Self {
            job_id: JobId(1),
            submit_failure: None,
            query_failure: None,
            printers: BTreeMap::new(),
            state: Mutex::new(MemoryState::default()),
        }
    }
}

impl MemorySpooler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Job id returned for accepted submissions.
    pub fn with_job_id(mut self, id: i32) -> Self {
        self.job_id = JobId(id);
        self
    }

    /// Reject every submission with `message`.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.submit_failure = Some(message.into());
        self
    }

    /// Fail every status query as if the spooler were down.
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }

    /// Register a printer with the given attributes.
    pub fn with_printer<'a>(
        mut self,
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let attrs = attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.printers.insert(name.into(), attrs);
        self
    }

    /// Every `print_file` call so far, oldest first.
    pub fn calls(&self) -> Vec<SpoolerCall> {
        self.lock().calls.clone()
    }

    /// Printer names passed to `printer_attributes`, oldest first.
    pub fn status_queries(&self) -> Vec<String> {
        self.lock().status_queries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the calls made before it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Spooler for MemorySpooler {
    async fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> Result<JobId, SpoolerError> {
        let metadata = std::fs::metadata(path).ok();
        self.lock().calls.push(SpoolerCall {
            printer: printer.to_string(),
            path: path.to_path_buf(),
            title: title.to_string(),
            options: options.clone(),
            file_existed: metadata.is_some(),
            file_len: metadata.map(|m| m.len()).unwrap_or(0),
        });

        match &self.submit_failure {
            Some(message) => Err(SpoolerError::Rejected(message.clone())),
            None => Ok(self.job_id),
        }
    }

    async fn printer_attributes(
        &self,
        printer: &str,
    ) -> Result<Option<PrinterAttributes>, SpoolerError> {
        self.lock().status_queries.push(printer.to_string());

        if let Some(message) = &self.query_failure {
            return Err(SpoolerError::Connection(message.clone()));
        }
        Ok(self.printers.get(printer).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_spooler_records_calls() {
        let spooler = MemorySpooler::new().with_job_id(42);
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let options = PrintOptions::from([("copies".to_string(), "2".to_string())]);

        let job = spooler
            .print_file("dymo", file.path(), "Label", &options)
            .await
            .expect("accepted");

        assert_eq!(job, JobId(42));
        let calls = spooler.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].printer, "dymo");
        assert_eq!(calls[0].options, options);
        assert!(calls[0].file_existed);
    }

    #[tokio::test]
    async fn memory_spooler_failure_keeps_message() {
        let spooler = MemorySpooler::new().failing_with("Printer on fire");
        let err = spooler
            .print_file("dymo", Path::new("/nonexistent.png"), "Label", &PrintOptions::new())
            .await
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Printer on fire");
        assert!(!spooler.calls()[0].file_existed);
    }

    #[tokio::test]
    async fn memory_spooler_printer_table() {
        let spooler = MemorySpooler::new().with_printer("dymo", [("printer-state", "idle")]);

        let found = spooler.printer_attributes("dymo").await.expect("query");
        assert_eq!(
            found.and_then(|a| a.get("printer-state").cloned()).as_deref(),
            Some("idle")
        );
        assert!(spooler.printer_attributes("zebra").await.expect("query").is_none());
        assert_eq!(spooler.status_queries(), vec!["dymo", "zebra"]);
    }
}
