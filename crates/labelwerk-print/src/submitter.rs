// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print submitter: hands a composed label to the spooler and reports printer
// status.
//
// A submission encodes the label as PNG into a temporary file, asks the
// spooler to print it with the label's media code, and removes the file on
// every path out (success, spooler failure, or error before the call).

use std::io::Write;

use tracing::{error, info, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::labels;
use labelwerk_core::types::{JobId, PrinterStatus};
use labelwerk_render::RenderedLabel;

use crate::spooler::{PrintOptions, Spooler};

/// Submits labels to one configured printer.
#[derive(Debug)]
pub struct PrintSubmitter<S> {
    spooler: S,
    printer: String,
    job_title: String,
}

impl<S: Spooler> PrintSubmitter<S> {
    pub fn new(spooler: S, printer: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            spooler,
            printer: printer.into(),
            job_title: job_title.into(),
        }
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    /// Print `copies` of `label` on media for `label_size`.
    ///
    /// The label code is checked before anything touches the disk or the
    /// spooler. Spooler failures come back as `PrintSubmissionFailed` carrying
    /// the spooler's own description.
    #[instrument(skip(self, label), fields(printer = %self.printer, width = label.width(), height = label.height()))]
    pub async fn submit(
        &self,
        label: &RenderedLabel,
        label_size: &str,
        copies: u32,
    ) -> Result<JobId> {
        let size = labels::resolve(label_size)?;
        if copies == 0 {
            return Err(LabelwerkError::InvalidRequest(
                "copies must be at least 1".into(),
            ));
        }

        // Removed when dropped, whichever way this function returns.
        let mut file = tempfile::Builder::new()
            .prefix("labelwerk-")
            .suffix(".png")
            .tempfile()?;
        label.write_png(file.as_file_mut())?;
        file.flush()?;

        let options = print_options(size.media_code, copies);
        let result = self
            .spooler
            .print_file(&self.printer, file.path(), &self.job_title, &options)
            .await;

        if let Err(err) = file.close() {
            warn!(error = %err, "failed to remove temporary label file");
        }

        match result {
            Ok(job_id) => {
                info!(%job_id, media = size.media_code, copies, "label submitted");
                Ok(job_id)
            }
            Err(err) => {
                error!(error = %err, "spooler rejected label");
                Err(LabelwerkError::PrintSubmissionFailed(err.to_string()))
            }
        }
    }

    /// Look up the configured printer. Never fails: a missing printer is
    /// `NotFound`, an unreachable spooler is `Unavailable`.
    #[instrument(skip(self), fields(printer = %self.printer))]
    pub async fn status(&self) -> PrinterStatus {
        let printer = self.printer.clone();
        match self.spooler.printer_attributes(&self.printer).await {
            Ok(Some(attributes)) => PrinterStatus::Found {
                printer,
                attributes,
            },
            Ok(None) => {
                info!("printer not found in spooler");
                PrinterStatus::NotFound { printer }
            }
            Err(err) => {
                warn!(error = %err, "printer status unavailable");
                PrinterStatus::Unavailable {
                    printer,
                    error: err.to_string(),
                }
            }
        }
    }
}

/// Spooler options for one submission.
fn print_options(media_code: &str, copies: u32) -> PrintOptions {
    PrintOptions::from([
        ("media".to_string(), media_code.to_string()),
        ("fit-to-page".to_string(), "True".to_string()),
        ("copies".to_string(), copies.to_string()),
    ])
}
