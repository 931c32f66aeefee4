// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS spooler client over IPP.
//
// CUPS exposes each queue as `<base>/printers/<name>`. Two operations are used:
//   - Print-Job               (RFC 8011 §4.2.1)  submit a label PNG
//   - Get-Printer-Attributes  (RFC 8011 §4.2.5)  status lookup by name

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use ipp::prelude::*;
use tracing::{debug, error, info, instrument};

use labelwerk_core::types::{JobId, PrinterAttributes};

use crate::spooler::{PrintOptions, Spooler, SpoolerError};

/// MIME type of every document Labelwerk submits.
const DOCUMENT_FORMAT: &str = "image/png";

/// Spooler backed by a CUPS daemon.
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    /// Base URI of the daemon, e.g. `ipp://localhost:631`.
    base_uri: String,
}

impl CupsSpooler {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
        }
    }

    /// IPP URI of the named queue.
    pub fn printer_uri(&self, printer: &str) -> Result<Uri, SpoolerError> {
        let raw = format!("{}/printers/{printer}", self.base_uri);
        raw.parse()
            .map_err(|e| SpoolerError::InvalidUri(format!("'{raw}': {e}")))
    }
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self::new("ipp://localhost:631")
    }
}

impl Spooler for CupsSpooler {
    #[instrument(skip(self, options), fields(base = %self.base_uri))]
    async fn print_file(
        &self,
        printer: &str,
        path: &Path,
        title: &str,
        options: &PrintOptions,
    ) -> Result<JobId, SpoolerError> {
        let uri = self.printer_uri(printer)?;
        let document = tokio::fs::read(path).await?;
        let payload = IppPayload::new(Cursor::new(document));

        let mut builder = IppOperationBuilder::print_job(uri.clone(), payload)
            .job_title(title)
            .document_format(DOCUMENT_FORMAT);
        for (name, value) in options {
            builder = builder.attribute(IppAttribute::new(name, option_value(value)));
        }
        let operation = builder.build();

        info!(options = options.len(), "sending Print-Job");
        let response = AsyncIppClient::new(uri)
            .send(operation)
            .await
            .map_err(|e| SpoolerError::Connection(format!("Print-Job: {e}")))?;

        let code = response.header().status_code();
        if !code.is_success() {
            error!(status = ?code, "Print-Job failed");
            return Err(SpoolerError::Rejected(format!(
                "Print-Job returned status {code:?}"
            )));
        }

        let job_id = extract_job_id(response.attributes()).ok_or_else(|| {
            SpoolerError::Rejected("Print-Job response missing job-id attribute".into())
        })?;

        info!(job_id, "print job accepted by spooler");
        Ok(JobId(job_id))
    }

    #[instrument(skip(self), fields(base = %self.base_uri))]
    async fn printer_attributes(
        &self,
        printer: &str,
    ) -> Result<Option<PrinterAttributes>, SpoolerError> {
        let uri = self.printer_uri(printer)?;
        let operation = IppOperationBuilder::get_printer_attributes(uri.clone()).build();

        debug!("sending Get-Printer-Attributes");
        let response = AsyncIppClient::new(uri)
            .send(operation)
            .await
            .map_err(|e| SpoolerError::Connection(format!("Get-Printer-Attributes: {e}")))?;

        let code = response.header().status_code();
        if code == StatusCode::ClientErrorNotFound {
            debug!("printer not registered");
            return Ok(None);
        }
        if !code.is_success() {
            error!(status = ?code, "Get-Printer-Attributes failed");
            return Err(SpoolerError::Rejected(format!(
                "Get-Printer-Attributes returned status {code:?}"
            )));
        }

        let attrs = flatten_attributes(response.attributes());
        debug!(count = attrs.len(), "received printer attributes");
        Ok(Some(attrs))
    }
}

// ---------------------------------------------------------------------------
// IPP encoding helpers
// ---------------------------------------------------------------------------

/// Encode a string option as the IPP value CUPS expects for it.
fn option_value(value: &str) -> IppValue {
    if let Ok(n) = value.parse::<i32>() {
        return IppValue::Integer(n);
    }
    match value {
        "True" | "true" => IppValue::Boolean(true),
        "False" | "false" => IppValue::Boolean(false),
        other => IppValue::Keyword(other.into()),
    }
}

/// Flatten all attribute groups into one name → value map. Later groups win
/// on duplicate names.
fn flatten_attributes(attrs: &IppAttributes) -> PrinterAttributes {
    let mut map = BTreeMap::new();
    for group in attrs.groups() {
        for (name, attr) in group.attributes() {
            map.insert(name.to_string(), attr.value().to_string());
        }
    }
    map
}

fn extract_job_id(attrs: &IppAttributes) -> Option<i32> {
    for group in attrs.groups_of(DelimiterTag::JobAttributes) {
        if let Some(attr) = group.attributes().get("job-id")
            && let IppValue::Integer(id) = attr.value()
        {
            return Some(*id);
        }
    }
    None
}
