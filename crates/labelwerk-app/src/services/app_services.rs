// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label service: the compose → submit → remember pipeline.
//
// A request is validated, composed at the configured DPI, submitted to the
// configured printer, and only then recorded in the saved-label memory. Any
// failure before the memory write leaves the memory untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::labels::{self, LabelSizeSpec};
use labelwerk_core::types::{JobId, LabelId, LabelRequest, PrinterStatus, SavedLabelEntry};
use labelwerk_core::AppConfig;
use labelwerk_print::{CupsSpooler, LabelMemory, PrintSubmitter, Spooler};
use labelwerk_render::{LabelCompositor, RenderedLabel};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";
const MEMORY_FILE: &str = "saved_labels.json";

/// Result of a successful print request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOutcome {
    pub job_id: JobId,
    pub message: String,
}

impl PrintOutcome {
    fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            message: format!("Print job {job_id} submitted successfully"),
        }
    }
}

/// Owns everything a label request touches.
pub struct LabelService<S> {
    config: AppConfig,
    compositor: LabelCompositor,
    submitter: PrintSubmitter<S>,
    memory: Arc<LabelMemory>,
}

impl LabelService<CupsSpooler> {
    /// Build the production service: config from the data directory plus
    /// environment, CUPS as the spooler.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising label service");

        let mut config = load_config(&dir);
        config.apply_env()?;
        let memory_path = config
            .memory_file
            .clone()
            .unwrap_or_else(|| dir.join(MEMORY_FILE));

        let spooler = CupsSpooler::new(config.spooler_uri.clone());
        Self::with_spooler(config, memory_path, spooler)
    }
}

impl<S: Spooler> LabelService<S> {
    pub fn with_spooler(config: AppConfig, memory_path: PathBuf, spooler: S) -> Result<Self> {
        let compositor = LabelCompositor::new(&config.font_path)?;
        let submitter = PrintSubmitter::new(
            spooler,
            config.printer_name.clone(),
            config.job_title.clone(),
        );
        let memory = Arc::new(LabelMemory::load(memory_path));

        Ok(Self {
            config,
            compositor,
            submitter,
            memory,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn spooler(&self) -> &S {
        self.submitter.spooler()
    }

    pub fn memory_path(&self) -> &Path {
        self.memory.path()
    }

    /// A request for `text` carrying the configured defaults.
    pub fn request(&self, text: impl Into<String>) -> LabelRequest {
        LabelRequest::new(text)
            .with_label_size(self.config.default_label_size.clone())
            .with_font_size(self.config.default_font_size)
    }

    /// Compose without printing.
    #[instrument(skip(self, request), fields(label_size = %request.label_size))]
    pub fn preview(&self, request: &LabelRequest) -> Result<RenderedLabel> {
        request.validate()?;
        self.compositor.compose(request, self.config.dpi)
    }

    /// Compose, submit, and remember a label.
    #[instrument(skip(self, request), fields(label_size = %request.label_size, copies = request.copies))]
    pub async fn print(&self, request: &LabelRequest) -> Result<PrintOutcome> {
        request.validate()?;
        let label = self.compositor.compose(request, self.config.dpi)?;
        let job_id = self
            .submitter
            .submit(&label, &request.label_size, request.copies)
            .await?;

        // The store locks and fsyncs; keep that off the async worker.
        let memory = Arc::clone(&self.memory);
        let saved = request.clone();
        tokio::task::spawn_blocking(move || memory.upsert(&saved))
            .await
            .map_err(|err| {
                LabelwerkError::Io(std::io::Error::other(format!(
                    "saved-label write did not complete: {err}"
                )))
            })??;
        info!(%job_id, "label printed and saved");
        Ok(PrintOutcome::new(job_id))
    }

    pub async fn status(&self) -> PrinterStatus {
        self.submitter.status().await
    }

    /// Saved labels, most recent first.
    pub fn memory(&self) -> Vec<SavedLabelEntry> {
        self.memory.list()
    }

    /// Delete saved labels by id; returns how many were removed.
    pub fn forget(&self, ids: &[LabelId]) -> Result<usize> {
        self.memory.delete_many(ids)
    }

    pub fn label_sizes(&self) -> &'static [LabelSizeSpec] {
        labels::all()
    }
}

/// Persisted config from `<data dir>/config.json`; defaults if the file is
/// absent or malformed.
fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let Ok(data) = std::fs::read_to_string(&path) else {
        return AppConfig::default();
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed config file");
            AppConfig::default()
        }
    }
}
