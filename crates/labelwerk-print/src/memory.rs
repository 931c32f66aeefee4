// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Saved-label memory persisted as a JSON snapshot.
//
// The memory is a most-recent-first stack of printed labels with at most one
// entry per distinct `LabelRequest`. It is read once at startup and the whole
// collection is rewritten after every mutation, before the mutation returns.
// A snapshot is written to a temporary file beside the target and renamed
// over it, so the file on disk is always either the old or the new snapshot.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::{LabelId, LabelRequest, SavedLabelEntry};

/// Persistent saved-label store.
///
/// Mutations are serialised by an internal lock held across the disk write,
/// so concurrent callers never interleave read-modify-write cycles.
#[derive(Debug)]
pub struct LabelMemory {
    path: PathBuf,
    entries: Mutex<Vec<SavedLabelEntry>>,
}

impl LabelMemory {
    /// Load the memory stored at `path`.
    ///
    /// Never fails: a missing, unreadable or corrupt file yields an empty
    /// memory (logged), and the next mutation overwrites it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match read_snapshot(&path) {
            Ok(Some(entries)) => {
                let entries = drop_duplicates(entries);
                info!(count = entries.len(), "saved labels loaded");
                entries
            }
            Ok(None) => {
                debug!("no saved-label file yet");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "saved-label file unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a printed label.
    ///
    /// Any existing entry with the same fields is dropped, and the label is
    /// pushed on top with a fresh id and timestamp.
    #[instrument(skip(self, label), fields(label_size = %label.label_size))]
    pub fn upsert(&self, label: &LabelRequest) -> Result<SavedLabelEntry> {
        let mut entries = self.lock();
        let entry = SavedLabelEntry::new(label.clone());

        let mut next = Vec::with_capacity(entries.len() + 1);
        next.push(entry.clone());
        next.extend(entries.iter().filter(|e| e.label != *label).cloned());
        let replaced = next.len() == entries.len();

        self.commit(&mut entries, next)?;
        info!(id = %entry.id, replaced, "saved label recorded");
        Ok(entry)
    }

    /// Remove the entry with `id`; returns whether one was removed.
    pub fn delete_one(&self, id: &LabelId) -> Result<bool> {
        Ok(self.delete_many(std::slice::from_ref(id))? == 1)
    }

    /// Remove every entry whose id is in `ids`. Unknown ids are ignored.
    /// Returns the number removed; survivors keep their order.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub fn delete_many(&self, ids: &[LabelId]) -> Result<usize> {
        let mut entries = self.lock();
        let next: Vec<SavedLabelEntry> = entries
            .iter()
            .filter(|e| !ids.contains(&e.id))
            .cloned()
            .collect();
        let removed = entries.len() - next.len();
        if removed == 0 {
            debug!("no matching saved labels");
            return Ok(0);
        }

        self.commit(&mut entries, next)?;
        info!(removed, "saved labels deleted");
        Ok(removed)
    }

    /// All entries, most recent first.
    pub fn list(&self) -> Vec<SavedLabelEntry> {
        self.lock().clone()
    }

    pub fn get(&self, id: &LabelId) -> Option<SavedLabelEntry> {
        self.lock().iter().find(|e| e.id == *id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write `next` to disk, then make it the in-memory state.
    fn commit(&self, current: &mut Vec<SavedLabelEntry>, next: Vec<SavedLabelEntry>) -> Result<()> {
        write_snapshot(&self.path, &next)?;
        *current = next;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SavedLabelEntry>> {
        // The vector is only ever replaced whole, so a poisoned lock still
        // guards a consistent snapshot.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_snapshot(path: &Path) -> Result<Option<Vec<SavedLabelEntry>>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_slice(&data)?))
}

/// Keep the first (most recent) entry for each distinct label.
fn drop_duplicates(entries: Vec<SavedLabelEntry>) -> Vec<SavedLabelEntry> {
    let total = entries.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<SavedLabelEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.label.clone()))
        .collect();
    if kept.len() < total {
        warn!(dropped = total - kept.len(), "duplicate saved labels discarded");
    }
    kept
}

fn write_snapshot(path: &Path, entries: &[SavedLabelEntry]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(file.as_file_mut(), entries)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|err| LabelwerkError::Io(err.error))?;
    debug!(count = entries.len(), "saved-label snapshot written");
    Ok(())
}
