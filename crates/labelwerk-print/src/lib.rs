// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print: spooler abstraction (CUPS over IPP plus an in-memory
// double), the print submitter that hands composed labels to it, and the
// persisted saved-label memory.

pub mod cups_client;
pub mod memory;
pub mod spooler;
pub mod submitter;

pub use cups_client::CupsSpooler;
pub use memory::LabelMemory;
pub use spooler::{MemorySpooler, PrintOptions, Spooler, SpoolerCall, SpoolerError};
pub use submitter::PrintSubmitter;
