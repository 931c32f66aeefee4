// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: wires the compositor, submitter and saved-label memory into
// the label pipeline the front end calls.

pub mod app_services;
pub mod data_dir;
