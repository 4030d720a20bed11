// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-verify — The verification decision engine and its storage
// collaborators.  This crate ties the format registry, the text
// extraction engine, and the enrollment trust store together into one
// PASS/FAIL decision per (image, subject) pair, and provides the SQLite
// implementations of the two narrow data-access contracts the pipeline
// consumes.

pub mod engine;
pub mod ledger;
pub mod store;

pub use engine::{TrustStore, Verifier};
pub use ledger::VerificationLedger;
pub use store::SqliteTrustStore;
