// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-formats — Identity-document format registry and constrained
// value extraction.
//
// The registry maps each supported document type to its recognition
// pattern and canonicalization rule. The extractor finds the best
// candidate value of a single, caller-supplied type inside noisy OCR
// text — it never auto-detects types.

pub mod extractor;
pub mod registry;

pub use extractor::extract_expected;
pub use registry::{canonicalize, pattern};
