// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Type-constrained value extraction.
//
// The extractor is deliberately restricted to a single caller-supplied
// document type: the subject must bring the same ID class they enrolled
// with, so candidate values of any other type are never considered,
// even when their patterns would also match the OCR text. Auto-detecting
// the type from the image would open a substitution attack.

use tracing::debug;
use veridoc_core::DocumentType;

use crate::registry;

/// Find the best candidate value of `doc_type` inside OCR text.
///
/// The text is upper-cased, then scanned for all non-overlapping matches
/// of the type's recognition pattern. When several candidates exist the
/// longest wins, as a proxy for the most complete capture; ties on
/// length go to the earliest occurrence. Returns `None` when the text
/// contains no syntactically valid value of the expected type — a
/// normal outcome, not an error.
pub fn extract_expected(text: &str, doc_type: DocumentType) -> Option<String> {
    let upper = text.to_uppercase();
    let pattern = registry::pattern(doc_type);

    let mut best: Option<&str> = None;
    let mut candidates = 0usize;
    for found in pattern.find_iter(&upper) {
        candidates += 1;
        // Strictly-greater keeps the first occurrence on a length tie.
        if best.is_none_or(|current| found.len() > current.len()) {
            best = Some(found.as_str());
        }
    }

    debug!(
        doc_type = %doc_type,
        candidates,
        found = best.is_some(),
        "constrained extraction complete"
    );
    best.map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_value_inside_noisy_text() {
        let text = "govt of india\nname: a person\n3425 0653 1151\ndob 01/01/1990";
        assert_eq!(
            extract_expected(text, DocumentType::Aadhaar),
            Some("3425 0653 1151".to_string())
        );
    }

    #[test]
    fn lowercase_input_is_uppercased_before_matching() {
        let text = "permanent account number abcde1234f";
        assert_eq!(
            extract_expected(text, DocumentType::Pan),
            Some("ABCDE1234F".to_string())
        );
    }

    #[test]
    fn absent_pattern_returns_none() {
        let text = "no identity numbers in this text at all";
        assert_eq!(extract_expected(text, DocumentType::Pan), None);
    }

    #[test]
    fn never_returns_a_different_types_value() {
        // Text holds a valid PAN and a valid passport number, but the
        // expected type is aadhaar — the extractor must come up empty.
        let text = "PAN ABCDE1234F PASSPORT P1234567";
        assert_eq!(extract_expected(text, DocumentType::Aadhaar), None);

        // And the converse: constrained to PAN, the passport value is
        // invisible.
        assert_eq!(
            extract_expected(text, DocumentType::Pan),
            Some("ABCDE1234F".to_string())
        );
    }

    #[test]
    fn longest_candidate_wins() {
        // The space-grouped aadhaar capture is 14 characters, the bare
        // one 12 — the longer (more complete) capture is preferred.
        let text = "982663598852 and also 3425 0653 1151";
        assert_eq!(
            extract_expected(text, DocumentType::Aadhaar),
            Some("3425 0653 1151".to_string())
        );
    }

    #[test]
    fn equal_length_candidates_resolve_to_first_occurrence() {
        let text = "first ABCDE1234F then FGHIJ5678K";
        assert_eq!(
            extract_expected(text, DocumentType::Pan),
            Some("ABCDE1234F".to_string())
        );
    }
}
