// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format registry — one recognition pattern and one canonicalization
// rule per document type.
//
// Patterns are compiled once on first use and shared read-only for the
// lifetime of the process. They are written for upper-cased input: the
// extractor upper-cases OCR text before matching, so the patterns only
// need the [A-Z] alphabet.

use std::sync::LazyLock;

use regex::Regex;
use veridoc_core::DocumentType;

/// Aadhaar: 12 digits, leading digit 2-9, optionally space-grouped 4-4-4.
static AADHAAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[2-9][0-9]{3}\s?[0-9]{4}\s?[0-9]{4}\b").expect("aadhaar pattern must compile")
});

/// PAN: 5 letters + 4 digits + 1 letter.
static PAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{5}[0-9]{4}[A-Z]\b").expect("pan pattern must compile"));

/// Passport: 1 letter + 7 digits.
static PASSPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][0-9]{7}\b").expect("passport pattern must compile"));

/// Voter ID: 3 letters + 7 digits.
static VOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3}[0-9]{7}\b").expect("voter pattern must compile"));

/// The recognition pattern for a document type.
///
/// Total over the closed [`DocumentType`] set — unknown type tags are
/// rejected earlier, when the stored string is parsed into the enum.
pub fn pattern(doc_type: DocumentType) -> &'static Regex {
    match doc_type {
        DocumentType::Aadhaar => &AADHAAR,
        DocumentType::Pan => &PAN,
        DocumentType::Passport => &PASSPORT,
        DocumentType::Voter => &VOTER,
    }
}

/// Canonicalize a raw identity value for comparison: uppercase, all
/// whitespace removed.
///
/// Total over arbitrary strings and idempotent. The rule does not
/// currently vary by type, but the signature keeps the type so a
/// future format can normalize differently (e.g. stripping separators
/// specific to one document class).
pub fn canonicalize(raw: &str, _doc_type: DocumentType) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_uppercases_and_strips_whitespace() {
        assert_eq!(
            canonicalize("3425 0653 1151", DocumentType::Aadhaar),
            "342506531151"
        );
        assert_eq!(
            canonicalize("abcde\t1234 f\n", DocumentType::Pan),
            "ABCDE1234F"
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let inputs = ["3425 0653 1151", "abcde1234f", "  P 1234567 ", "", "ÄÖÜ 12"];
        for raw in inputs {
            let once = canonicalize(raw, DocumentType::Passport);
            let twice = canonicalize(&once, DocumentType::Passport);
            assert_eq!(once, twice, "canonicalize must be idempotent for {raw:?}");
        }
    }

    #[test]
    fn canonicalize_is_total() {
        // Any string input must produce a value, never panic.
        let _ = canonicalize("\u{0000}\u{FFFD} odd \r\n input", DocumentType::Voter);
    }

    #[test]
    fn aadhaar_pattern_accepts_grouped_and_ungrouped() {
        let pat = pattern(DocumentType::Aadhaar);
        assert!(pat.is_match("3425 0653 1151"));
        assert!(pat.is_match("342506531151"));
        // Leading digit below 2 is invalid.
        assert!(!pat.is_match("142506531151"));
    }

    #[test]
    fn pan_pattern_shape() {
        let pat = pattern(DocumentType::Pan);
        assert!(pat.is_match("ABCDE1234F"));
        assert!(!pat.is_match("ABCD1234F"));
        assert!(!pat.is_match("ABCDE12345"));
    }

    #[test]
    fn passport_and_voter_shapes() {
        assert!(pattern(DocumentType::Passport).is_match("P1234567"));
        assert!(!pattern(DocumentType::Passport).is_match("PP1234567"));
        assert!(pattern(DocumentType::Voter).is_match("ABC1234567"));
        assert!(!pattern(DocumentType::Voter).is_match("AB1234567"));
    }

    #[test]
    fn patterns_match_inside_surrounding_text() {
        let text = "GOVERNMENT OF INDIA\nNAME: TEST PERSON\n3425 0653 1151\nDOB 01/01/1990";
        assert!(pattern(DocumentType::Aadhaar).is_match(text));
    }
}
