// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Veridoc — batch identity-document verification driver.
//
// Walks every enrolled subject, finds their uploaded document photo,
// runs the verification pipeline, and records outcomes in the ledger.
//
// Usage:
//   veridoc [users.db] [verify.db] [uploads-dir] [ocr-model-dir]
//
// Omitted arguments fall back to the defaults in `AppConfig`. OCR models
// are loaded from the given directory, or from the ocrs cache
// (`~/.cache/ocrs`) when none is given.

mod batch;

use std::path::PathBuf;
use std::process::ExitCode;

use veridoc_core::error::Result;
use veridoc_core::AppConfig;
use veridoc_document::{OcrConfig, OcrEngine, TextExtractor};
use veridoc_verify::{SqliteTrustStore, VerificationLedger, Verifier};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Veridoc batch verification starting");

    match run(config_from_args()) {
        Ok(summary) => {
            tracing::info!(
                passed = summary.passed,
                failed = summary.failed,
                errored = summary.errored,
                skipped = summary.skipped,
                "batch finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "batch aborted");
            ExitCode::FAILURE
        }
    }
}

/// Build the configuration from positional arguments over defaults.
fn config_from_args() -> AppConfig {
    let mut config = AppConfig::default();
    let mut args = std::env::args().skip(1).map(PathBuf::from);

    if let Some(path) = args.next() {
        config.users_db_path = path;
    }
    if let Some(path) = args.next() {
        config.verify_db_path = path;
    }
    if let Some(path) = args.next() {
        config.uploads_dir = path;
    }
    if let Some(path) = args.next() {
        config.ocr_model_dir = Some(path);
    }

    config
}

fn run(config: AppConfig) -> Result<batch::BatchSummary> {
    let ocr_config = match &config.ocr_model_dir {
        Some(dir) => OcrConfig::from_dir(dir),
        None => {
            if !veridoc_document::ocr::models_available() {
                tracing::error!(
                    "OCR models not found in the cache directory; \
                     run `ocrs-cli` once to download them, or pass a model directory \
                     as the fourth argument"
                );
            }
            OcrConfig::default()
        }
    };
    let engine = OcrEngine::new(ocr_config)?;

    let extractor =
        TextExtractor::new(Box::new(engine)).with_denoise(config.denoise_before_binarize);

    // The verifier and the roster walk use separate connections; SQLite
    // WAL mode keeps the concurrent reads consistent.
    let roster = SqliteTrustStore::open(&config.users_db_path)?;
    let verifier_store = SqliteTrustStore::open(&config.users_db_path)?;
    let ledger = VerificationLedger::open(&config.verify_db_path)?;

    let verifier = Verifier::new(Box::new(verifier_store), extractor);

    batch::run(&verifier, &roster, &ledger, &config.uploads_dir)
}
