//! LMDB database integrity checks.
//!
//! Run on startup to detect damaged databases before any call is served.

use std::path::Path;

use heed::types::Bytes;
use heed::Env;

use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Database names a valid ballotbox environment contains.
const EXPECTED_DATABASES: &[&str] = &["meta", "candidates", "voters"];

/// Open each expected database and count its entries.
///
/// Read failures are recorded in the report rather than returned as errors.
pub fn check_integrity(env: &Env) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        total_entries: 0,
        errors: Vec::new(),
    };

    let rtxn = env.read_txn()?;

    for &db_name in EXPECTED_DATABASES {
        match env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{db_name}': {e}")),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{db_name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{db_name}': {e}")),
        }
    }

    Ok(report)
}

/// Check that an LMDB data directory looks valid before opening it.
///
/// A nonexistent directory is a fresh start. An existing directory without
/// `data.mdb` points at a misconfigured path.
pub fn check_data_dir(path: &Path) -> Result<(), LmdbError> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() && path.read_dir()?.next().is_some() {
        return Err(LmdbError::ForeignDirectory(path.display().to_string()));
    }
    Ok(())
}
