//! Reading records from JSON files.
//!
//! Accepts either a single JSON array of records or JSON Lines (one record
//! per non-blank line).

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Record;

/// Load all records from a file.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
        .map_err(|e| Error::Other(format!("cannot read records from {}: {e}", path.display())))
}

/// Parse records from a JSON array or JSON Lines text.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line)
            .map_err(|e| Error::Other(format!("line {}: {e}", idx + 1)))?;
        records.push(record);
    }
    Ok(records)
}
