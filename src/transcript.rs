use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read every record of a line-delimited JSON transcript, in order.
///
/// Fails open: a missing file, an I/O error, or any malformed line yields an
/// empty transcript so the session is allowed to stop.
pub fn read_records(transcript_path: &str) -> Vec<Value> {
    match try_read_records(Path::new(transcript_path)) {
        Ok(records) => {
            tracing::debug!("read {} transcript records", records.len());
            records
        }
        Err(e) => {
            tracing::warn!("treating transcript as empty: {e:#}");
            Vec::new()
        }
    }
}

fn try_read_records(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open transcript: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(line).with_context(|| {
            format!("Malformed record at {}:{}", path.display(), lineno + 1)
        })?;
        records.push(record);
    }

    Ok(records)
}
