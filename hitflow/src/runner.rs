//! Line-oriented batch driver.
//!
//! Reads one hit per line, writes one JSON row per normalized hit. A bad line
//! or a hit the normalizer rejects is logged, counted and skipped; only I/O
//! and output serialization failures stop the run.

use std::io::{BufRead, Write};
use std::time::Instant;

use normalizer::{HitNormalizer, RawHit};
use shared::{counter, histogram};
use thiserror::Error;

use crate::metrics_defs::{HITS_FAILED, HITS_MALFORMED, HITS_NORMALIZED, NORMALIZE_DURATION};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank input lines
    pub processed: u64,
    pub normalized: u64,
    pub failed: u64,
    pub malformed: u64,
}

fn write_row<W: Write, T: serde::Serialize>(output: &mut W, row: &T) -> Result<(), RunnerError> {
    serde_json::to_writer(&mut *output, row)?;
    output.write_all(b"\n")?;
    Ok(())
}

/// Normalizes newline-delimited JSON hits as emitted by the collector
pub fn normalize_lines<R: BufRead, W: Write>(
    normalizer: &HitNormalizer,
    input: R,
    mut output: W,
) -> Result<RunStats, RunnerError> {
    let mut stats = RunStats::default();

    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        stats.processed += 1;

        let raw: RawHit = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "Skipping undecodable hit");
                counter!(HITS_MALFORMED).increment(1);
                stats.malformed += 1;
                continue;
            }
        };

        let start = Instant::now();
        let result = normalizer.normalize(&raw);
        histogram!(NORMALIZE_DURATION).record(start.elapsed().as_secs_f64());

        match result {
            Ok(hit) => {
                write_row(&mut output, &hit)?;
                counter!(HITS_NORMALIZED).increment(1);
                stats.normalized += 1;
            }
            Err(e) => {
                tracing::warn!(
                    line = line_no + 1,
                    reason = e.reason(),
                    error = %e,
                    "Failed to normalize hit"
                );
                counter!(HITS_FAILED, "reason" => e.reason()).increment(1);
                stats.failed += 1;
            }
        }
    }

    output.flush()?;
    Ok(stats)
}

/// Decodes raw URL-encoded payloads, one per line, into RawHit JSON
pub fn decode_lines<R: BufRead, W: Write>(
    input: R,
    mut output: W,
) -> Result<RunStats, RunnerError> {
    let mut stats = RunStats::default();

    for line in input.lines() {
        let line = line?;
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }
        stats.processed += 1;

        write_row(&mut output, &RawHit::from_query_string(payload))?;
        stats.normalized += 1;
    }

    output.flush()?;
    Ok(stats)
}
