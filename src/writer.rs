use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_jsonlines::{JsonLinesWriter, json_lines};

use crate::{
    PitwallError, StrategyConfig,
    strategy::{PitRecommendation, PitRequest, evaluate_pit_recommendation},
};

/// Result of one line of a batch request file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchRecord {
    /// 1-based line number in the request file
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<PitRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluates every request in a JSON Lines file. A bad line produces an error record and
/// does not stop the batch.
pub fn evaluate_requests(
    input: &Path,
    config: &StrategyConfig,
) -> Result<Vec<BatchRecord>, PitwallError> {
    if !input.is_file() {
        return Err(PitwallError::InvalidRequestFile {
            path: format!("{:?}", input),
        });
    }

    let requests =
        json_lines::<PitRequest, _>(input).map_err(|e| PitwallError::RequestReadError { source: e })?;

    let records: Vec<BatchRecord> = requests
        .enumerate()
        .map(|(idx, request)| {
            let line = idx + 1;
            let outcome = request
                .map_err(|e| format!("Malformed request: {}", e))
                .and_then(|request| {
                    evaluate_pit_recommendation(&request, config).map_err(|e| e.to_string())
                });
            match outcome {
                Ok(recommendation) => BatchRecord {
                    line,
                    recommendation: Some(recommendation),
                    error: None,
                },
                Err(error) => {
                    warn!("Request on line {} failed: {}", line, error);
                    BatchRecord {
                        line,
                        recommendation: None,
                        error: Some(error),
                    }
                }
            }
        })
        .collect();

    info!("Evaluated {} requests from {:?}", records.len(), input);
    Ok(records)
}

pub fn write_records<W: Write>(writer: W, records: &[BatchRecord]) -> Result<(), PitwallError> {
    let mut records_writer = JsonLinesWriter::new(writer);
    records_writer
        .write_all(records)
        .map_err(|e| PitwallError::WriterError { source: e })?;
    records_writer
        .flush()
        .map_err(|e| PitwallError::WriterError { source: e })
}

pub fn write_records_to_file(file: &Path, records: &[BatchRecord]) -> Result<(), PitwallError> {
    let results_file = File::create(file).map_err(|e| PitwallError::WriterError { source: e })?;
    write_records(BufWriter::new(results_file), records)
}
