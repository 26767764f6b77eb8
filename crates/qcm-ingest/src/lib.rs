use std::fs;
use std::path::Path;

use qcm_core::{CatchRecord, CostRecord, LimitRecord, PipelineOutput};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_LIMIT_COLUMN: &str = "limit_1";
const STOCK_ID_COLUMNS: [&str; 2] = ["stock_id1", "stock_id"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: String, column: String },
}

fn reader(path: &Path) -> Result<csv::Reader<fs::File>, IngestError> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let mut rdr = reader(path)?;
    let rows = rdr.deserialize().collect::<Result<Vec<T>, _>>()?;
    debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(rows)
}

pub fn read_catch_records(path: impl AsRef<Path>) -> Result<Vec<CatchRecord>, IngestError> {
    read_rows(path.as_ref())
}

pub fn read_cost_records(path: impl AsRef<Path>) -> Result<Vec<CostRecord>, IngestError> {
    read_rows(path.as_ref())
}

pub fn read_limit_records(
    path: impl AsRef<Path>,
    limit_column: &str,
) -> Result<Vec<LimitRecord>, IngestError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let stock_idx = STOCK_ID_COLUMNS
        .iter()
        .find_map(|name| position(*name))
        .ok_or_else(|| IngestError::MissingColumn {
            path: path.display().to_string(),
            column: STOCK_ID_COLUMNS.join(" | "),
        })?;
    let limit_idx = position(limit_column).ok_or_else(|| IngestError::MissingColumn {
        path: path.display().to_string(),
        column: limit_column.to_string(),
    })?;

    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let cell = |idx: usize| {
            row.get(idx)
                .map(str::to_string)
                .filter(|v| !v.is_empty())
        };
        out.push(LimitRecord {
            stock_id: cell(stock_idx),
            limit: cell(limit_idx),
        });
    }
    debug!(path = %path.display(), rows = out.len(), limit_column, "read acl table");
    Ok(out)
}

pub fn write_report(path: impl AsRef<Path>, output: &PipelineOutput) -> Result<(), IngestError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = serde_json::to_vec_pretty(output)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_report(path: impl AsRef<Path>) -> Result<PipelineOutput, IngestError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
