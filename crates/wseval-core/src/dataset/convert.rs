//! `;`-separated CSV <-> JSONL conversion for hand-edited source datasets.

use crate::errors::DatasetError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const DELIMITER: u8 = b';';

pub fn csv_to_jsonl(csv_path: &Path, jsonl_path: &Path) -> Result<usize, DatasetError> {
    let csv_err = |source| DatasetError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_path(csv_path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        rows.push(serde_json::Value::Object(row));
    }
    super::write_jsonl(jsonl_path, &rows)?;
    Ok(rows.len())
}

/// Column set comes from the first record; later records missing a column get an empty cell.
pub fn jsonl_to_csv(jsonl_path: &Path, csv_path: &Path) -> Result<usize, DatasetError> {
    let rows: Vec<serde_json::Value> = super::read_jsonl(jsonl_path)?;
    let Some(first) = rows.first().and_then(|r| r.as_object()) else {
        return Err(DatasetError::Empty(jsonl_path.to_path_buf()));
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
    }
    let csv_err = |source| DatasetError::Csv {
        path: csv_path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(csv_path)
        .map_err(csv_err)?;
    writer.write_record(&columns).map_err(csv_err)?;

    for row in &rows {
        let cells: BTreeMap<&str, String> = row
            .as_object()
            .map(|o| {
                o.iter()
                    .map(|(k, v)| {
                        let cell = match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.as_str(), cell)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let record: Vec<&str> = columns
            .iter()
            .map(|c| cells.get(c.as_str()).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| DatasetError::io(csv_path, e))?;
    Ok(rows.len())
}
