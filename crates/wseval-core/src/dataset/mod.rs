//! Evaluation corpus: sampling per-intent source files into one JSONL file and
//! projecting its lines onto model input / target output pairs.

pub mod convert;

use crate::errors::DatasetError;
use crate::model::{EvalRecord, Sample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_FIELD: &str = "Question";
pub const DEFAULT_ANSWER_FIELD: &str = "Reponse";
pub const DEFAULT_INTENT_FIELD: &str = "Intent";

/// Which file to read and which fields hold the prompt and the expected output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub uri: PathBuf,
    pub input_location: String,
    pub target_location: String,
}

impl DatasetConfig {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<PathBuf>,
        input_location: impl Into<String>,
        target_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            input_location: input_location.into(),
            target_location: target_location.into(),
        }
    }
}

/// Reads at most `limit` samples. Blank lines are skipped and do not count.
pub fn load_samples(config: &DatasetConfig, limit: usize) -> Result<Vec<Sample>, DatasetError> {
    let path = config.uri.as_path();
    let file = fs::File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let mut samples = Vec::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        if samples.len() >= limit {
            break;
        }
        let line = line.map_err(|e| DatasetError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(&line).map_err(|source| DatasetError::Json {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        let field = |name: &str| {
            value
                .get(name)
                .and_then(|v| v.as_str())
                .map(ToString::to_string)
                .ok_or_else(|| DatasetError::MissingField {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    field: name.to_string(),
                })
        };
        samples.push(Sample {
            index: samples.len(),
            model_input: field(config.input_location.as_str())?,
            target_output: field(config.target_location.as_str())?,
        });
    }
    Ok(samples)
}

/// All `*.jsonl` files below `folder`, sorted so sampling is reproducible.
pub fn find_jsonl_files(folder: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut out = Vec::new();
    collect_jsonl_inner(folder, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_jsonl_inner(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DatasetError> {
    for entry in fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))? {
        let entry = entry.map_err(|e| DatasetError::io(dir, e))?;
        let path = entry.path();
        let ft = entry.file_type().map_err(|e| DatasetError::io(&path, e))?;
        if ft.is_dir() {
            collect_jsonl_inner(&path, out)?;
        } else if ft.is_file() && path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            out.push(path);
        }
    }
    Ok(())
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(idx, l)| {
            serde_json::from_str(l).map_err(|source| DatasetError::Json {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}

/// Takes every record of a file holding fewer than `per_file` records, otherwise
/// a uniform sample of `per_file` of them. File order is preserved.
pub fn combine_files(
    files: &[PathBuf],
    per_file: usize,
    seed: u64,
) -> Result<Vec<EvalRecord>, DatasetError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut combined = Vec::new();
    for file in files {
        let records: Vec<EvalRecord> = read_jsonl(file)?;
        let taken = if records.len() < per_file {
            records
        } else {
            records
                .choose_multiple(&mut rng, per_file)
                .cloned()
                .collect()
        };
        tracing::debug!("sampled {} records from {}", taken.len(), file.display());
        combined.extend(taken);
    }
    Ok(combined)
}

pub fn combine_from_folder(
    folder: &Path,
    per_file: usize,
    seed: u64,
) -> Result<Vec<EvalRecord>, DatasetError> {
    let files = find_jsonl_files(folder)?;
    if files.is_empty() {
        tracing::warn!("no .jsonl files found under {}", folder.display());
    }
    combine_files(&files, per_file, seed)
}

pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
    }
    let file = fs::File::create(path).map_err(|e| DatasetError::io(path, e))?;
    let mut w = BufWriter::new(file);
    for record in records {
        let line = serde_json::to_string(record).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            line: 0,
            source,
        })?;
        writeln!(w, "{}", line).map_err(|e| DatasetError::io(path, e))?;
    }
    w.flush().map_err(|e| DatasetError::io(path, e))
}
