use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use fraudml_core::{LabeledDataset, Matrix, FEATURE_NAMES, LABEL_COLUMN, NUM_FEATURES};
use tracing::{debug, info};

use crate::error::{IoError, IoResult};

/// Field values treated as absent (compared case-insensitively, trimmed).
const MISSING_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "<na>", "-1.#ind", "1.#qnan",
];

pub fn is_missing(field: &str) -> bool {
    let trimmed = field.trim();
    MISSING_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// Labeled transactions read from CSV, with the count of rows dropped for
/// missing values.
#[derive(Debug, Clone)]
pub struct TransactionData {
    pub dataset: LabeledDataset,
    pub dropped_rows: usize,
}

/// Read the labeled transaction CSV at `path`.
pub fn read_transactions(path: impl AsRef<Path>) -> IoResult<TransactionData> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let data = read_transactions_from(file)?;
    info!(
        path = %path.display(),
        rows = data.dataset.len(),
        dropped = data.dropped_rows,
        "loaded transactions"
    );
    Ok(data)
}

/// Read labeled transactions from any reader.
///
/// Columns are located by header name and reordered into the schema order;
/// extra columns are ignored. A row with any missing feature or label is
/// dropped whole.
pub fn read_transactions_from<R: Read>(reader: R) -> IoResult<TransactionData> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| IoError::MissingColumn(name.to_string()))
    };
    let feature_cols: Vec<usize> = FEATURE_NAMES.iter().map(|n| position(n)).collect::<IoResult<_>>()?;
    let label_col = position(LABEL_COLUMN)?;

    let mut features = Matrix::with_capacity(NUM_FEATURES, 0)?;
    let mut labels = Vec::new();
    let mut dropped_rows = 0;
    let mut row = vec![0.0; NUM_FEATURES];

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based data row number, header excluded
        let row_no = line + 1;
        let field = |col: usize| record.get(col).unwrap_or("");

        if feature_cols.iter().chain(std::iter::once(&label_col)).any(|&c| is_missing(field(c))) {
            dropped_rows += 1;
            continue;
        }

        for ((slot, &col), name) in row.iter_mut().zip(&feature_cols).zip(FEATURE_NAMES.iter()) {
            let raw = field(col).trim();
            *slot = raw.parse::<f64>().map_err(|_| IoError::Parse {
                row: row_no,
                column: (*name).to_string(),
                value: raw.to_string(),
            })?;
        }
        labels.push(parse_label(field(label_col), row_no)?);
        features.push_row(&row)?;
    }

    if dropped_rows > 0 {
        debug!(dropped_rows, "dropped rows with missing values");
    }
    Ok(TransactionData { dataset: LabeledDataset::new(features, labels)?, dropped_rows })
}

fn parse_label(raw: &str, row: usize) -> IoResult<u8> {
    let invalid = || IoError::InvalidLabel { row, value: raw.to_string() };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(invalid())
    }
}

/// Create the parent directory of `path` if it has one.
pub(crate) fn create_parent(path: &Path) -> IoResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| IoError::file(dir, e))
        }
        _ => Ok(()),
    }
}

fn csv_writer(path: &Path) -> IoResult<csv::Writer<fs::File>> {
    create_parent(path)?;
    let file = fs::File::create(path).map_err(|e| IoError::file(path, e))?;
    Ok(csv::Writer::from_writer(file))
}

/// Per-row test-set predictions for the predictions report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRecord {
    pub actual: u8,
    pub predicted: u8,
    pub probability: f64,
}

/// Write raw feature values in schema order followed by
/// `Actual,Predicted,Probability`.
pub fn write_predictions(
    path: impl AsRef<Path>,
    raw_features: &Matrix,
    predictions: &[PredictionRecord],
) -> IoResult<()> {
    let path = path.as_ref();
    write_predictions_to(csv_writer(path)?, raw_features, predictions)?;
    info!(path = %path.display(), rows = predictions.len(), "wrote predictions report");
    Ok(())
}

pub fn write_predictions_to<W: Write>(
    mut wtr: csv::Writer<W>,
    raw_features: &Matrix,
    predictions: &[PredictionRecord],
) -> IoResult<()> {
    if raw_features.n_rows() != predictions.len() || raw_features.n_cols() != NUM_FEATURES {
        return Err(IoError::ReportShape {
            expected: vec![predictions.len(), NUM_FEATURES],
            got: vec![raw_features.n_rows(), raw_features.n_cols()],
        });
    }
    let header = FEATURE_NAMES
        .iter()
        .copied()
        .chain(["Actual", "Predicted", "Probability"]);
    wtr.write_record(header)?;

    let mut record = Vec::with_capacity(NUM_FEATURES + 3);
    for (row, p) in raw_features.rows_iter().zip(predictions) {
        record.clear();
        record.extend(row.iter().map(f64::to_string));
        record.push(p.actual.to_string());
        record.push(p.predicted.to_string());
        record.push(p.probability.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(|e| IoError::file("<predictions>", e))?;
    Ok(())
}

/// Write `Feature,Importance` rows in the given order.
pub fn write_feature_importances(path: impl AsRef<Path>, ranked: &[(String, f64)]) -> IoResult<()> {
    let path = path.as_ref();
    let mut wtr = csv_writer(path)?;
    wtr.write_record(["Feature", "Importance"])?;
    for (name, importance) in ranked {
        wtr.write_record([name.as_str(), importance.to_string().as_str()])?;
    }
    wtr.flush().map_err(|e| IoError::file(path, e))?;
    info!(path = %path.display(), features = ranked.len(), "wrote feature importance report");
    Ok(())
}
