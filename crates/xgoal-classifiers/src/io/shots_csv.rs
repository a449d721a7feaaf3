//! Shot-event CSV/TSV reader.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data_handling::{required_columns, Column, CoordinateScale, ShotFrame, SLOTS};
use crate::error::PipelineError;

/// Configuration for reading shot-event tables.
#[derive(Debug, Clone)]
pub struct ShotReaderConfig {
    /// Field delimiter. When `None` it is inferred from the file extension.
    pub delimiter: Option<u8>,
    /// Alternative spellings of per-slot fields, mapped to canonical names.
    pub field_aliases: Vec<(String, String)>,
}

impl Default for ShotReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            field_aliases: vec![("body_part_id".to_string(), "bodypart_id".to_string())],
        }
    }
}

/// Read a shot table using the default configuration.
pub fn read_shots<P: AsRef<Path>>(path: P) -> Result<ShotFrame> {
    read_shots_with_config(path, &ShotReaderConfig::default())
}

/// Read a shot table and validate its schema.
///
/// Every per-slot coordinate, body-part and result column must be present
/// (checked on the header before any row is parsed) and must hold finite
/// numeric values.
pub fn read_shots_with_config<P: AsRef<Path>>(path: P, config: &ShotReaderConfig) -> Result<ShotFrame> {
    let path = path.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| infer_delimiter(path));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open shot file: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read shot header row")?
        .clone();
    let names = canonical_headers(&headers, config);

    for required in required_columns() {
        if !names.iter().any(|n| n == &required) {
            return Err(anyhow::Error::new(PipelineError::MissingColumn(required))
                .context(format!("Invalid shot schema in {}", path.display())));
        }
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        for (col_idx, values) in raw.iter_mut().enumerate() {
            let value = record
                .get(col_idx)
                .ok_or_else(|| anyhow!("Missing value for '{}' at row {}", names[col_idx], row_idx + 1))?;
            values.push(value.trim().to_string());
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for (name, values) in names.into_iter().zip(raw) {
        // pandas writes an unnamed index column
        if name.is_empty() {
            continue;
        }
        columns.push((name, infer_column(values)));
    }

    let frame = ShotFrame::from_columns(columns, CoordinateScale::Pitch)?;
    validate_required(&frame)
        .with_context(|| format!("Invalid shot schema in {}", path.display()))?;

    log::debug!(
        "Read {} rows x {} columns from {}",
        frame.n_rows(),
        frame.n_cols(),
        path.display()
    );
    Ok(frame)
}

fn infer_delimiter(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

fn canonical_headers(headers: &StringRecord, config: &ShotReaderConfig) -> Vec<String> {
    headers
        .iter()
        .map(|header| {
            let header = header.trim();
            for slot in SLOTS {
                for (alias, canonical) in &config.field_aliases {
                    if header == format!("{}_{}", slot, alias) {
                        return format!("{}_{}", slot, canonical);
                    }
                }
            }
            header.to_string()
        })
        .collect()
}

/// Pick the narrowest column type every value parses as. Empty cells force a
/// float column holding NaN.
fn infer_column(values: Vec<String>) -> Column {
    if let Ok(ints) = values.iter().map(|v| v.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        return Column::Int(ints);
    }
    let floats = values
        .iter()
        .map(|v| {
            if v.is_empty() {
                Ok(f64::NAN)
            } else {
                v.parse::<f64>()
            }
        })
        .collect::<Result<Vec<_>, _>>();
    if let Ok(floats) = floats {
        if !floats.is_empty() && floats.iter().all(|x| x.is_nan()) {
            return Column::Text(values);
        }
        return Column::Float(floats);
    }
    if let Some(bools) = values.iter().map(|v| parse_bool(v)).collect::<Option<Vec<_>>>() {
        return Column::Bool(bools);
    }
    Column::Text(values)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn validate_required(frame: &ShotFrame) -> std::result::Result<(), PipelineError> {
    for name in required_columns() {
        let values = frame.float_values(&name)?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::ColumnType {
                column: name,
                expected: "finite numeric",
            });
        }
    }
    Ok(())
}
