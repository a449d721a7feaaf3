//! Columnar container for shot-event data.
//!
//! `ShotFrame` maps column names to uniformly-typed value sequences; rows are
//! addressed by position and every column has the same length. Each shot row
//! carries three action slots (`action` is the shot itself, `action1` and
//! `action2` the two preceding actions) whose columns are named
//! `{slot}_{field}`.
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// The shot and the two actions that preceded it.
pub const SLOTS: [&str; 3] = ["action", "action1", "action2"];

/// Coordinate fields rescaled by normalization.
pub const X_FIELDS: [&str; 2] = ["start_x", "end_x"];
pub const Y_FIELDS: [&str; 2] = ["start_y", "end_y"];

pub const BODYPART_FIELD: &str = "bodypart_id";
pub const RESULT_FIELD: &str = "result_id";

/// Per-slot fields that must be present for the pipeline to run.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "start_x",
    "start_y",
    "end_x",
    "end_y",
    BODYPART_FIELD,
    RESULT_FIELD,
];

pub fn slot_column(slot: &str, field: &str) -> String {
    format!("{}_{}", slot, field)
}

/// All per-slot columns the loader insists on.
pub fn required_columns() -> Vec<String> {
    SLOTS
        .iter()
        .flat_map(|slot| REQUIRED_FIELDS.iter().map(move |field| slot_column(slot, field)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateScale {
    /// Raw pitch coordinates, x in [0, 105] and y in [0, 68]
    Pitch,
    /// Rescaled into the unit square
    Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Int(_) => "int",
            Column::Float(_) => "float",
            Column::Bool(_) => "bool",
            Column::Text(_) => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Column::Text(_))
    }

    /// Numeric view of a single cell. Booleans read as 0/1, text as `None`.
    pub fn value_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::Int(v) => v.get(row).map(|&x| x as f64),
            Column::Float(v) => v.get(row).copied(),
            Column::Bool(v) => v.get(row).map(|&b| if b { 1.0 } else { 0.0 }),
            Column::Text(_) => None,
        }
    }

    pub fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Bool(v) => Column::Bool(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShotFrame {
    names: Vec<String>,
    columns: HashMap<String, Column>,
    n_rows: usize,
    scale: CoordinateScale,
}

impl ShotFrame {
    /// Build a frame from named columns, in the given order.
    pub fn from_columns(columns: Vec<(String, Column)>, scale: CoordinateScale) -> Result<Self> {
        let mut frame = ShotFrame {
            names: Vec::with_capacity(columns.len()),
            columns: HashMap::with_capacity(columns.len()),
            n_rows: columns.first().map(|(_, c)| c.len()).unwrap_or(0),
            scale,
        };
        for (name, column) in columns {
            frame.insert(name, column)?;
        }
        Ok(frame)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn scale(&self) -> CoordinateScale {
        self.scale
    }

    pub(crate) fn set_scale(&mut self, scale: CoordinateScale) {
        self.scale = scale;
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Read a numeric column as `f64`, failing on text columns.
    pub fn float_values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.require(name)?;
        if !column.is_numeric() {
            return Err(PipelineError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            });
        }
        Ok((0..column.len())
            .filter_map(|row| column.value_f64(row))
            .collect())
    }

    /// Read an integer-coded column. Float columns are accepted when every
    /// value is integral.
    pub fn int_values(&self, name: &str) -> Result<Vec<i64>> {
        let type_error = || PipelineError::ColumnType {
            column: name.to_string(),
            expected: "integer",
        };
        match self.require(name)? {
            Column::Int(v) => Ok(v.clone()),
            Column::Bool(v) => Ok(v.iter().map(|&b| b as i64).collect()),
            Column::Float(v) => v
                .iter()
                .map(|&x| {
                    if x.is_finite() && x.fract() == 0.0 {
                        Ok(x as i64)
                    } else {
                        Err(type_error())
                    }
                })
                .collect(),
            Column::Text(_) => Err(type_error()),
        }
    }

    /// Add a column, or replace an existing one in place.
    pub fn insert(&mut self, name: String, column: Column) -> Result<()> {
        if self.names.is_empty() && self.columns.is_empty() {
            self.n_rows = column.len();
        }
        if column.len() != self.n_rows {
            return Err(PipelineError::LengthMismatch {
                left: self.n_rows,
                right: column.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Rename a column, keeping its position. No-op when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(column) = self.columns.remove(from) {
            if let Some(pos) = self.names.iter().position(|n| n == from) {
                self.names[pos] = to.to_string();
            }
            self.columns.insert(to.to_string(), column);
        }
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn filter_by_indices(&self, indices: &[usize]) -> ShotFrame {
        ShotFrame {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.select(indices)))
                .collect(),
            n_rows: indices.len(),
            scale: self.scale,
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "Loaded {} shots with {} columns ({:?} coordinates)",
            self.n_rows,
            self.n_cols(),
            self.scale
        );
        if let Ok(results) = self.int_values(&slot_column("action", RESULT_FIELD)) {
            let goals = results.iter().filter(|&&v| v == 1).count();
            if self.n_rows > 0 {
                log::info!(
                    "{} goals ({:.2}% conversion)",
                    goals,
                    100.0 * goals as f64 / self.n_rows as f64
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> ShotFrame {
        ShotFrame::from_columns(
            vec![
                ("action_start_x".to_string(), Column::Float(vec![90.0, 100.0, 80.0])),
                ("action_bodypart_id".to_string(), Column::Int(vec![0, 1, 2])),
                (
                    "team".to_string(),
                    Column::Text(vec!["a".into(), "b".into(), "c".into()]),
                ),
            ],
            CoordinateScale::Pitch,
        )
        .unwrap()
    }

    #[test]
    fn required_columns_cover_every_slot() {
        let cols = required_columns();
        assert_eq!(cols.len(), 18);
        assert!(cols.contains(&"action2_bodypart_id".to_string()));
        assert!(cols.contains(&"action1_end_y".to_string()));
    }

    #[test]
    fn insert_rejects_misaligned_column() {
        let mut f = frame();
        let err = f.insert("x".to_string(), Column::Int(vec![1])).unwrap_err();
        assert_eq!(err, PipelineError::LengthMismatch { left: 3, right: 1 });
    }

    #[test]
    fn insert_replaces_without_reordering() {
        let mut f = frame();
        f.insert("action_start_x".to_string(), Column::Float(vec![0.0; 3]))
            .unwrap();
        assert_eq!(f.column_names()[0], "action_start_x");
        assert_eq!(f.n_cols(), 3);
        assert_eq!(f.float_values("action_start_x").unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn text_column_is_not_numeric() {
        let f = frame();
        assert!(matches!(
            f.float_values("team"),
            Err(PipelineError::ColumnType { .. })
        ));
        assert!(f.int_values("team").is_err());
    }

    #[test]
    fn integral_floats_read_as_ints() {
        let f = ShotFrame::from_columns(
            vec![("code".to_string(), Column::Float(vec![0.0, 2.0]))],
            CoordinateScale::Pitch,
        )
        .unwrap();
        assert_eq!(f.int_values("code").unwrap(), vec![0, 2]);
    }

    #[test]
    fn filter_keeps_rows_aligned() {
        let f = frame().filter_by_indices(&[2, 0]);
        assert_eq!(f.n_rows(), 2);
        assert_eq!(f.int_values("action_bodypart_id").unwrap(), vec![2, 0]);
        assert_eq!(f.float_values("action_start_x").unwrap(), vec![80.0, 90.0]);
    }

    #[test]
    fn rename_keeps_position() {
        let mut f = frame();
        f.rename("team", "team_name");
        assert_eq!(f.column_names()[2], "team_name");
        assert!(f.column("team").is_none());
    }
}
