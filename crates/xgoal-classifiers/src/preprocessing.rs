//! Coordinate normalization.
//!
//! Raw event coordinates are expressed on a 105 x 68 pitch. The feature
//! builder works in the unit square, so every `start_*`/`end_*` column of the
//! three action slots is divided by the pitch dimensions exactly once. The
//! frame remembers its scale and refuses a second pass.

use crate::data_handling::{slot_column, Column, CoordinateScale, ShotFrame, SLOTS, X_FIELDS, Y_FIELDS};
use crate::error::{PipelineError, Result};

pub const PITCH_LENGTH: f64 = 105.0;
pub const PITCH_WIDTH: f64 = 68.0;

/// Return a copy of `frame` with all coordinate columns rescaled to [0, 1].
///
/// Values outside the pitch are still rescaled; they are counted and reported
/// as a data-quality warning.
pub fn normalize_coordinates(frame: &ShotFrame) -> Result<ShotFrame> {
    if frame.scale() == CoordinateScale::Unit {
        return Err(PipelineError::AlreadyNormalized);
    }

    let mut out = frame.clone();
    let mut out_of_bounds = 0usize;

    for slot in SLOTS {
        for (fields, extent) in [(X_FIELDS, PITCH_LENGTH), (Y_FIELDS, PITCH_WIDTH)] {
            for field in fields {
                let name = slot_column(slot, field);
                let values = frame.float_values(&name)?;
                out_of_bounds += values
                    .iter()
                    .filter(|&&v| !(0.0..=extent).contains(&v))
                    .count();
                out.insert(name, Column::Float(values.iter().map(|v| v / extent).collect()))?;
            }
        }
    }

    if out_of_bounds > 0 {
        log::warn!(
            "{} coordinate values fall outside the {}x{} pitch; normalized values will leave [0, 1]",
            out_of_bounds,
            PITCH_LENGTH,
            PITCH_WIDTH
        );
    }

    out.set_scale(CoordinateScale::Unit);
    Ok(out)
}
