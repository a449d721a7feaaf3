//! Geometric and body-part features for each action slot.
//!
//! For every slot the builder adds `{slot}_start_dist_to_goal` (Euclidean
//! distance from the action's start to the goal centre at (1, 0.5) in the
//! unit square) and the one-hot indicators `{slot}_is_foot`,
//! `{slot}_is_head` and `{slot}_is_other`.

use crate::data_handling::{slot_column, Column, CoordinateScale, ShotFrame, BODYPART_FIELD, SLOTS};
use crate::error::{PipelineError, Result};

/// Goal centre in normalized coordinates.
pub const GOAL_CENTER: (f64, f64) = (1.0, 0.5);

pub const DISTANCE_FIELD: &str = "start_dist_to_goal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Foot,
    Head,
    Other,
}

impl BodyPart {
    pub const ALL: [BodyPart; 3] = [BodyPart::Foot, BodyPart::Head, BodyPart::Other];

    /// Decode the body-part id. Unknown codes map to `None`.
    pub fn from_id(id: i64) -> Option<BodyPart> {
        match id {
            0 => Some(BodyPart::Foot),
            1 => Some(BodyPart::Head),
            2 => Some(BodyPart::Other),
            _ => None,
        }
    }

    pub fn indicator_field(&self) -> &'static str {
        match self {
            BodyPart::Foot => "is_foot",
            BodyPart::Head => "is_head",
            BodyPart::Other => "is_other",
        }
    }
}

pub fn distance_to_goal(x: f64, y: f64) -> f64 {
    let (gx, gy) = GOAL_CENTER;
    ((gx - x).powi(2) + (gy - y).powi(2)).sqrt()
}

/// Names of the columns `build_features` appends, in insertion order.
pub fn feature_columns() -> Vec<String> {
    let mut names = Vec::with_capacity(SLOTS.len() * 4);
    for slot in SLOTS {
        names.push(slot_column(slot, DISTANCE_FIELD));
        for part in BodyPart::ALL {
            names.push(slot_column(slot, part.indicator_field()));
        }
    }
    names
}

/// Return `frame` augmented with 3 distance and 9 indicator columns.
pub fn build_features(frame: &ShotFrame) -> Result<ShotFrame> {
    if frame.scale() != CoordinateScale::Unit {
        return Err(PipelineError::NotNormalized);
    }

    let mut out = frame.clone();
    for slot in SLOTS {
        let xs = frame.float_values(&slot_column(slot, "start_x"))?;
        let ys = frame.float_values(&slot_column(slot, "start_y"))?;
        let distances = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| distance_to_goal(x, y))
            .collect();
        out.insert(slot_column(slot, DISTANCE_FIELD), Column::Float(distances))?;

        let parts: Vec<Option<BodyPart>> = frame
            .int_values(&slot_column(slot, BODYPART_FIELD))?
            .into_iter()
            .map(BodyPart::from_id)
            .collect();
        let unknown = parts.iter().filter(|p| p.is_none()).count();
        if unknown > 0 {
            log::debug!("{} rows of '{}' carry an unknown body part", unknown, slot);
        }
        for part in BodyPart::ALL {
            let flags = parts.iter().map(|p| *p == Some(part)).collect();
            out.insert(slot_column(slot, part.indicator_field()), Column::Bool(flags))?;
        }
    }

    log::debug!("Built {} feature columns for {} shots", feature_columns().len(), out.n_rows());
    Ok(out)
}
