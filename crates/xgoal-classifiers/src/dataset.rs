//! Model-ready feature matrices and train/test partitioning.
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use crate::data_handling::ShotFrame;
use crate::error::{PipelineError, Result};

/// Columns used as model inputs unless configured otherwise.
pub const DEFAULT_FEATURES: [&str; 7] = [
    "action_start_x",
    "action_start_y",
    "action_is_foot",
    "action_is_head",
    "action_start_dist_to_goal",
    "action1_start_dist_to_goal",
    "action2_start_dist_to_goal",
];

/// The shot's own outcome flag.
pub const DEFAULT_LABEL: &str = "action_result_id";

pub fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect()
}

/// Feature matrix and 0/1 labels, row-aligned with the frame they came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Array1<i32>,
    pub feature_names: Vec<String>,
    /// Position of each row in the source frame
    pub row_ids: Vec<usize>,
}

impl Dataset {
    pub fn new(x: Array2<f32>, y: Array1<i32>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::LengthMismatch {
                left: x.nrows(),
                right: y.len(),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(PipelineError::LengthMismatch {
                left: x.ncols(),
                right: feature_names.len(),
            });
        }
        let row_ids = (0..y.len()).collect();
        Ok(Dataset {
            x,
            y,
            feature_names,
            row_ids,
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_positive(&self) -> usize {
        self.y.iter().filter(|&&v| v == 1).count()
    }

    /// Share of goals. This is also the AUC-PR of a no-skill model.
    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.n_positive() as f64 / self.len() as f64
        }
    }

    pub fn labels_as_bool(&self) -> Vec<bool> {
        self.y.iter().map(|&v| v == 1).collect()
    }

    pub fn filter_by_indices(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
            row_ids: indices.iter().map(|&i| self.row_ids[i]).collect(),
        }
    }

    pub fn log_summary(&self, name: &str) {
        log::info!(
            "{}: {} shots, {} goals ({:.2}%), {} features",
            name,
            self.len(),
            self.n_positive(),
            100.0 * self.positive_rate(),
            self.x.ncols()
        );
    }
}

/// Select `features` as an `f32` matrix and `label` as the target vector.
pub fn assemble(frame: &ShotFrame, features: &[String], label: &str) -> Result<Dataset> {
    // Resolve every column before copying anything.
    let mut columns = Vec::with_capacity(features.len());
    for name in features {
        columns.push(frame.float_values(name)?);
    }
    let labels = frame.int_values(label)?;

    let n_rows = frame.n_rows();
    let n_cols = features.len();
    let mut data = Vec::with_capacity(n_rows * n_cols);
    for row in 0..n_rows {
        for column in &columns {
            data.push(column[row] as f32);
        }
    }
    let x = Array2::from_shape_vec((n_rows, n_cols), data).map_err(|_| {
        PipelineError::LengthMismatch {
            left: n_rows * n_cols,
            right: columns.iter().map(|c| c.len()).sum(),
        }
    })?;

    let y = labels
        .iter()
        .enumerate()
        .map(|(row, &value)| match value {
            0 | 1 => Ok(value as i32),
            _ => Err(PipelineError::InvalidLabel { row, value }),
        })
        .collect::<Result<Array1<i32>>>()?;

    Dataset::new(x, y, features.to_vec())
}

fn shuffled_indices(n: usize, seed: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    match seed {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut thread_rng()),
    }
    indices
}

/// Randomly partition `dataset` into `(train, test)`.
///
/// The test partition holds `round(n * test_size)` rows. Without a seed the
/// split differs between runs.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: Option<u64>) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidSplit(format!(
            "test_size must lie in (0, 1), got {}",
            test_size
        )));
    }
    let n = dataset.len();
    let n_test = (n as f64 * test_size).round() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::InvalidSplit(format!(
            "{} rows with test_size {} leaves an empty partition",
            n, test_size
        )));
    }

    let indices = shuffled_indices(n, seed);
    let (test_idx, train_idx) = indices.split_at(n_test);
    log::debug!(
        "Split {} rows into {} train / {} test (seed: {:?})",
        n,
        train_idx.len(),
        test_idx.len(),
        seed
    );
    Ok((
        dataset.filter_by_indices(train_idx),
        dataset.filter_by_indices(test_idx),
    ))
}

/// Stratified k-fold partition of the rows of `labels` as
/// `(train, validation)` index pairs.
///
/// Rows are shuffled, then goals followed by non-goals are dealt round-robin
/// over the folds, so every fold gets its share of each class and fold sizes
/// differ by at most one row.
pub fn k_fold_indices(labels: &[i32], k: usize, seed: Option<u64>) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    let n = labels.len();
    if k < 2 || k > n {
        return Err(PipelineError::InvalidSplit(format!(
            "cannot make {} folds from {} rows",
            k, n
        )));
    }
    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives > 0 && positives < k {
        log::warn!(
            "Only {} goals for {} folds; some validation folds have no goals",
            positives,
            k
        );
    }

    let (goals, misses): (Vec<usize>, Vec<usize>) = shuffled_indices(n, seed)
        .into_iter()
        .partition(|&i| labels[i] == 1);

    let mut assignment = vec![0usize; n];
    for (position, &row) in goals.iter().chain(misses.iter()).enumerate() {
        assignment[row] = position % k;
    }

    let folds = (0..k)
        .map(|fold| {
            let (validation, train): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&row| assignment[row] == fold);
            (train, validation)
        })
        .collect();
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::{Column, CoordinateScale};
    use std::collections::HashSet;

    fn toy(n: usize) -> Dataset {
        let x = Array2::from_shape_fn((n, 2), |(r, c)| (r * 10 + c) as f32);
        let y = (0..n).map(|i| (i % 10 == 0) as i32).collect();
        Dataset::new(x, y, vec!["a".into(), "b".into()]).unwrap()
    }

    #[test]
    fn split_sizes_for_hundred_rows() {
        let (train, test) = train_test_split(&toy(100), 0.10, Some(7)).unwrap();
        assert_eq!(test.len(), 10);
        assert_eq!(train.len() + test.len(), 100);
    }

    #[test]
    fn split_is_disjoint_and_complete() {
        let (train, test) = train_test_split(&toy(57), 0.25, None).unwrap();
        let train_ids: HashSet<_> = train.row_ids.iter().copied().collect();
        let test_ids: HashSet<_> = test.row_ids.iter().copied().collect();
        assert!(train_ids.is_disjoint(&test_ids));
        let all: HashSet<_> = train_ids.union(&test_ids).copied().collect();
        assert_eq!(all, (0..57).collect::<HashSet<_>>());
    }

    #[test]
    fn split_preserves_row_alignment() {
        let data = toy(40);
        let (train, test) = train_test_split(&data, 0.2, Some(1)).unwrap();
        for part in [&train, &test] {
            for (i, &source) in part.row_ids.iter().enumerate() {
                assert_eq!(part.x[[i, 0]], (source * 10) as f32);
                assert_eq!(part.y[i], data.y[source]);
            }
        }
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let data = toy(30);
        let (_, a) = train_test_split(&data, 0.3, Some(42)).unwrap();
        let (_, b) = train_test_split(&data, 0.3, Some(42)).unwrap();
        assert_eq!(a.row_ids, b.row_ids);
    }

    #[test]
    fn degenerate_split_rejected() {
        assert!(matches!(
            train_test_split(&toy(4), 0.1, None),
            Err(PipelineError::InvalidSplit(_))
        ));
        assert!(train_test_split(&toy(10), 0.0, None).is_err());
        assert!(train_test_split(&toy(10), 1.0, None).is_err());
    }

    #[test]
    fn folds_cover_every_row_once() {
        let labels: Vec<i32> = (0..11).map(|i| (i % 4 == 0) as i32).collect();
        let folds = k_fold_indices(&labels, 3, Some(3)).unwrap();
        let sizes: Vec<_> = folds.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
        let mut seen: Vec<usize> = folds.iter().flat_map(|(_, v)| v.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..11).collect::<Vec<_>>());
        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), 11);
        }
    }

    #[test]
    fn assemble_checks_label_values() {
        let frame = ShotFrame::from_columns(
            vec![
                ("f".to_string(), Column::Float(vec![0.1, 0.2])),
                ("label".to_string(), Column::Int(vec![1, 3])),
            ],
            CoordinateScale::Unit,
        )
        .unwrap();
        assert_eq!(
            assemble(&frame, &["f".to_string()], "label").unwrap_err(),
            PipelineError::InvalidLabel { row: 1, value: 3 }
        );
    }

    #[test]
    fn assemble_missing_feature_is_schema_error() {
        let frame = ShotFrame::from_columns(
            vec![("label".to_string(), Column::Int(vec![0]))],
            CoordinateScale::Unit,
        )
        .unwrap();
        assert_eq!(
            assemble(&frame, &["nope".to_string()], "label").unwrap_err(),
            PipelineError::MissingColumn("nope".to_string())
        );
    }

    #[test]
    fn folds_are_stratified_by_label() {
        // 5 goals in 50 rows: every one of 5 folds must hold exactly one
        let labels: Vec<i32> = (0..50).map(|i| (i % 10 == 3) as i32).collect();
        for seed in 0..20 {
            let folds = k_fold_indices(&labels, 5, Some(seed)).unwrap();
            for (train, validation) in &folds {
                assert_eq!(validation.len(), 10);
                assert_eq!(validation.iter().filter(|&&i| labels[i] == 1).count(), 1);
                assert_eq!(train.iter().filter(|&&i| labels[i] == 1).count(), 4);
            }
        }
    }

    #[test]
    fn too_many_folds_rejected() {
        assert!(matches!(
            k_fold_indices(&[0, 1, 0], 4, None),
            Err(PipelineError::InvalidSplit(_))
        ));
    }

    #[test]
    fn assemble_rows_match_frame_rows() {
        let frame = ShotFrame::from_columns(
            vec![
                ("dist".to_string(), Column::Float(vec![0.15, 0.42, 0.73, 0.91])),
                ("is_head".to_string(), Column::Bool(vec![false, true, false, true])),
                ("x".to_string(), Column::Int(vec![10, 20, 30, 40])),
                ("goal".to_string(), Column::Int(vec![1, 0, 0, 1])),
            ],
            CoordinateScale::Unit,
        )
        .unwrap();
        let features = vec!["x".to_string(), "dist".to_string(), "is_head".to_string()];
        let data = assemble(&frame, &features, "goal").unwrap();

        let dist = frame.float_values("dist").unwrap();
        let head = frame.float_values("is_head").unwrap();
        let x = frame.float_values("x").unwrap();
        let goal = frame.int_values("goal").unwrap();
        assert_eq!(data.x.dim(), (4, 3));
        for row in 0..4 {
            assert_eq!(data.x[[row, 0]], x[row] as f32);
            assert_eq!(data.x[[row, 1]], dist[row] as f32);
            assert_eq!(data.x[[row, 2]], head[row] as f32);
            assert_eq!(data.y[row] as i64, goal[row]);
            assert_eq!(data.row_ids[row], row);
        }
    }
}
