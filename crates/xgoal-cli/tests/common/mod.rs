//! Synthetic shot tables shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use xgoal_classifiers::data_handling::SLOTS;

const FIELDS: [&str; 10] = [
    "game_id",
    "period_id",
    "time_seconds",
    "bodypart_id",
    "result_id",
    "type_id",
    "start_x",
    "start_y",
    "end_x",
    "end_y",
];

/// Deterministic value in [0, 1) for row `i` and stream `k`.
fn jitter(i: usize, k: usize) -> f64 {
    ((i * 7919 + k * 104_729) % 1000) as f64 / 1000.0
}

/// `n` shots in pitch coordinates, every tenth one a goal. Goals are taken
/// from close range so the shot location alone separates the classes.
pub fn shot_rows(n: usize, delimiter: char) -> String {
    let mut header = Vec::new();
    for slot in SLOTS {
        for field in FIELDS {
            header.push(format!("{}_{}", slot, field));
        }
    }
    let mut out = header.join(&delimiter.to_string());
    out.push('\n');

    for i in 0..n {
        let goal = i % 10 == 0;
        let mut cells: Vec<String> = Vec::new();
        for (s, _) in SLOTS.iter().enumerate() {
            let (x, y, result, body) = if s == 0 {
                if goal {
                    (97.0 + 8.0 * jitter(i, 1), 28.0 + 12.0 * jitter(i, 2), 1, (i / 10) % 2)
                } else {
                    (60.0 + 36.0 * jitter(i, 1), 5.0 + 58.0 * jitter(i, 2), 0, i % 3)
                }
            } else {
                (30.0 + 60.0 * jitter(i, 3 + s), 68.0 * jitter(i, 5 + s), i % 2, 0)
            };
            cells.push((i / 50).to_string());
            cells.push((1 + i % 2).to_string());
            cells.push(format!("{:.1}", 2700.0 * jitter(i, 9)));
            cells.push(body.to_string());
            cells.push(result.to_string());
            cells.push(if s == 0 { "11".to_string() } else { "0".to_string() });
            cells.push(format!("{:.2}", x));
            cells.push(format!("{:.2}", y));
            cells.push(format!("{:.2}", if s == 0 { 105.0 } else { x + 5.0_f64.min(105.0 - x) }));
            cells.push(format!("{:.2}", if s == 0 { 34.0 } else { y }));
        }
        out.push_str(&cells.join(&delimiter.to_string()));
        out.push('\n');
    }
    out
}

pub fn write_shots(path: &Path, n: usize) {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") => '\t',
        _ => ',',
    };
    fs::write(path, shot_rows(n, delimiter)).unwrap();
}
