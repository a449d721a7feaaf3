pub mod shots_csv;

pub use shots_csv::{read_shots, read_shots_with_config, ShotReaderConfig};
