pub mod cli;
pub mod pipeline;
pub mod util;
