//! CLI command handlers, one per file.

mod replay;
mod scan;
mod send;
mod status;

pub use replay::{run_replay, ReplayOptions};
pub use scan::run_scan;
pub use send::run_send;
pub use status::run_status;
