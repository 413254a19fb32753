//! Control affordance rendered as log lines.

use feedgrab_core::dom::NodeKey;
use feedgrab_core::surface::Indicator;

pub struct LogIndicator;

impl Indicator for LogIndicator {
    fn show_running(&self, item: NodeKey) {
        println!("[{:016x}] running", item.0);
        tracing::info!(item = item.0, "control: running");
    }

    fn pulse(&self, item: NodeKey, glow: u8) {
        tracing::trace!(item = item.0, glow, "control: pulse");
    }

    fn show_idle(&self, item: NodeKey) {
        println!("[{:016x}] idle", item.0);
        tracing::info!(item = item.0, "control: idle");
    }
}
