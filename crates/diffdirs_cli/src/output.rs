//! Progress output for the host

use diffdirs_bootstrap::{ProgressEvent, ProgressSink};
use tracing::warn;

/// Prints each event as one JSON object per line on stdout.
pub struct JsonLinesSink;

impl ProgressSink for JsonLinesSink {
    fn emit(&self, event: ProgressEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize progress event: {}", e),
        }
    }
}
