//! Wall-clock timestamps used for creation and modification fields.

use chrono::{DateTime, Local};

/// A local-zone wall-clock time with sub-second resolution.
pub type Timestamp = DateTime<Local>;

/// Returns the current local time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now()
}
