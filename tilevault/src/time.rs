//! Time-related utility functions.
//!
//! Cache timestamps are unix-epoch milliseconds stored as `i64`, which is
//! exactly representable in a SQLite INTEGER column and fine-grained enough
//! to order rapid successive writes.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in unix-epoch milliseconds.
pub fn now_millis() -> i64 {
    unix_millis(SystemTime::now())
}

/// Convert a `SystemTime` to unix-epoch milliseconds.
///
/// Times before the epoch saturate to zero.
pub fn unix_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
