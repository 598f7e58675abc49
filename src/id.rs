//! ID generation utilities for recsel
//!
//! Provides timestamps and process-unique identifiers for tasks.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a task ID, unique within this process
///
/// Ids start at 1 and increase with every call.
pub fn generate_task_id() -> u64 {
    NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)
}
