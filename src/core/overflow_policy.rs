//! Overflow policies for the dispatch queue
//!
//! When every worker is busy and the bounded queue is full, the policy decides
//! what happens to the record the caller just produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling a full dispatch queue
///
/// Records with [`LogPriority::Critical`] bypass the policy and are written
/// synchronously on the caller's thread.
///
/// # Example
///
/// ```
/// use sink_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::AlertAndDrop);
///
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the new record silently, counting it in metrics
    DropNewest,

    /// Wait until a worker frees a slot
    ///
    /// Applies backpressure to the calling thread.
    Block,

    /// Wait up to the timeout, then drop with an alert
    BlockWithTimeout(Duration),

    /// Drop the record and alert on stderr and through the overflow callback
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    /// Accepts `drop`, `block`, `alert`, or `block:<millis>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Some(ms) = lower.strip_prefix("block:") {
            return ms
                .trim()
                .parse::<u64>()
                .map(|ms| OverflowPolicy::BlockWithTimeout(Duration::from_millis(ms)))
                .map_err(|_| format!("Invalid overflow timeout: '{}'", s));
        }
        match lower.as_str() {
            "drop" | "dropnewest" | "drop_newest" => Ok(OverflowPolicy::DropNewest),
            "block" => Ok(OverflowPolicy::Block),
            "alert" | "alertanddrop" | "alert_and_drop" => Ok(OverflowPolicy::AlertAndDrop),
            _ => Err(format!("Invalid overflow policy: '{}'", s)),
        }
    }
}

/// Priority level for record preservation during overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum LogPriority {
    /// INFO, DEBUG, PRINT
    #[default]
    Normal = 0,
    /// WARNING, NOTICE
    High = 1,
    /// EMERGENCY through ERROR; never dropped
    Critical = 2,
}

impl fmt::Display for LogPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogPriority::Normal => write!(f, "Normal"),
            LogPriority::High => write!(f, "High"),
            LogPriority::Critical => write!(f, "Critical"),
        }
    }
}

/// Callback invoked when records are dropped because the queue is full.
/// The argument is the running total of dropped records.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
