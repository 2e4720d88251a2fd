//! Record identifiers
//!
//! Twelve bytes rendered as 24 lowercase hex characters: four bytes of unix
//! seconds, five bytes fixed per process, three bytes of a wrapping counter.
//! Ids generated later in the same process compare greater until the counter
//! wraps within a single second.

use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

fn process_unique() -> &'static [u8; 5] {
    PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen())
}

fn next_count() -> u32 {
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00FF_FFFF)))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00FF_FFFF
}

/// Generate a new 24-character hex id
pub fn new_record_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    encode(secs, process_unique(), next_count())
}

fn encode(secs: u32, unique: &[u8; 5], count: u32) -> String {
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..9].copy_from_slice(unique);
    bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
