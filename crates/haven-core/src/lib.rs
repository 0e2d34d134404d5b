//! Foundational low-level utilities shared across Haven crates.
//!
//! Provides atomic file-write helpers, append-only JSONL persistence, and
//! time utilities used by the audit stores and recency calculations.

pub mod atomic_io;
pub mod jsonl_store;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use jsonl_store::{append_jsonl_record, read_jsonl_records};
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms, is_within_window_ms};
