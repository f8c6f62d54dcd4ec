//! The search pipeline: pattern compilation, per-file scanning, and the
//! concurrent engine that ties them to the walker and the aggregated result.
//!
//! [`PatternMatcher`] and the path filter are built once from the resolved
//! configuration and shared read-only across every worker; the aggregation
//! step in [`engine`] is the only point of mutation, so output order and
//! counters stay deterministic regardless of the parallelism degree.

pub mod engine;
pub mod matcher;
pub mod processor;

pub use engine::{search, search_with_cancel, CancelToken};
pub use matcher::PatternMatcher;
pub use processor::FileProcessor;
