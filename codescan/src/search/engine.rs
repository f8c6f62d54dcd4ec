use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::matcher::PatternMatcher;
use super::processor::FileProcessor;
use crate::config::SearchConfig;
use crate::errors::ScanResult;
use crate::filters::PathFilter;
use crate::results::{FileResult, SearchResult};
use crate::walker;

// Files per rayon chunk, bounded to balance scheduling overhead against
// load balancing.
const MIN_CHUNK_SIZE: usize = 16;
const MAX_CHUNK_SIZE: usize = 256;

/// Cooperative cancellation flag, checked between files.
///
/// Cancelling stops the scan early; whatever has been aggregated up to that
/// point is returned as a complete, consistent `SearchResult`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Performs a concurrent scan across the files under the configured root.
pub fn search(config: &SearchConfig) -> ScanResult<SearchResult> {
    search_with_cancel(config, &CancelToken::new())
}

/// Like [`search`], but stops early once `cancel` is triggered.
pub fn search_with_cancel(
    config: &SearchConfig,
    cancel: &CancelToken,
) -> ScanResult<SearchResult> {
    info!("Starting search for pattern: {:?}", config.pattern);

    // All configuration failures surface here, before any traversal work.
    config.validate()?;
    let matcher = PatternMatcher::new(config)?;
    let filter = Arc::new(PathFilter::new(config)?);

    let start = Instant::now();
    let files = walker::find_files(&config.root_path, &filter);
    debug!("Found {} files to process", files.len());

    let processor = FileProcessor::new(matcher, config.context_lines);

    let thread_count = config.thread_count.get();
    let chunk_size = (files.len() / thread_count).clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);

    // One outcome per file actually attempted, in traversal order; `None`
    // marks a skipped file. Files behind a triggered cancel token produce
    // no outcome at all.
    let outcomes: Vec<Option<FileResult>> = files
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            chunk
                .iter()
                .filter(|_| !cancel.is_cancelled())
                .map(|path| processor.process_file(path))
                .collect::<Vec<_>>()
        })
        .collect();

    // Single aggregation point: counters and ordering are maintained here
    // only, so the parallelism degree never affects the result.
    let mut result = SearchResult::new();
    for outcome in outcomes {
        match outcome {
            Some(file_result) => result.add_file_result(file_result),
            None => result.record_skipped(),
        }
    }
    result.elapsed_seconds = start.elapsed().as_secs_f64();

    info!(
        "Search complete. Found {} matches in {} of {} files",
        result.total_matches, result.files_matched, result.files_scanned
    );

    Ok(result)
}
