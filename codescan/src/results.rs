use serde::Serialize;
use std::path::PathBuf;

/// A single match within a file, with its surrounding context.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    /// 1-based line number of the matched line
    pub line_number: usize,
    /// Content of the matched line, without the trailing newline
    pub line_content: String,
    /// Byte offset where the match starts within the line
    pub start: usize,
    /// Byte offset one past the end of the match within the line
    pub end: usize,
    /// Up to `context_lines` (line number, text) pairs preceding the match,
    /// truncated at the start of the file
    pub context_before: Vec<(usize, String)>,
    /// Up to `context_lines` (line number, text) pairs following the match,
    /// truncated at the end of the file
    pub context_after: Vec<(usize, String)>,
}

/// All matches found in a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// The path to the file
    pub path: PathBuf,
    /// Matches in line order
    pub matches: Vec<Match>,
    /// Total number of lines in the file
    pub line_count: usize,
}

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchSummary {
    pub files_scanned: usize,
    pub files_matched: usize,
    pub total_matches: usize,
    pub elapsed_seconds: f64,
}

/// The complete, materialized result of one scan.
///
/// File results appear in traversal order and all of one file's matches are
/// contiguous. Counters are only ever touched through [`add_file_result`]
/// and [`record_skipped`], the single aggregation point the parallel scan
/// funnels into.
///
/// [`add_file_result`]: SearchResult::add_file_result
/// [`record_skipped`]: SearchResult::record_skipped
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// Per-file results, only for files with at least one match
    pub file_results: Vec<FileResult>,
    /// Total number of files scanned, including skips and zero-match files
    pub files_scanned: usize,
    /// Number of files with at least one match
    pub files_matched: usize,
    /// Total number of matches across all files
    pub total_matches: usize,
    /// Wall-clock duration of the scan in seconds
    pub elapsed_seconds: f64,
}

impl SearchResult {
    /// Creates a new empty search result
    pub fn new() -> Self {
        Default::default()
    }

    /// Records one scanned file. Files with zero matches contribute to the
    /// scanned count only; their `FileResult` is not retained.
    pub fn add_file_result(&mut self, file_result: FileResult) {
        self.files_scanned += 1;
        if !file_result.matches.is_empty() {
            self.total_matches += file_result.matches.len();
            self.files_matched += 1;
            self.file_results.push(file_result);
        }
    }

    /// Records a file that was counted as scanned but could not be searched
    /// (binary content, unreadable, undecodable).
    pub fn record_skipped(&mut self) {
        self.files_scanned += 1;
    }

    /// Derives the summary statistics for this result
    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            files_scanned: self.files_scanned,
            files_matched: self.files_matched,
            total_matches: self.total_matches,
            elapsed_seconds: self.elapsed_seconds,
        }
    }
}
