use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

use super::matcher::PatternMatcher;
use crate::filters::{looks_binary, BINARY_PROBE_SIZE};
use crate::results::{FileResult, Match};

/// Files at or above this size are memory-mapped instead of read into a
/// buffer.
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Scans individual files against a compiled pattern.
///
/// A file that cannot be read, contains binary content, or is not valid
/// UTF-8 is a non-fatal skip: it is logged, counted as scanned by the
/// caller, and never surfaces as an error.
#[derive(Debug)]
pub struct FileProcessor {
    matcher: PatternMatcher,
    context_lines: usize,
}

impl FileProcessor {
    /// Creates a new FileProcessor with the given pattern matcher
    pub fn new(matcher: PatternMatcher, context_lines: usize) -> Self {
        Self {
            matcher,
            context_lines,
        }
    }

    /// Scans a file and returns its result, or `None` when the file had to
    /// be skipped. A returned `FileResult` may have zero matches; the
    /// caller decides whether to retain it.
    pub fn process_file(&self, path: &Path) -> Option<FileResult> {
        trace!("Processing file: {}", path.display());

        let size = match path.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };

        if size >= LARGE_FILE_THRESHOLD {
            self.process_mmap_file(path)
        } else {
            self.process_small_file(path)
        }
    }

    fn process_small_file(&self, path: &Path) -> Option<FileResult> {
        match std::fs::read(path) {
            Ok(bytes) => self.scan_bytes(path, &bytes),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }

    fn process_mmap_file(&self, path: &Path) -> Option<FileResult> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };
        match unsafe { Mmap::map(&file) } {
            Ok(mmap) => self.scan_bytes(path, &mmap),
            Err(e) => {
                warn!("Skipping {}: failed to map: {}", path.display(), e);
                None
            }
        }
    }

    fn scan_bytes(&self, path: &Path, bytes: &[u8]) -> Option<FileResult> {
        let probe = &bytes[..bytes.len().min(BINARY_PROBE_SIZE)];
        if looks_binary(probe) {
            warn!("Skipping binary file: {}", path.display());
            return None;
        }

        let contents = match std::str::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Skipping {}: not valid UTF-8: {}", path.display(), e);
                return None;
            }
        };

        let lines: Vec<&str> = contents.lines().collect();
        let mut matches = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let spans = self.matcher.find_matches(line);
            if spans.is_empty() {
                continue;
            }

            let line_number = index + 1;
            let context_before = self.context_before(&lines, index);
            let context_after = self.context_after(&lines, index);

            // Every match on the line gets its own record; they share the
            // same context window.
            for (start, end) in spans {
                matches.push(Match {
                    line_number,
                    line_content: line.to_string(),
                    start,
                    end,
                    context_before: context_before.clone(),
                    context_after: context_after.clone(),
                });
            }
        }

        Some(FileResult {
            path: path.to_path_buf(),
            matches,
            line_count: lines.len(),
        })
    }

    /// Up to `context_lines` lines preceding `index`, truncated at the
    /// start of the file.
    fn context_before(&self, lines: &[&str], index: usize) -> Vec<(usize, String)> {
        let start = index.saturating_sub(self.context_lines);
        (start..index)
            .map(|i| (i + 1, lines[i].to_string()))
            .collect()
    }

    /// Up to `context_lines` lines following `index`, truncated at the end
    /// of the file.
    fn context_after(&self, lines: &[&str], index: usize) -> Vec<(usize, String)> {
        let end = (index + 1 + self.context_lines).min(lines.len());
        (index + 1..end)
            .map(|i| (i + 1, lines[i].to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use std::io::Write;
    use tempfile::tempdir;

    fn processor(pattern: &str, context_lines: usize) -> FileProcessor {
        let config = SearchConfig {
            pattern: pattern.to_string(),
            ..SearchConfig::default()
        };
        FileProcessor::new(PatternMatcher::new(&config).unwrap(), context_lines)
    }

    #[test]
    fn test_basic_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "first line\nsecond test line\nthird line\n").unwrap();

        let result = processor("test", 0).process_file(&path).unwrap();
        assert_eq!(result.line_count, 3);
        assert_eq!(result.matches.len(), 1);

        let m = &result.matches[0];
        assert_eq!(m.line_number, 2);
        assert_eq!(m.line_content, "second test line");
        assert_eq!(&m.line_content[m.start..m.end], "test");
        assert!(m.context_before.is_empty());
        assert!(m.context_after.is_empty());
    }

    #[test]
    fn test_context_truncated_at_file_boundaries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "match at top\nmiddle\nmatch at bottom\n").unwrap();

        let result = processor("match", 2).process_file(&path).unwrap();
        assert_eq!(result.matches.len(), 2);

        let top = &result.matches[0];
        assert_eq!(top.line_number, 1);
        assert!(top.context_before.is_empty()); // truncated, not padded
        assert_eq!(
            top.context_after,
            vec![(2, "middle".to_string()), (3, "match at bottom".to_string())]
        );

        let bottom = &result.matches[1];
        assert_eq!(bottom.line_number, 3);
        assert_eq!(
            bottom.context_before,
            vec![(1, "match at top".to_string()), (2, "middle".to_string())]
        );
        assert!(bottom.context_after.is_empty());

        // Context line numbers never leave [1, line_count]
        for m in &result.matches {
            for (n, _) in m.context_before.iter().chain(&m.context_after) {
                assert!(*n >= 1 && *n <= result.line_count);
            }
        }
    }

    #[test]
    fn test_multiple_matches_on_one_line_share_context() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "before\nfoo and foo again\nafter\n").unwrap();

        let result = processor("foo", 1).process_file(&path).unwrap();
        assert_eq!(result.matches.len(), 2);

        let (first, second) = (&result.matches[0], &result.matches[1]);
        assert_eq!(first.line_number, second.line_number);
        assert_eq!(first.context_before, second.context_before);
        assert_eq!(first.context_after, second.context_after);
        assert!(first.end <= second.start); // non-overlapping, ordered
    }

    #[test]
    fn test_binary_file_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"some text\x00with a nul byte").unwrap();

        assert!(processor("text", 0).process_file(&path).is_none());
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, [0x66, 0x6f, 0x6f, 0xe9, 0x0a]).unwrap();

        assert!(processor("foo", 0).process_file(&path).is_none());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        assert!(processor("foo", 0).process_file(&path).is_none());
    }

    #[test]
    fn test_zero_match_file_reports_empty_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.txt");
        std::fs::write(&path, "nothing interesting here\n").unwrap();

        let result = processor("needle", 0).process_file(&path).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.line_count, 1);
    }

    #[test]
    fn test_line_numbers_within_bounds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");
        let mut content = String::new();
        for i in 0..50 {
            content.push_str(&format!("line {i} with needle\n"));
        }
        std::fs::write(&path, &content).unwrap();

        let result = processor("needle", 3).process_file(&path).unwrap();
        assert_eq!(result.matches.len(), 50);
        for m in &result.matches {
            assert!(m.line_number >= 1 && m.line_number <= result.line_count);
        }
    }
}
