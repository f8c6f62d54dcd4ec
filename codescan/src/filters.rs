use glob::Pattern;
use std::path::Path;

use crate::config::SearchConfig;
use crate::errors::{ScanResult, SearchError};

/// How many leading bytes of a file are probed for NUL bytes when deciding
/// whether its content is binary.
pub const BINARY_PROBE_SIZE: usize = 8 * 1024;

/// Compiled path predicates shared read-only by the walker and the file
/// processor.
///
/// Exclusion globs are matched against the full path relative to the scan
/// root, not just the basename. `glob`'s default match options let `*` cross
/// path separators, so a pattern like `*node_modules*` excludes at any depth.
#[derive(Debug, Clone)]
pub struct PathFilter {
    extensions: Vec<String>,
    exclude: Vec<Pattern>,
    max_depth: Option<usize>,
}

impl PathFilter {
    /// Compiles the filter from the scan configuration. A malformed
    /// exclusion glob is a configuration error, surfaced before any
    /// traversal begins.
    pub fn new(config: &SearchConfig) -> ScanResult<Self> {
        let extensions = config
            .file_extensions
            .iter()
            .flatten()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let exclude = config
            .exclude_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    SearchError::config_error(format!("invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<ScanResult<Vec<_>>>()?;

        Ok(Self {
            extensions,
            exclude,
            max_depth: config.max_depth,
        })
    }

    /// Whether the walk may descend into a directory. `depth` is the
    /// directory's depth relative to the root (root itself is 0); files in a
    /// directory at depth d sit at scan depth d, so a max depth of 0 keeps
    /// the scan to files directly in the root.
    pub fn should_descend(&self, rel_path: &Path, depth: usize) -> bool {
        if self.max_depth.is_some_and(|max| depth > max) {
            return false;
        }
        !self.is_excluded(rel_path)
    }

    /// Whether a file is a search candidate based on its extension and the
    /// exclusion globs. Content-based binary detection happens separately,
    /// once the file's leading bytes have been read.
    pub fn should_search(&self, rel_path: &Path) -> bool {
        self.has_valid_extension(rel_path) && !self.is_excluded(rel_path)
    }

    fn has_valid_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    fn is_excluded(&self, rel_path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let normalized = rel_path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|p| p.matches(&normalized))
    }
}

/// Checks whether file content looks binary: a NUL byte anywhere in the
/// probed prefix. Callers pass at most the first [`BINARY_PROBE_SIZE`] bytes.
pub fn looks_binary(prefix: &[u8]) -> bool {
    prefix.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(
        extensions: Option<Vec<&str>>,
        exclude: Vec<&str>,
        max_depth: Option<usize>,
    ) -> PathFilter {
        let config = SearchConfig {
            pattern: "x".to_string(),
            file_extensions: extensions
                .map(|exts| exts.into_iter().map(String::from).collect()),
            exclude_patterns: exclude.into_iter().map(String::from).collect(),
            max_depth,
            ..SearchConfig::default()
        };
        PathFilter::new(&config).unwrap()
    }

    #[test]
    fn test_extension_filtering() {
        let f = filter(Some(vec!["rs"]), vec![], None);
        assert!(f.should_search(Path::new("src/main.rs")));
        assert!(f.should_search(Path::new("src/main.RS"))); // case-insensitive
        assert!(!f.should_search(Path::new("src/main.py")));
        assert!(!f.should_search(Path::new("README"))); // no extension

        // Leading dots in the configured set are stripped
        let f = filter(Some(vec![".py", "txt"]), vec![], None);
        assert!(f.should_search(Path::new("a.py")));
        assert!(f.should_search(Path::new("b.txt")));
        assert!(!f.should_search(Path::new("c.rs")));

        // Empty set means all extensions
        let f = filter(None, vec![], None);
        assert!(f.should_search(Path::new("anything.xyz")));
        assert!(f.should_search(Path::new("no_extension")));
    }

    #[test]
    fn test_exclusion_globs_match_full_relative_path() {
        let f = filter(None, vec!["*test*"], None);
        assert!(!f.should_search(Path::new("src/test_util.py")));
        assert!(!f.should_search(Path::new("tests/data.txt")));
        assert!(f.should_search(Path::new("src/main.py")));

        let f = filter(None, vec!["*node_modules*"], None);
        assert!(!f.should_descend(Path::new("web/node_modules"), 1));
        assert!(!f.should_search(Path::new("web/node_modules/x/index.js")));
        assert!(f.should_descend(Path::new("web/src"), 1));
    }

    #[test]
    fn test_question_mark_glob() {
        let f = filter(None, vec!["file_?.txt"], None);
        assert!(!f.should_search(Path::new("file_1.txt")));
        assert!(!f.should_search(Path::new("file_a.txt")));
        assert!(f.should_search(Path::new("file_10.txt")));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let config = SearchConfig {
            pattern: "x".to_string(),
            exclude_patterns: vec!["[".to_string()],
            ..SearchConfig::default()
        };
        assert!(matches!(
            PathFilter::new(&config),
            Err(SearchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_depth_limits() {
        let f = filter(None, vec![], Some(0));
        assert!(f.should_descend(Path::new(""), 0)); // the root itself
        assert!(!f.should_descend(Path::new("sub"), 1));

        let f = filter(None, vec![], Some(1));
        assert!(f.should_descend(Path::new("sub"), 1));
        assert!(!f.should_descend(Path::new("sub/nested"), 2));

        let f = filter(None, vec![], None);
        assert!(f.should_descend(Path::new("a/b/c/d/e"), 5));
    }

    #[test]
    fn test_looks_binary() {
        assert!(looks_binary(b"ELF\x00\x01\x02"));
        assert!(looks_binary(&[0u8; 16]));
        assert!(!looks_binary(b"plain text\nwith lines\n"));
        assert!(!looks_binary(b""));
        // Non-ASCII UTF-8 is not binary
        assert!(!looks_binary("héllo wörld".as_bytes()));
    }
}
