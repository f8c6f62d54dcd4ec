use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::filters::PathFilter;

/// Walks the tree under `root` and returns the search candidates in
/// traversal order.
///
/// The walk is depth-first with lexicographic sibling ordering, so the list
/// is deterministic for a fixed tree. Symbolic links are never followed
/// (cyclic link structures would otherwise loop forever); this is fixed
/// policy, not configurable. A directory that cannot be listed is logged and
/// skipped; traversal failures are always local, never fatal.
pub fn find_files(root: &Path, filter: &Arc<PathFilter>) -> Vec<PathBuf> {
    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let filter_root = root.to_path_buf();
    let entry_filter = Arc::clone(filter);
    walker.filter_entry(move |entry| {
        let depth = entry.depth();
        if depth == 0 {
            return true;
        }
        let rel = entry
            .path()
            .strip_prefix(&filter_root)
            .unwrap_or_else(|_| entry.path());
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            entry_filter.should_descend(rel, depth)
        } else {
            entry_filter.should_search(rel)
        }
    });

    let mut files = Vec::new();
    for result in walker.build() {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!("Skipping unreadable entry: {err}"),
        }
    }

    debug!("Found {} candidate files under {}", files.len(), root.display());
    files
}
