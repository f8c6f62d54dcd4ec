pub mod config;
pub mod errors;
pub mod filters;
pub mod results;
pub mod search;
pub mod walker;

pub use config::SearchConfig;
pub use errors::{ScanResult, SearchError};
pub use results::{FileResult, Match, SearchResult, SearchSummary};
pub use search::{search, search_with_cancel, CancelToken};
