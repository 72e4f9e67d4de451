pub mod cache;
pub mod client;
pub mod error;
pub mod related;
pub mod search;
pub mod serial;
pub mod types;

pub use cache::{clear_cache, CacheConfig, MetricsCache};
pub use client::{is_pdf_response, ScopusClient};
pub use error::ScopusError;
pub use related::{citing_papers, references};
pub use search::{build_search_query, execute_search, search, SearchOutcome};
pub use serial::{journal_metrics, prefetch_metrics, DEFAULT_CONCURRENCY};
pub use types::RelatedPaper;
