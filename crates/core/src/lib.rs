pub mod cache;
pub mod client;
pub mod dedupe;
pub mod display;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod review;
pub mod segment;
pub mod session;
pub mod stores;
pub mod traits;

pub use cache::{cache_key, ResultCache, RESULT_KEY_PREFIX};
pub use client::{HttpBackend, DEFAULT_API_BASE};
pub use dedupe::{dedupe, dedupe_key, dedupe_with_report, DedupeReport};
pub use error::ReviewError;
pub use models::{
    DocumentMeta, DocumentUpload, MatchRecord, MatchType, Position, ResultDetail, ResultSet,
    ResultSummary,
};
pub use reconciler::{Freshness, LoadEvent, LoadOutcome, Reconciler};
pub use review::{
    apply, review_rows, ReviewFilters, ReviewRows, SortDirection, SortKey, ViewState,
};
pub use segment::{context_for, highlight, segment, Highlight};
pub use session::{CredentialSource, StaticCredentials, StoredCredentials, TOKEN_KEY};
pub use stores::{FileStore, MemoryStore};
pub use traits::{KeyValueStore, ResultsBackend};
