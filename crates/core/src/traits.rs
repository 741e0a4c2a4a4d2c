use crate::{DocumentUpload, ResultSet, ResultSummary, ReviewError};
use async_trait::async_trait;

/// Persisted string store behind the result cache and the stored token.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ReviewError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ReviewError>;

    fn delete(&self, key: &str) -> Result<(), ReviewError>;
}

/// The extraction service's result endpoints.
#[async_trait]
pub trait ResultsBackend {
    async fn parse_document(
        &self,
        upload: DocumentUpload,
        save: bool,
    ) -> Result<ResultSet, ReviewError>;

    async fn list_results(&self) -> Result<Vec<ResultSummary>, ReviewError>;

    async fn fetch_result(&self, result_id: u64) -> Result<ResultSet, ReviewError>;

    async fn delete_result(&self, result_id: u64) -> Result<(), ReviewError>;
}
