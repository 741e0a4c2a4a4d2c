use crate::cache::ResultCache;
use crate::traits::{KeyValueStore, ResultsBackend};
use crate::{DocumentUpload, ResultSet, ResultSummary, ReviewError};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Provisional(ResultSet),
    Authoritative(ResultSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Authoritative,
    CachedFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub result: ResultSet,
    pub freshness: Freshness,
}

/// Serves cached results immediately and reconciles them with the backend.
pub struct Reconciler<B, S> {
    backend: B,
    cache: ResultCache<S>,
}

impl<B, S> Reconciler<B, S>
where
    B: ResultsBackend + Send + Sync,
    S: KeyValueStore,
{
    pub fn new(backend: B, cache: ResultCache<S>) -> Self {
        Self { backend, cache }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &ResultCache<S> {
        &self.cache
    }

    pub async fn load(&self, result_id: u64) -> Result<LoadOutcome, ReviewError> {
        self.load_with(result_id, |_| {}).await
    }

    pub async fn load_with<F>(&self, result_id: u64, mut on_event: F) -> Result<LoadOutcome, ReviewError>
    where
        F: FnMut(LoadEvent),
    {
        let cached = self.cache.get(result_id);
        if let Some(provisional) = &cached {
            on_event(LoadEvent::Provisional(provisional.clone()));
        }

        match self.backend.fetch_result(result_id).await {
            Ok(fetched) => {
                self.cache.put(result_id, &fetched);
                on_event(LoadEvent::Authoritative(fetched.clone()));
                Ok(LoadOutcome {
                    result: fetched,
                    freshness: Freshness::Authoritative,
                })
            }
            Err(error) => match cached {
                Some(result) => {
                    warn!(result_id, %error, "fetch failed, keeping cached result");
                    Ok(LoadOutcome {
                        result,
                        freshness: Freshness::CachedFallback,
                    })
                }
                None => Err(error),
            },
        }
    }

    pub fn save(&self, result_id: u64, result: &ResultSet) {
        self.cache.put(result_id, result);
    }

    pub fn remember(&self, result: &ResultSet) -> Option<u64> {
        let result_id = result.result_id?;
        self.save(result_id, result);
        Some(result_id)
    }

    pub fn evict(&self, result_id: u64) {
        self.cache.evict(result_id);
    }

    pub async fn parse(&self, upload: DocumentUpload, save: bool) -> Result<ResultSet, ReviewError> {
        let result = self.backend.parse_document(upload, save).await?;
        if let Some(result_id) = self.remember(&result) {
            info!(result_id, matches = result.total_matches(), "saved parse result");
        }
        Ok(result)
    }

    pub async fn list(&self) -> Result<Vec<ResultSummary>, ReviewError> {
        self.backend.list_results().await
    }

    pub async fn delete(&self, result_id: u64) -> Result<(), ReviewError> {
        self.backend.delete_result(result_id).await?;
        self.evict(result_id);
        info!(result_id, "deleted result");
        Ok(())
    }
}
