use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::{Corpus, PaperSearch};
use crate::error::CorpusError;

/// A fetched corpus and whether it was served from the cache.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub corpus: Arc<Corpus>,
    pub cached: bool,
}

/// Memoizes search results per exact `(topic, limit)` for the life of the process.
/// There is no eviction.
pub struct CorpusFetcher {
    search: Arc<dyn PaperSearch>,
    cache: Mutex<HashMap<(String, usize), Arc<Corpus>>>,
}

impl CorpusFetcher {
    pub fn new(search: Arc<dyn PaperSearch>) -> Self {
        Self {
            search,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn fetch(&self, topic: &str, limit: usize) -> Result<Fetched, CorpusError> {
        if limit == 0 {
            return Err(CorpusError::InvalidLimit { limit });
        }

        let key = (topic.to_string(), limit);
        if let Some(corpus) = self.lookup(&key) {
            tracing::debug!(topic, limit, "corpus cache hit");
            return Ok(Fetched {
                corpus,
                cached: true,
            });
        }

        let records = self.search.search(topic, limit).await?;

        let mut seen = HashSet::new();
        let corpus: Corpus = records
            .into_iter()
            .filter(|r| seen.insert(r.link.clone()))
            .take(limit)
            .collect();

        tracing::info!(topic, limit, papers = corpus.len(), "fetched corpus");

        // The guard is never held across an await, so a second fetch for the same key that
        // raced this one simply keeps whichever corpus landed first.
        let corpus = {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.entry(key).or_insert_with(|| Arc::new(corpus)).clone()
        };

        Ok(Fetched {
            corpus,
            cached: false,
        })
    }

    fn lookup(&self, key: &(String, usize)) -> Option<Arc<Corpus>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(key).cloned()
    }
}
