pub mod arxiv;
pub mod fetcher;

use async_trait::async_trait;

use crate::error::CorpusError;

pub use arxiv::ArxivSearch;
pub use fetcher::CorpusFetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub title: String,
    pub summary: String,
    pub link: String,
}

/// Records in relevance order, at most the requested length, unique by `link`.
pub type Corpus = Vec<DocumentRecord>;

/// The external academic search service. Results are always ranked by relevance.
#[async_trait]
pub trait PaperSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DocumentRecord>, CorpusError>;
}
