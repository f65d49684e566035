use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{DocumentRecord, PaperSearch};
use crate::error::CorpusError;

const USER_AGENT: &str = concat!("paper-whisper/", env!("CARGO_PKG_VERSION"));

pub struct ArxivSearch {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
}

impl ArxivSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CorpusError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CorpusError::Unavailable {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl PaperSearch for ArxivSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DocumentRecord>, CorpusError> {
        let url = build_search_url(&self.base_url, query, limit);
        tracing::debug!(%url, "arXiv search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CorpusError::Unavailable {
                reason: format!("arXiv request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Unavailable {
                reason: format!("arXiv returned status {}", status),
            });
        }

        let body = response.text().await.map_err(|e| CorpusError::Unavailable {
            reason: format!("failed to read arXiv response: {}", e),
        })?;

        parse_feed(&body)
    }
}

pub fn build_search_url(base_url: &str, query: &str, limit: usize) -> String {
    format!(
        "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
        base_url,
        urlencoding::encode(&format!("all:{}", query.trim())),
        limit,
    )
}

pub fn parse_feed(xml: &str) -> Result<Vec<DocumentRecord>, CorpusError> {
    let feed: Feed = quick_xml::de::from_str(xml).map_err(|e| CorpusError::Unavailable {
        reason: format!("malformed arXiv feed: {}", e),
    })?;

    // arXiv reports query errors in-band as a single entry under /api/errors.
    if let Some(error) = feed.entries.iter().find(|e| e.id.contains("/api/errors")) {
        return Err(CorpusError::Unavailable {
            reason: format!("arXiv rejected the query: {}", normalize_whitespace(&error.summary)),
        });
    }

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| DocumentRecord {
            title: normalize_whitespace(&entry.title),
            summary: normalize_whitespace(&entry.summary),
            link: entry.id.trim().to_string(),
        })
        .collect())
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <link href="http://arxiv.org/api/query?search_query%3Dall%3Aagentic" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=all:agentic</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-05-01T00:00:00-04:00</updated>
  <opensearch:totalResults>2</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>
  <opensearch:itemsPerPage>2</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <published>2024-01-01T00:00:00Z</published>
    <title>Agentic   AI:
      A Survey</title>
    <summary>  Agents that plan
and act.  </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <arxiv:primary_category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.00001v1" rel="related" type="application/pdf"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2402.00002v2</id>
    <title>Tool Use in Language Agents</title>
    <summary>Tools help.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let records = parse_feed(FEED).unwrap();
        assert_eq!(
            records,
            vec![
                DocumentRecord {
                    title: "Agentic AI: A Survey".into(),
                    summary: "Agents that plan and act.".into(),
                    link: "http://arxiv.org/abs/2401.00001v1".into(),
                },
                DocumentRecord {
                    title: "Tool Use in Language Agents".into(),
                    summary: "Tools help.".into(),
                    link: "http://arxiv.org/abs/2402.00002v2".into(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: nothing</title>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:totalResults>
</feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_entry() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;
        match parse_feed(xml) {
            Err(CorpusError::Unavailable { reason }) => {
                assert!(reason.contains("incorrect id format"))
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_build_search_url() {
        let url = build_search_url("https://export.arxiv.org/api/query", " Agentic AI ", 5);
        assert_eq!(
            url,
            "https://export.arxiv.org/api/query?search_query=all%3AAgentic%20AI&start=0&max_results=5&sortBy=relevance&sortOrder=descending"
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_real_search() {
        let search = ArxivSearch::new("https://export.arxiv.org/api/query", Duration::from_secs(30))
            .unwrap();
        let records = search.search("attention is all you need", 3).await.unwrap();
        assert!(!records.is_empty() && records.len() <= 3);
    }
}
