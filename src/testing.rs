//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::agent::{Mode, ModeSettings, Session, UserAction};
use crate::error::{CorpusError, FailureKind, GenerationError};
use crate::llm::{GenerationAdapter, LlmResponse, TextGenerator};
use crate::prompt::TemplateRegistry;
use crate::retrieval::{CorpusFetcher, DocumentRecord, PaperSearch};

pub fn record(n: usize) -> DocumentRecord {
    DocumentRecord {
        title: format!("Paper {}", n),
        summary: format!("Summary of paper {}.", n),
        link: format!("http://arxiv.org/abs/2401.{:05}v1", n),
    }
}

pub fn records(count: usize) -> Vec<DocumentRecord> {
    (1..=count).map(record).collect()
}

/// Returns a fixed result set, ignoring the limit so the fetcher's own bound is exercised.
pub struct StaticSearch {
    result: Result<Vec<DocumentRecord>, CorpusError>,
    call_count: AtomicUsize,
}

impl StaticSearch {
    pub fn with_records(records: Vec<DocumentRecord>) -> Self {
        Self {
            result: Ok(records),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(CorpusError::Unavailable {
                reason: reason.to_string(),
            }),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PaperSearch for StaticSearch {
    async fn search(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<DocumentRecord>, CorpusError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.result.clone()
    }
}

/// Echoes each prompt back, optionally failing selected calls or every call.
pub struct ScriptedGenerator {
    prompts: Mutex<Vec<String>>,
    fail_calls: Vec<usize>,
    always_fail: Option<FailureKind>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn echo() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_calls: Vec::new(),
            always_fail: None,
            delay: None,
        }
    }

    pub fn failing(kind: FailureKind) -> Self {
        Self {
            always_fail: Some(kind),
            ..Self::echo()
        }
    }

    /// Fails the given zero-based calls with a transport error.
    pub fn failing_calls(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.to_vec(),
            ..Self::echo()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, GenerationError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(kind) = self.always_fail {
            return Err(GenerationError::unavailable(kind, "scripted failure"));
        }
        if self.fail_calls.contains(&call) {
            return Err(GenerationError::unavailable(
                FailureKind::Transport,
                "scripted failure",
            ));
        }

        Ok(LlmResponse {
            text: format!("echo: {}", prompt),
            input_tokens: 10,
            output_tokens: 5,
            cost: 0.001,
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// A session wired to scripted collaborators, with handles kept for assertions.
pub struct Harness {
    pub session: Session,
    pub search: Arc<StaticSearch>,
    pub generator: Arc<ScriptedGenerator>,
}

pub fn harness_with(mode: Mode, search: StaticSearch, generator: ScriptedGenerator) -> Harness {
    let search = Arc::new(search);
    let generator = Arc::new(generator);
    let session = Session::new(
        Arc::new(CorpusFetcher::new(search.clone())),
        Arc::new(TemplateRegistry::builtin()),
        GenerationAdapter::new(generator.clone(), Duration::from_secs(30)),
        ModeSettings::default(),
        mode,
    );
    Harness {
        session,
        search,
        generator,
    }
}

pub fn harness(mode: Mode, papers: usize) -> Harness {
    harness_with(
        mode,
        StaticSearch::with_records(records(papers)),
        ScriptedGenerator::echo(),
    )
}

pub fn topic(topic: &str, limit: usize) -> UserAction {
    UserAction::SubmitTopic {
        topic: topic.into(),
        limit,
    }
}
