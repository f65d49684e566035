pub mod article;
pub mod deep_research;
pub mod plot;
pub mod round_table;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{SessionError, TemplateError};
use crate::instrumentation::{PassLog, RunLog, RunLogger};
use crate::llm::GenerationAdapter;
use crate::prompt::{Bindings, TemplateRegistry};
use crate::retrieval::{Corpus, CorpusFetcher};
use crate::transcript::{GenerationTurn, SessionTranscript, SideArtifact, Speaker};

use article::Article;
use deep_research::DeepResearch;
use round_table::RoundTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single-document synthesis with an optional follow-up question.
    Article,
    /// One pass per persona, plus human comments.
    RoundTable,
    /// Grounded question-answering chat.
    DeepResearch,
}

impl Mode {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "article" | "synthesis" => Some(Mode::Article),
            "round-table" | "roundtable" | "panel" => Some(Mode::RoundTable),
            "research" | "deep-research" | "chat" => Some(Mode::DeepResearch),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Article => write!(f, "article"),
            Mode::RoundTable => write!(f, "round-table"),
            Mode::DeepResearch => write!(f, "deep-research"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Fetching,
    Grounding,
    Generating,
    Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SubmitTopic { topic: String, limit: usize },
    SelectMode(Mode),
    /// A follow-up question, a panel comment or a chat message, depending on the mode.
    SubmitInput(String),
    EndSession,
}

impl UserAction {
    fn label(&self) -> &'static str {
        match self {
            UserAction::SubmitTopic { .. } => "submit_topic",
            UserAction::SelectMode(_) => "select_mode",
            UserAction::SubmitInput(_) => "submit_input",
            UserAction::EndSession => "end_session",
        }
    }
}

/// The topic and corpus every pass of an interaction is grounded on.
#[derive(Debug, Clone)]
pub struct Grounding {
    pub topic: String,
    pub limit: usize,
    pub corpus: Arc<Corpus>,
    /// One `- title` line per paper.
    pub paper_titles: String,
    /// Numbered title and abstract per paper.
    pub summaries: String,
}

impl Grounding {
    pub fn new(topic: String, limit: usize, corpus: Arc<Corpus>) -> Self {
        let paper_titles = corpus
            .iter()
            .map(|p| format!("- {}", p.title))
            .collect::<Vec<_>>()
            .join("\n");
        let summaries = corpus
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}\n{}", i + 1, p.title, p.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            topic,
            limit,
            corpus,
            paper_titles,
            summaries,
        }
    }
}

/// Everything a mode needs while generating: the grounding, the prompt and generation
/// collaborators, and the transcript it appends to.
pub struct TurnContext<'a> {
    pub grounding: &'a Grounding,
    registry: &'a TemplateRegistry,
    generator: &'a GenerationAdapter,
    transcript: &'a mut SessionTranscript,
    passes: &'a mut Vec<PassLog>,
}

impl TurnContext<'_> {
    /// Appends a turn without calling the generator.
    pub fn append(&mut self, speaker: Speaker, text: &str) {
        self.transcript.append(speaker, text, None);
    }

    /// Renders `template`, generates once and appends the result under `speaker`.
    ///
    /// A failed generation appends a `System` turn naming the failed pass instead and returns
    /// `Ok(false)`; earlier turns are untouched. Template errors are returned as-is.
    pub async fn generate_turn(
        &mut self,
        template: &str,
        bindings: &Bindings<'_>,
        speaker: Speaker,
        artifact: Option<SideArtifact>,
    ) -> Result<bool, TemplateError> {
        let prompt = self.registry.render(template, bindings)?;

        let start = Instant::now();
        let result = self.generator.generate(&prompt).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                tracing::debug!(template, %speaker, latency_ms, "generation pass complete");
                self.passes.push(PassLog {
                    template: template.to_string(),
                    speaker: speaker.to_string(),
                    latency_ms,
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                    cost: response.cost,
                    outcome: "ok".into(),
                });
                self.transcript.append(speaker, response.text, artifact);
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(template, %speaker, error = %err, "generation pass failed");
                self.passes.push(PassLog {
                    template: template.to_string(),
                    speaker: speaker.to_string(),
                    latency_ms,
                    input_tokens: 0,
                    output_tokens: 0,
                    cost: 0.0,
                    outcome: format!("failed: {}", err),
                });
                self.transcript.append(
                    Speaker::System,
                    format!("The {} pass failed: {}", speaker, err),
                    None,
                );
                Ok(false)
            }
        }
    }
}

#[async_trait]
pub trait ModeOrchestrator: Send + Sync {
    fn mode(&self) -> Mode;

    /// Runs when a grounding is established or the mode is selected over an existing one.
    async fn run_mode(&self, cx: &mut TurnContext<'_>) -> Result<(), TemplateError>;

    async fn on_input(&self, cx: &mut TurnContext<'_>, input: &str) -> Result<(), TemplateError>;
}

#[derive(Debug, Clone)]
pub struct ModeSettings {
    pub personas: Vec<String>,
    pub human_name: String,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            personas: round_table::DEFAULT_PERSONAS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            human_name: "Human".into(),
        }
    }
}

pub fn orchestrator_for(mode: Mode, settings: &ModeSettings) -> Box<dyn ModeOrchestrator> {
    match mode {
        Mode::Article => Box::new(Article),
        Mode::RoundTable => Box::new(RoundTable::new(
            settings.personas.clone(),
            settings.human_name.clone(),
        )),
        Mode::DeepResearch => Box::new(DeepResearch),
    }
}

/// Result of one user action: the turns it appended, and its run log.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub tail: Vec<GenerationTurn>,
    pub run_log: RunLog,
}

enum Step {
    RunMode,
    Input(String),
}

/// One user's session. Each action runs to completion before the next is accepted.
pub struct Session {
    fetcher: Arc<CorpusFetcher>,
    registry: Arc<TemplateRegistry>,
    generator: GenerationAdapter,
    settings: ModeSettings,
    orchestrator: Box<dyn ModeOrchestrator>,
    grounding: Option<Grounding>,
    transcript: SessionTranscript,
    state: OrchestratorState,
    logger: Option<RunLogger>,
}

impl Session {
    pub fn new(
        fetcher: Arc<CorpusFetcher>,
        registry: Arc<TemplateRegistry>,
        generator: GenerationAdapter,
        settings: ModeSettings,
        mode: Mode,
    ) -> Self {
        let orchestrator = orchestrator_for(mode, &settings);
        Self {
            fetcher,
            registry,
            generator,
            settings,
            orchestrator,
            grounding: None,
            transcript: SessionTranscript::new(),
            state: OrchestratorState::Idle,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn mode(&self) -> Mode {
        self.orchestrator.mode()
    }

    #[cfg(test)]
    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn grounding(&self) -> Option<&Grounding> {
        self.grounding.as_ref()
    }

    /// The full transcript, for re-rendering after every turn.
    pub fn transcript(&self) -> &[GenerationTurn] {
        self.transcript.turns()
    }

    pub async fn on_user_action(
        &mut self,
        action: UserAction,
    ) -> Result<Interaction, SessionError> {
        let started = Instant::now();
        let from = self.transcript.len();
        let mut run_log = RunLog::new(&self.mode().to_string(), action.label());
        let mut passes = Vec::new();

        tracing::info!(mode = %self.mode(), action = action.label(), "user action");

        match action {
            UserAction::SubmitTopic { topic, limit } => {
                let unchanged = self
                    .grounding
                    .as_ref()
                    .is_some_and(|g| g.topic == topic && g.limit == limit);
                if unchanged {
                    run_log.corpus_cached = true;
                } else {
                    self.ground(topic, limit, OrchestratorState::Fetching, &mut run_log)
                        .await?;
                }
                self.generate(Step::RunMode, &mut passes).await?;
            }
            UserAction::SelectMode(mode) => {
                self.orchestrator = orchestrator_for(mode, &self.settings);
                run_log.mode = mode.to_string();
                if self.grounding.is_some() {
                    self.generate(Step::RunMode, &mut passes).await?;
                }
            }
            // Blank input counts as no input at all.
            UserAction::SubmitInput(text) if text.trim().is_empty() => {}
            UserAction::SubmitInput(text) => {
                let (topic, limit) = match &self.grounding {
                    Some(g) => (g.topic.clone(), g.limit),
                    None => return Err(SessionError::NoTopic),
                };
                // Every turn is re-grounded from the fetcher; the corpus itself comes from its
                // memo, so the search collaborator is not contacted again.
                self.ground(topic, limit, OrchestratorState::Grounding, &mut run_log)
                    .await?;
                self.generate(Step::Input(text), &mut passes).await?;
            }
            UserAction::EndSession => {
                self.transcript.clear();
                self.grounding = None;
                self.state = OrchestratorState::Idle;
            }
        }

        if let Some(grounding) = &self.grounding {
            run_log.topic = Some(grounding.topic.clone());
            run_log.num_papers = grounding.corpus.len();
        }
        run_log.passes = passes;
        run_log.total_latency_ms = started.elapsed().as_millis() as u64;

        if let Some(logger) = &self.logger {
            logger.write(&run_log).map_err(SessionError::RunLog)?;
        }

        tracing::debug!(state = ?self.state, turns = self.transcript.len(), "user action done");

        Ok(Interaction {
            tail: self.transcript.tail(from).to_vec(),
            run_log,
        })
    }

    async fn ground(
        &mut self,
        topic: String,
        limit: usize,
        entry: OrchestratorState,
        run_log: &mut RunLog,
    ) -> Result<(), SessionError> {
        let previous = self.state;
        self.state = entry;

        let start = Instant::now();
        let fetched = match self.fetcher.fetch(&topic, limit).await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::error!(topic = %topic, error = %err, "corpus fetch failed");
                self.state = previous;
                return Err(err.into());
            }
        };
        run_log.fetch_latency_ms = start.elapsed().as_millis() as u64;
        run_log.corpus_cached = fetched.cached;

        self.state = OrchestratorState::Grounding;
        self.grounding = Some(Grounding::new(topic, limit, fetched.corpus));
        Ok(())
    }

    async fn generate(
        &mut self,
        step: Step,
        passes: &mut Vec<PassLog>,
    ) -> Result<(), SessionError> {
        let Some(grounding) = self.grounding.as_ref() else {
            return Err(SessionError::NoTopic);
        };
        self.state = OrchestratorState::Generating;

        let mut cx = TurnContext {
            grounding,
            registry: &self.registry,
            generator: &self.generator,
            transcript: &mut self.transcript,
            passes,
        };
        let result = match step {
            Step::RunMode => self.orchestrator.run_mode(&mut cx).await,
            Step::Input(text) => self.orchestrator.on_input(&mut cx, &text).await,
        };

        // Turns appended before a wiring error stay visible.
        self.state = OrchestratorState::Rendered;
        result?;
        Ok(())
    }
}
