use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::{plot, Mode, ModeOrchestrator, TurnContext};
use crate::error::TemplateError;
use crate::prompt::{templates, Bindings};
use crate::transcript::Speaker;

static VISUALIZATION_INTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)plot|graph|trend").expect("intent pattern is valid"));

pub fn wants_visualization(message: &str) -> bool {
    VISUALIZATION_INTENT.is_match(message)
}

/// Grounded chat. Each message appends a user turn and exactly one answer (or failure) turn,
/// always grounded on every summary in the corpus.
pub struct DeepResearch;

#[async_trait]
impl ModeOrchestrator for DeepResearch {
    fn mode(&self) -> Mode {
        Mode::DeepResearch
    }

    async fn run_mode(&self, _cx: &mut TurnContext<'_>) -> Result<(), TemplateError> {
        Ok(())
    }

    async fn on_input(&self, cx: &mut TurnContext<'_>, message: &str) -> Result<(), TemplateError> {
        cx.append(Speaker::User, message);

        let artifact = wants_visualization(message).then(plot::example_trend);
        let grounding = cx.grounding;
        let bindings = Bindings::from([
            ("summaries", grounding.summaries.as_str()),
            ("question", message),
        ]);
        cx.generate_turn(templates::DEEP_RESEARCH, &bindings, Speaker::Assistant, artifact)
            .await?;
        Ok(())
    }
}
