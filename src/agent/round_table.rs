use async_trait::async_trait;

use super::{Mode, ModeOrchestrator, TurnContext};
use crate::error::TemplateError;
use crate::prompt::{templates, Bindings};
use crate::transcript::Speaker;

pub const DEFAULT_PERSONAS: [&str; 4] = ["Researcher", "Engineer", "Investor", "Historian"];

/// A panel discussion: every persona speaks once, in registration order, each grounded
/// independently on the same titles. Human comments join the transcript without a reply.
pub struct RoundTable {
    personas: Vec<String>,
    human_name: String,
}

impl RoundTable {
    pub fn new(personas: Vec<String>, human_name: String) -> Self {
        Self {
            personas,
            human_name,
        }
    }
}

#[async_trait]
impl ModeOrchestrator for RoundTable {
    fn mode(&self) -> Mode {
        Mode::RoundTable
    }

    async fn run_mode(&self, cx: &mut TurnContext<'_>) -> Result<(), TemplateError> {
        let grounding = cx.grounding;
        for persona in &self.personas {
            let bindings = Bindings::from([
                ("role", persona.as_str()),
                ("topic", grounding.topic.as_str()),
                ("paper_titles", grounding.paper_titles.as_str()),
            ]);
            cx.generate_turn(
                templates::ROUND_TABLE,
                &bindings,
                Speaker::Persona(persona.clone()),
                None,
            )
            .await?;
        }
        Ok(())
    }

    async fn on_input(&self, cx: &mut TurnContext<'_>, comment: &str) -> Result<(), TemplateError> {
        cx.append(Speaker::Human(self.human_name.clone()), comment);
        Ok(())
    }
}
