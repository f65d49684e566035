use async_trait::async_trait;

use super::{Mode, ModeOrchestrator, TurnContext};
use crate::error::TemplateError;
use crate::prompt::{templates, Bindings};
use crate::transcript::Speaker;

/// Writes one long-form article from the paper titles. A follow-up question gets one more
/// pass over the full summaries; the two passes share nothing but the grounding.
pub struct Article;

#[async_trait]
impl ModeOrchestrator for Article {
    fn mode(&self) -> Mode {
        Mode::Article
    }

    async fn run_mode(&self, cx: &mut TurnContext<'_>) -> Result<(), TemplateError> {
        let grounding = cx.grounding;
        let bindings = Bindings::from([
            ("topic", grounding.topic.as_str()),
            ("paper_titles", grounding.paper_titles.as_str()),
        ]);
        cx.generate_turn(templates::ARTICLE, &bindings, Speaker::Assistant, None)
            .await?;
        Ok(())
    }

    async fn on_input(
        &self,
        cx: &mut TurnContext<'_>,
        question: &str,
    ) -> Result<(), TemplateError> {
        let grounding = cx.grounding;
        let bindings = Bindings::from([
            ("summaries", grounding.summaries.as_str()),
            ("question", question),
        ]);
        cx.generate_turn(templates::ARTICLE_QA, &bindings, Speaker::Assistant, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::agent::{Mode, UserAction};
    use crate::testing::{harness, topic};
    use crate::transcript::Speaker;

    #[tokio::test]
    async fn test_synthesis_then_follow_up() {
        let mut h = harness(Mode::Article, 5);

        let first = h.session.on_user_action(topic("Agentic AI", 5)).await.unwrap();
        assert_eq!(first.tail.len(), 1);
        assert_eq!(first.tail[0].speaker, Speaker::Assistant);
        assert_eq!(h.generator.call_count(), 1);

        let prompt = &h.generator.prompts()[0];
        assert!(prompt.contains("\"Agentic AI\""));
        assert!(prompt.contains("- Paper 1\n- Paper 2\n- Paper 3\n- Paper 4\n- Paper 5"));
        assert!(!prompt.contains("Summary of paper"));

        let second = h
            .session
            .on_user_action(UserAction::SubmitInput("Which paper is most cited?".into()))
            .await
            .unwrap();
        assert_eq!(second.tail.len(), 1);
        assert_eq!(second.tail[0].seq, 1);
        assert_eq!(h.session.transcript().len(), 2);

        let qa_prompt = &h.generator.prompts()[1];
        assert!(qa_prompt.contains("1. Paper 1\nSummary of paper 1."));
        assert!(qa_prompt.contains("Answer the question: Which paper is most cited?"));
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let mut h = harness(Mode::Article, 0);

        let first = h.session.on_user_action(topic("Nothing", 5)).await.unwrap();
        h.session
            .on_user_action(UserAction::SubmitInput("Anything?".into()))
            .await
            .unwrap();

        assert_eq!(first.tail.len(), 1);
        assert_eq!(h.generator.call_count(), 2);
        assert!(h.generator.prompts()[1]
            .starts_with("Based on the article and these papers:\n\n\nAnswer"));
    }
}
