use std::sync::Arc;
use std::time::Duration;

use super::{LlmResponse, TextGenerator};
use crate::error::GenerationError;

/// The single call contract the orchestrators use: one prompt in, one text out, bounded by a
/// timeout. Nothing is retried here.
#[derive(Clone)]
pub struct GenerationAdapter {
    inner: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GenerationAdapter {
    pub fn new(inner: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub async fn generate(&self, prompt: &str) -> Result<LlmResponse, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    model = self.model(),
                    timeout_secs = self.timeout.as_secs(),
                    "generation timed out"
                );
                Err(GenerationError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_passes_prompt_through() {
        let generator = Arc::new(ScriptedGenerator::echo());
        let adapter = GenerationAdapter::new(generator.clone(), Duration::from_secs(5));

        let response = adapter.generate("hello there").await.unwrap();
        assert_eq!(response.text, "echo: hello there");
        assert_eq!(generator.prompts(), vec!["hello there".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let generator = Arc::new(ScriptedGenerator::echo().with_delay(Duration::from_secs(30)));
        let adapter = GenerationAdapter::new(generator.clone(), Duration::from_secs(10));

        assert_eq!(
            adapter.generate("slow").await.unwrap_err(),
            GenerationError::Timeout { secs: 10 }
        );
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let generator = Arc::new(ScriptedGenerator::failing(FailureKind::RateLimited));
        let adapter = GenerationAdapter::new(generator.clone(), Duration::from_secs(5));

        assert!(matches!(
            adapter.generate("prompt").await,
            Err(GenerationError::Unavailable {
                kind: FailureKind::RateLimited,
                ..
            })
        ));
        assert_eq!(generator.call_count(), 1);
    }
}
