use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_PERSONAS: &str = "Researcher,Engineer,Investor,Historian";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Any OpenAI-compatible chat completions endpoint (Groq, OpenRouter, OpenAI).
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: LlmProvider,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub generation_timeout: Duration,
    pub arxiv_api_url: String,
    pub arxiv_timeout: Duration,
    pub max_papers: usize,
    pub panel_personas: Vec<String>,
    pub human_name: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let llm_provider = match var("LLM_PROVIDER", "openai").to_lowercase().as_str() {
            "openai" | "groq" | "openrouter" => LlmProvider::OpenAi,
            "anthropic" => LlmProvider::Anthropic,
            other => anyhow::bail!("Unsupported LLM_PROVIDER: {}", other),
        };

        let default_base_url = match llm_provider {
            LlmProvider::OpenAi => "https://api.groq.com/openai/v1/chat/completions",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1/messages",
        };

        let panel_personas: Vec<String> = var("PANEL_PERSONAS", DEFAULT_PERSONAS)
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if panel_personas.is_empty() {
            anyhow::bail!("PANEL_PERSONAS must name at least one persona");
        }

        let max_papers: usize = var("MAX_PAPERS", "5")
            .parse()
            .context("MAX_PAPERS must be a number")?;
        if max_papers == 0 {
            anyhow::bail!("MAX_PAPERS must be positive");
        }

        Ok(Self {
            llm_provider,
            llm_api_key: lookup("LLM_API_KEY").filter(|k| !k.trim().is_empty()),
            llm_base_url: var("LLM_BASE_URL", default_base_url),
            llm_model: var("LLM_MODEL", "llama3-8b-8192"),
            llm_max_tokens: var("LLM_MAX_TOKENS", "4096")
                .parse()
                .context("LLM_MAX_TOKENS must be a number")?,
            generation_timeout: Duration::from_secs(
                var("GENERATION_TIMEOUT_SECS", "60")
                    .parse()
                    .context("GENERATION_TIMEOUT_SECS must be a number")?,
            ),
            arxiv_api_url: var("ARXIV_API_URL", "https://export.arxiv.org/api/query"),
            arxiv_timeout: Duration::from_secs(
                var("ARXIV_TIMEOUT_SECS", "30")
                    .parse()
                    .context("ARXIV_TIMEOUT_SECS must be a number")?,
            ),
            max_papers,
            panel_personas,
            human_name: var("HUMAN_NAME", "Human"),
            log_dir: var("LOG_DIR", "logs"),
        })
    }
}
