use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassLog {
    pub template: String,
    pub speaker: String,
    pub latency_ms: u64,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
    /// `ok`, or `failed: <reason>`.
    pub outcome: String,
}

impl PassLog {
    pub fn failed(&self) -> bool {
        self.outcome != "ok"
    }
}

/// One user action, from fetch through the last generation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub id: String,
    pub timestamp: String,
    pub mode: String,
    pub action: String,
    pub topic: Option<String>,
    pub num_papers: usize,
    pub corpus_cached: bool,
    pub fetch_latency_ms: u64,
    pub passes: Vec<PassLog>,
    pub total_latency_ms: u64,
}

impl RunLog {
    pub fn new(mode: &str, action: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: mode.to_string(),
            action: action.to_string(),
            topic: None,
            num_papers: 0,
            corpus_cached: false,
            fetch_latency_ms: 0,
            passes: Vec::new(),
            total_latency_ms: 0,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.passes
            .iter()
            .map(|p| p.input_tokens + p.output_tokens)
            .sum()
    }

    /// Actual cost in USD as reported by the LLM API, where the provider reports one.
    pub fn cost(&self) -> f64 {
        self.passes.iter().map(|p| p.cost).sum()
    }

    pub fn failed_passes(&self) -> usize {
        self.passes.iter().filter(|p| p.failed()).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Mode: {} | Papers: {}{} | Passes: {} ({} failed) | Total latency: {:.1}s | Tokens used by LLM: {} | Cost: ${:.4}",
            self.mode,
            self.num_papers,
            if self.corpus_cached { " (cached)" } else { "" },
            self.passes.len(),
            self.failed_passes(),
            self.total_latency_ms as f64 / 1000.0,
            self.total_tokens(),
            self.cost(),
        )
    }
}

pub struct RunLogger {
    dir: PathBuf,
}

impl RunLogger {
    pub fn new(dir: &str) -> Result<Self> {
        let dir = PathBuf::from(dir);
        fs::create_dir_all(&dir).context("Failed to create logs directory")?;
        Ok(Self { dir })
    }

    pub fn write(&self, run_log: &RunLog) -> Result<()> {
        let path = self.dir.join("runs.jsonl");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open log file")?;

        let json = serde_json::to_string(run_log).context("Failed to serialize run log")?;
        writeln!(file, "{}", json).context("Failed to write log")?;

        Ok(())
    }
}
