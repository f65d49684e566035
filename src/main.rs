mod agent;
mod config;
mod error;
mod instrumentation;
mod llm;
mod prompt;
mod render;
mod retrieval;
mod transcript;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

use agent::{Interaction, Mode, ModeSettings, Session, UserAction};
use config::{Config, LlmProvider};
use instrumentation::RunLogger;
use llm::{AnthropicClient, GenerationAdapter, LlmClient, TextGenerator};
use prompt::TemplateRegistry;
use retrieval::{ArxivSearch, CorpusFetcher};

#[derive(Parser)]
#[command(
    name = "paper-whisper",
    about = "Research assistant that grounds LLM articles, panels and chat on arXiv papers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How many papers to fetch (defaults to MAX_PAPERS)
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u64).range(3..=20))]
    limit: Option<u64>,

    /// Print a run summary after every interaction
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the top papers for a topic
    Papers {
        topic: String,
    },
    /// Write an article on a topic, optionally answering a follow-up question
    Article {
        topic: String,
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Hold a round table discussion between fixed personas
    RoundTable {
        topic: String,
        /// Add your own comment to the discussion
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Chat with a research assistant grounded on the papers (reads questions from stdin)
    Research {
        topic: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing();

    let limit = cli.limit.map(|l| l as usize).unwrap_or(config.max_papers);

    let search = ArxivSearch::new(&config.arxiv_api_url, config.arxiv_timeout)?;
    let fetcher = Arc::new(CorpusFetcher::new(Arc::new(search)));

    match cli.command {
        Commands::Papers { topic } => {
            let fetched = fetcher
                .fetch(&topic, limit)
                .await
                .context("Could not fetch papers")?;
            println!("{}", render::render_papers(&fetched.corpus));
        }
        Commands::Article { topic, question } => {
            let question = present(question);
            let mut session = build_session(&config, fetcher, Mode::Article)?;
            let interaction = start(&mut session, topic, limit, cli.verbose).await?;
            print_tail(&interaction);
            if let Some(question) = question {
                let action = UserAction::SubmitInput(question);
                let interaction = act(&mut session, action, cli.verbose).await?;
                print_tail(&interaction);
            }
        }
        Commands::RoundTable { topic, comment } => {
            let comment = present(comment);
            let mut session = build_session(&config, fetcher, Mode::RoundTable)?;
            let interaction = start(&mut session, topic, limit, cli.verbose).await?;
            print_tail(&interaction);
            if let Some(comment) = comment {
                let action = UserAction::SubmitInput(comment);
                let interaction = act(&mut session, action, cli.verbose).await?;
                print_tail(&interaction);
            }
        }
        Commands::Research { topic } => {
            let mut session = build_session(&config, fetcher, Mode::DeepResearch)?;
            start(&mut session, topic, limit, cli.verbose).await?;
            chat(&mut session, cli.verbose).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let api_key = config
        .llm_api_key
        .as_deref()
        .context("LLM_API_KEY must be set")?;

    Ok(match config.llm_provider {
        LlmProvider::OpenAi => Arc::new(LlmClient::new(
            api_key,
            &config.llm_base_url,
            &config.llm_model,
            config.llm_max_tokens,
        )),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            api_key,
            &config.llm_base_url,
            &config.llm_model,
            config.llm_max_tokens,
        )),
    })
}

fn build_session(config: &Config, fetcher: Arc<CorpusFetcher>, mode: Mode) -> Result<Session> {
    let generator = GenerationAdapter::new(build_generator(config)?, config.generation_timeout);
    let settings = ModeSettings {
        personas: config.panel_personas.clone(),
        human_name: config.human_name.clone(),
    };
    let logger = RunLogger::new(&config.log_dir)?;

    Ok(Session::new(
        fetcher,
        Arc::new(TemplateRegistry::builtin()),
        generator,
        settings,
        mode,
    )
    .with_logger(logger))
}

async fn start(
    session: &mut Session,
    topic: String,
    limit: usize,
    verbose: bool,
) -> Result<Interaction> {
    let interaction = act(session, UserAction::SubmitTopic { topic, limit }, verbose)
        .await
        .context("Could not start the session")?;
    if let Some(grounding) = session.grounding() {
        println!("{}", render::render_papers(&grounding.corpus));
    }
    Ok(interaction)
}

async fn act(session: &mut Session, action: UserAction, verbose: bool) -> Result<Interaction> {
    let interaction = session.on_user_action(action).await?;
    if verbose {
        eprintln!("{}", interaction.run_log.summary());
    }
    Ok(interaction)
}

/// Blank CLI input counts as absent.
fn present(input: Option<String>) -> Option<String> {
    input.filter(|s| !s.trim().is_empty())
}

fn print_tail(interaction: &Interaction) {
    if !interaction.tail.is_empty() {
        println!("{}", render::render_transcript(&interaction.tail));
    }
}

async fn chat(session: &mut Session, verbose: bool) -> Result<()> {
    eprintln!(
        "Ask a research question (e.g. \"plot the trend of ...\"). \
         /mode <article|round-table|research> switches mode, /quit ends."
    );

    let stdin = std::io::stdin();
    loop {
        eprint!("> ");
        std::io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        let action = match line.strip_prefix("/mode") {
            Some(name) => match Mode::from_str_loose(name) {
                Some(mode) => UserAction::SelectMode(mode),
                None => {
                    eprintln!("Unknown mode: {}", name.trim());
                    continue;
                }
            },
            None => UserAction::SubmitInput(line.to_string()),
        };

        act(session, action, verbose).await?;

        // The whole transcript is redrawn after every turn.
        println!("{}", render::render_transcript(session.transcript()));
        if let Some(grounding) = session.grounding() {
            println!("---\nFetched and processed {} papers.\n", grounding.corpus.len());
        }
    }

    act(session, UserAction::EndSession, verbose).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_follow_up_is_absent() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(Some("  \t".into())), None);
        assert_eq!(present(Some("why?".into())), Some("why?".into()));
    }
}
