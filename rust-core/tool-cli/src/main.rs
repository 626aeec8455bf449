use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_agent_core::agent::{AgentEvent, AgentTranscript, EntryKind};
use deck_agent_core::collaborators::{HttpKnowledgeBase, KnowledgeBase, KnowledgeQuery};
use deck_agent_core::observability::{setup_logging, LogFormat, MetricsCollector};
use deck_agent_core::{Collaborators, Dispatcher, Settings, StreamAggregator};
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(
    name = "deck-agent",
    version,
    about = "Tool backend for a presentation-building agent"
)]
struct Cli {
    /// Settings file (TOML); environment variables override it
    #[arg(long, global = true, env = "DECK_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format (json, pretty)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch one tool-call request and print the response envelope
    Invoke {
        /// Request JSON file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print Prometheus metrics to stderr when done
        #[arg(long)]
        metrics: bool,
    },
    /// Stream a knowledge base answer with its citations
    Ask {
        #[arg(long, env = "KNOWLEDGE_BASE_ID")]
        knowledge_base_id: String,

        /// Overrides the configured generation model
        #[arg(long)]
        model_arn: Option<String>,

        question: String,
    },
    /// Replay an NDJSON agent event log as a transcript
    Transcript {
        /// Event log file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display())),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("read stdin")?;
            Ok(buffer)
        }
    }
}

async fn invoke(settings: &Settings, input: Option<&Path>, metrics: bool) -> Result<()> {
    let raw = read_input(input).await?;
    let collaborators =
        Collaborators::from_settings(settings).context("build collaborators")?;

    let mut dispatcher = Dispatcher::new(settings, collaborators);
    let collector = if metrics {
        let collector = MetricsCollector::new().context("create metrics registry")?;
        dispatcher = dispatcher.with_metrics(collector.clone());
        Some(collector)
    } else {
        None
    };

    let envelope = match serde_json::from_str(&raw) {
        Ok(event) => dispatcher.dispatch_value(event).await,
        Err(err) => {
            tracing::warn!(error = %err, "Request is not valid JSON");
            dispatcher
                .dispatch_value(serde_json::Value::String(raw))
                .await
        }
    };

    println!("{}", serde_json::to_string(&envelope)?);

    if let Some(collector) = collector {
        eprint!("{}", collector.export().context("export metrics")?);
    }
    Ok(())
}

/// Writes answer fragments as they arrive, keeping the first write failure.
struct FragmentPrinter<W: Write> {
    out: W,
    error: Option<std::io::Error>,
}

impl<W: Write> FragmentPrinter<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn print(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let written = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        self.error = written.err();
    }

    fn finish(self) -> std::io::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn ask(
    settings: &Settings,
    knowledge_base_id: String,
    model_arn: Option<String>,
    question: String,
) -> Result<()> {
    let query = KnowledgeQuery::new(
        question,
        knowledge_base_id,
        model_arn.unwrap_or_else(|| settings.knowledge.model_arn.clone()),
        settings.knowledge.max_query_chars,
    )?;

    let knowledge_base = HttpKnowledgeBase::new(&settings.knowledge);
    let stream = knowledge_base
        .retrieve_and_generate(&query)
        .await
        .context("start knowledge base stream")?;

    let mut printer = FragmentPrinter::new(std::io::stdout());
    let mut aggregator = StreamAggregator::new();
    let outcome = aggregator
        .consume(stream, |event, _| {
            if let Some(output) = &event.output {
                printer.print(&output.text);
            }
        })
        .await;

    printer.finish().context("write answer to stdout")?;
    println!();

    let state = aggregator.finish();
    if !state.citations().is_empty() {
        println!("\nSources:");
        for citation in state.citations() {
            println!("- {}", citation);
        }
    }

    outcome.context("knowledge base stream failed")
}

async fn transcript(input: Option<&Path>) -> Result<()> {
    let raw = read_input(input).await?;
    let mut transcript = AgentTranscript::new();

    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: AgentEvent = serde_json::from_str(line)
            .with_context(|| format!("decode event on line {}", index + 1))?;

        for entry in transcript.apply(&event) {
            let marker = match entry.kind {
                EntryKind::Thinking => "[thinking]",
                EntryKind::Action => "[action]",
            };
            println!("{} {}", marker, entry.content);
        }
    }

    let (response, _) = transcript.finish();
    println!("\n{}", response);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_format);

    let settings = Settings::load(cli.config.as_deref())
        .await
        .context("load settings")?;

    match cli.command {
        Command::Invoke { input, metrics } => invoke(&settings, input.as_deref(), metrics).await,
        Command::Ask {
            knowledge_base_id,
            model_arn,
            question,
        } => ask(&settings, knowledge_base_id, model_arn, question).await,
        Command::Transcript { input } => transcript(input.as_deref()).await,
    }
}
