use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use extract::{ModelConfig, OpenAiClient};
use pipeline::Pipeline;

/// Generate an interactive entity relationship graph from raw text.
#[derive(Parser, Debug)]
#[command(name = "textgraph", version)]
struct Args {
    /// Path to the input text file.
    #[arg(long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Literal input text, as an alternative to --input.
    #[arg(long)]
    text: Option<String>,

    /// Output path for the HTML visualization.
    #[arg(long, default_value = "graph.html")]
    output: PathBuf,

    /// Model identifier sent to the provider.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Provider API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds for each model call.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

// The pipeline is strictly sequential, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let text = match (&args.input, &args.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => bail!("provide --input <file> or --text <string>"),
    };

    let text = text.trim();
    if text.is_empty() {
        bail!("input text is empty");
    }

    let config = ModelConfig {
        base_url: args.base_url,
        api_key: args.api_key,
        model: args.model,
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let client = OpenAiClient::new(config).context("failed to construct model client")?;

    let summary = Pipeline::new(&client)
        .run(text, &args.output)
        .await
        .context("pipeline run failed")?;

    println!(
        "Graph saved to {} ({} entities, {} relationships)",
        summary.output_path.display(),
        summary.entities,
        summary.relationships
    );
    Ok(())
}
