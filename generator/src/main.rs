//! Generator binary entry point

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;

use generator::{
    config::load_api_key, GeneratorConfig, GeneratorResult, HttpModelClient, JsonlCheckpointWriter,
    PromptComposer, ReferencePool, Scheduler, SeedData,
};
use shared::{logging, process_debug, process_info, process_warn, ProcessId};

/// Grow a persona corpus from seed personas with a remote model
#[derive(Parser)]
#[command(name = "generator")]
#[command(about = "Generates synthetic personas with drift-resistant reference sampling")]
struct Args {
    /// Number of accepted personas to reach
    #[arg(long, default_value = "5000")]
    target: usize,

    /// Model identifier
    #[arg(long, default_value = "Qwen/Qwen3-235B-A22B-Instruct-2507")]
    model: String,

    /// Inference provider suffix appended as `model:provider` (empty to omit)
    #[arg(long, default_value = "together")]
    provider: String,

    /// OpenAI-compatible API root
    #[arg(long, default_value = "https://router.huggingface.co/v1")]
    base_url: String,

    /// Maximum attempts in flight
    #[arg(long, default_value = "20")]
    concurrency: usize,

    /// Flush to disk after this many accepted personas
    #[arg(long, default_value = "50")]
    checkpoint_every: usize,

    /// Every Nth attempt samples only seed personas (0 disables)
    #[arg(long, default_value = "50")]
    reset_every: usize,

    /// Reference personas per attempt
    #[arg(long, default_value = "3")]
    num_references: usize,

    /// Most recent personas eligible as references
    #[arg(long, default_value = "20")]
    lookback: usize,

    #[arg(long, default_value = "0.8")]
    temperature: f32,

    #[arg(long, default_value = "512")]
    max_tokens: u32,

    /// Seconds a failed attempt holds its slot before it is replaced
    #[arg(long, default_value = "2")]
    failure_backoff_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "120")]
    request_timeout_secs: u64,

    /// Directory for checkpoint files
    #[arg(long, default_value = "data/raw")]
    output_dir: PathBuf,

    /// Directory holding seed personas, components and name lists
    #[arg(long, default_value = "data/seed")]
    seed_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> GeneratorConfig {
        GeneratorConfig {
            target: self.target,
            model: self.model,
            provider: Some(self.provider).filter(|p| !p.trim().is_empty()),
            base_url: self.base_url,
            concurrency: self.concurrency,
            checkpoint_every: self.checkpoint_every,
            reset_every: self.reset_every,
            num_references: self.num_references,
            lookback: self.lookback,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            failure_backoff: Duration::from_secs(self.failure_backoff_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            output_dir: self.output_dir,
            seed_dir: self.seed_dir,
        }
    }
}

#[tokio::main]
async fn main() -> GeneratorResult<()> {
    let args = Args::parse();

    ProcessId::init_generator();
    logging::init_tracing_with_level(Some(&args.log_level));

    let config = args.into_config();
    config.validate()?;
    logging::log_startup(ProcessId::current(), &format!("model {}", config.api_model()));
    process_debug!(ProcessId::current(), "Configuration: {:?}", config);

    let api_key = load_api_key()?;
    let seed = SeedData::load(&config.seed_dir).await?;

    let pool = ReferencePool::new(seed.personas)?;
    let composer = PromptComposer::new(seed.components, seed.names)?;
    let client = HttpModelClient::new(&config.base_url, config.api_model(), api_key, config.request_timeout)?;

    let started_at = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
    let writer = JsonlCheckpointWriter::for_run(&config.output_dir, &config.model, started_at);

    let mut scheduler = Scheduler::new(config.scheduler_config(), client, composer, pool, writer);

    let shutdown = scheduler.shutdown_sender();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            process_warn!(ProcessId::current(), "🛑 Ctrl+C received, finishing in-flight attempts");
            let _ = shutdown.send(()).await;
        }
    });

    let summary = match scheduler.run().await {
        Ok(summary) => summary,
        Err(e) => {
            logging::log_error(ProcessId::current(), "generation run", &e);
            return Err(e);
        }
    };

    if summary.interrupted {
        logging::log_shutdown(ProcessId::current(), "interrupted");
    } else if summary.target_reached() {
        logging::log_success(
            ProcessId::current(),
            &format!("generated {} personas into {}", summary.accepted, summary.destination),
        );
    }
    process_info!(
        ProcessId::current(),
        "📊 {} accepted / {} requested, {} failed attempts, {} checkpoints",
        summary.accepted,
        summary.requested,
        summary.failed,
        summary.intermediate_flushes
    );

    Ok(())
}
