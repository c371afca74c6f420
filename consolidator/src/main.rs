//! Consolidator binary entry point

use clap::Parser;
use std::path::PathBuf;

use consolidator::{Consolidator, ConsolidatorConfig, ConsolidatorResult};
use shared::{logging, process_info, ProcessId};

/// Merge generator checkpoint batches into one deduplicated corpus
#[derive(Parser)]
#[command(name = "consolidator")]
#[command(about = "Merges persona batches, tags their source model and removes duplicates")]
struct Args {
    /// Directory containing batch files (repeatable)
    #[arg(long = "input-dir", default_value = "data/raw")]
    input_dirs: Vec<PathBuf>,

    /// Directory for the timestamped consolidated file
    #[arg(long, default_value = "data/processed")]
    output_dir: PathBuf,

    /// Explicit output file, overrides --output-dir
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ConsolidatorResult<()> {
    let args = Args::parse();

    ProcessId::init_consolidator();
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(ProcessId::current(), "batch consolidation");

    let config = ConsolidatorConfig {
        input_dirs: args.input_dirs,
        output_dir: args.output_dir,
        output_file: args.output,
    };

    let report = match Consolidator::new(config).run().await {
        Ok(report) => report,
        Err(e) => {
            logging::log_error(ProcessId::current(), "consolidation", &e);
            return Err(e);
        }
    };

    for skipped in &report.skipped {
        process_info!(ProcessId::current(), "  skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    match &report.output_path {
        Some(path) => logging::log_success(
            ProcessId::current(),
            &format!(
                "{} files processed, {} unique personas written to {} ({} duplicates removed)",
                report.files_processed,
                report.unique_records,
                path.display(),
                report.duplicates_removed()
            ),
        ),
        None => logging::log_shutdown(ProcessId::current(), "no input batches found"),
    }

    Ok(())
}
