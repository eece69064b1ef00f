use anyhow::Context;
use distributed_mapreduce::driver::dispatch::{self, DispatchConfig};
use distributed_mapreduce::driver::ingestion;
use distributed_mapreduce::driver::merge;
use std::path::PathBuf;

const DEFAULT_DATASET_DIR: &str = "sample_dataset/student_scores";
const DEFAULT_OUTPUT_PATH: &str = "output.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let mut ports: Vec<u16> = Vec::new();
    let mut dataset_dir = PathBuf::from(DEFAULT_DATASET_DIR);
    let mut output_path = PathBuf::from(DEFAULT_OUTPUT_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dataset" => {
                dataset_dir = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "--output" => {
                output_path = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            port => {
                ports.push(port.parse()?);
                i += 1;
            }
        }
    }

    if ports.is_empty() {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    tracing::info!("Starting map-reduce processing...");
    tracing::info!("Engine ports: {:?}", ports);

    let batches = ingestion::load_dataset(&dataset_dir)?;
    tracing::info!(
        "Found {} file(s) to process in {}",
        batches.len(),
        dataset_dir.display()
    );

    let results = dispatch::dispatch_batches(batches, &ports, DispatchConfig::default()).await;
    let successful: Vec<_> = results.into_iter().flatten().collect();

    tracing::info!("Merging {} response(s)...", successful.len());
    let merged = merge::merge_results(&successful);

    tracing::info!("Writing output...");
    merge::write_output(&merged, &output_path)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    tracing::info!("Processing complete");

    Ok(())
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <port> [<port> ...] [--dataset <dir>] [--output <file>]",
        program
    );
    eprintln!("Example: {} 9000 9001 9002", program);
}
