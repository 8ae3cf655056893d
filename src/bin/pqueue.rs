//! pqueue CLI — stage work items from a file and drain them with workers.

use clap::{Args, Parser, Subcommand};
use process_queue::config::Config;
use process_queue::input::read_records;
use process_queue::telemetry::item::{record_state_transition, start_item_span};
use process_queue::telemetry::{TelemetryConfig, init_telemetry};
use process_queue::{ItemState, ProcessQueue, QueueConfig, QueueItem, Record, SharedQueue};
use std::path::PathBuf;
use tracing::{Instrument, info, warn};

#[derive(Parser)]
#[command(name = "pqueue", about = "Stage and drain uniquely identified work items")]
struct Cli {
    /// TOML config file (replaces environment configuration)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue items from a file and print the pending sequence
    Load {
        /// JSON array or JSON Lines file of items with an `id` field
        file: PathBuf,
        #[command(flatten)]
        queue: QueueArgs,
    },
    /// Queue items from a file and drain them with concurrent workers
    Drain {
        /// JSON array or JSON Lines file of items with an `id` field
        file: PathBuf,
        #[command(flatten)]
        queue: QueueArgs,
        /// Number of concurrent workers
        #[arg(long, default_value_t = 2)]
        workers: usize,
        /// Items claimed per batch
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
    },
}

#[derive(Args)]
struct QueueArgs {
    /// Re-queued items keep their position; new items go to the tail
    #[arg(long)]
    emplace: bool,
    /// Maximum number of pending items
    #[arg(long, conflicts_with = "unbounded")]
    max_size: Option<usize>,
    /// Do not cap the number of pending items
    #[arg(long)]
    unbounded: bool,
}

impl QueueArgs {
    fn apply(&self, mut config: QueueConfig) -> QueueConfig {
        if self.emplace {
            config = config.emplace(true);
        }
        if let Some(max_size) = self.max_size {
            config = config.max_size(max_size);
        }
        if self.unbounded {
            config = config.unbounded();
        }
        config
    }
}

#[derive(Debug, Default)]
struct LoadSummary {
    queued: usize,
    in_process: usize,
    rejected: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let _guard = init_telemetry(TelemetryConfig::from_config(&config, "pqueue"))?;

    match cli.command {
        Command::Load { file, queue } => cmd_load(file, queue.apply(config.queue)),
        Command::Drain {
            file,
            queue,
            workers,
            batch_size,
        } => cmd_drain(file, queue.apply(config.queue), workers, batch_size).await,
    }
}

fn load_records(queue: &mut ProcessQueue<Record>, records: Vec<Record>) -> LoadSummary {
    let mut summary = LoadSummary::default();
    for record in records {
        let id = record.id();
        match queue.queue_item(record) {
            Ok(true) => summary.queued += 1,
            Ok(false) => summary.in_process += 1,
            Err(e) => {
                warn!(%id, "item skipped: {e}");
                summary.rejected += 1;
            }
        }
    }
    summary
}

fn cmd_load(file: PathBuf, config: QueueConfig) -> anyhow::Result<()> {
    let records = read_records(&file)?;
    let mut queue = ProcessQueue::with_config(config);
    let summary = load_records(&mut queue, records);

    let pending = queue.get_queue(false);
    if pending.is_empty() {
        println!("Queue is empty.");
    } else {
        println!("{:<4}  {:<20}  FIELDS", "POS", "ID");
        println!("{}", "-".repeat(80));
        for (pos, record) in pending.iter().enumerate() {
            let fields = serde_json::to_string(record.fields())?;
            let fields_display = if fields.chars().count() > 50 {
                format!("{}...", fields.chars().take(50).collect::<String>())
            } else {
                fields
            };
            println!("{:<4}  {:<20}  {}", pos, record.id.to_string(), fields_display);
        }
    }

    println!(
        "\n{} queued, {} already in process, {} rejected; {} pending",
        summary.queued,
        summary.in_process,
        summary.rejected,
        queue.len()
    );
    Ok(())
}

async fn cmd_drain(
    file: PathBuf,
    config: QueueConfig,
    workers: usize,
    batch_size: usize,
) -> anyhow::Result<()> {
    if workers == 0 || batch_size == 0 {
        anyhow::bail!("--workers and --batch-size must both be at least 1");
    }

    let records = read_records(&file)?;
    let mut queue = ProcessQueue::with_config(config);
    let summary = load_records(&mut queue, records);
    info!(
        queued = summary.queued,
        rejected = summary.rejected,
        "items loaded"
    );

    let queue = SharedQueue::from(queue);
    let mut handles = Vec::with_capacity(workers);
    for n in 0..workers {
        let queue = queue.clone();
        let worker = format!("worker-{n}");
        handles.push(tokio::spawn(run_worker(queue, worker, batch_size)));
    }

    let mut processed = 0;
    for handle in handles {
        processed += handle.await?;
    }

    println!(
        "{processed} item(s) processed by {workers} worker(s); {} pending, {} in process",
        queue.len(),
        queue.process_size()
    );
    Ok(())
}

/// Claim batches until the queue is empty, marking each item done.
async fn run_worker(queue: SharedQueue<Record>, worker: String, batch_size: usize) -> usize {
    let mut processed = 0;
    loop {
        let batch = queue.process_batch(batch_size);
        if batch.is_empty() {
            break;
        }

        for item in batch {
            let span = start_item_span(&worker, &item.id);
            async {
                record_state_transition(&span, ItemState::Pending, Some(ItemState::InProcess));
                info!(fields = %serde_json::Value::Object(item.fields().clone()), "processing item");
                tokio::task::yield_now().await;
                queue.done_processing(&item.id);
                record_state_transition(&span, ItemState::InProcess, None);
            }
            .instrument(span.clone())
            .await;
            processed += 1;
        }
    }

    info!(worker = %worker, processed, "worker finished");
    processed
}
