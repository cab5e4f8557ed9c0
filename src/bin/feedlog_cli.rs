use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use feedlog::{FeedId, FeedStore, SampleOptions, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "feedlog-cli")]
#[command(about = "Inspect and maintain flat-file time-series feeds")]
struct Cli {
    /// JSON store config file
    #[arg(long, conflicts_with = "data_dir")]
    config: Option<PathBuf>,

    /// Data directory (overrides the default when no config file is given)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty feed file
    Create { id: FeedId },
    /// Post (append or update) one datapoint
    Post { id: FeedId, time: u32, value: f32 },
    /// Delete a feed file
    Delete { id: FeedId },
    /// Print file size and record count
    Size { id: FeedId },
    /// Print the last stored datapoint
    Last { id: FeedId },
    /// Interval sampling with gap handling
    Sample {
        id: FeedId,
        /// Start time in milliseconds
        start: i64,
        /// End time in milliseconds
        end: i64,
        /// Step in seconds
        #[arg(long, default_value_t = 60)]
        interval: i64,
        #[arg(long)]
        skip_missing: bool,
        #[arg(long)]
        limit_interval: bool,
    },
    /// Fixed-step sampling
    Legacy {
        id: FeedId,
        start: i64,
        end: i64,
        #[arg(long, default_value_t = 60)]
        interval: i64,
    },
    /// One point per local midnight
    Daily {
        id: FeedId,
        start: i64,
        end: i64,
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Stream raw records from a byte offset to stdout
    ExportRaw {
        id: FeedId,
        #[arg(long, default_value_t = 0)]
        start_byte: i64,
    },
    /// Stream fixed-step samples as CSV to stdout
    ExportCsv {
        id: FeedId,
        start: i64,
        end: i64,
        #[arg(long, default_value_t = 60)]
        interval: i64,
        #[arg(long)]
        timezone: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match (cli.config, cli.data_dir) {
        (Some(path), _) => StoreConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        (None, Some(dir)) => StoreConfig::new(dir),
        (None, None) => StoreConfig::default(),
    };
    config.validate().context("invalid store config")?;
    info!("Data directory: {}", config.data_dir.display());
    let store = FeedStore::new(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Create { id } => {
            if !store.create_feed(id) {
                bail!("could not create feed {id}");
            }
        }
        Command::Post { id, time, value } => {
            let outcome = store
                .post(id, time, value)
                .with_context(|| format!("posting to feed {id}"))?;
            writeln!(out, "{outcome:?}")?;
        }
        Command::Delete { id } => {
            let removed = store.delete_feed(id)?;
            writeln!(out, "{}", if removed { "deleted" } else { "absent" })?;
        }
        Command::Size { id } => {
            let size = store.feed_size(id)?;
            writeln!(out, "{size} bytes, {} records", store.record_count(id)?)?;
        }
        Command::Last { id } => {
            let last = store.lastvalue(id)?;
            writeln!(out, "{}", serde_json::json!({ "time": last.time, "value": last.value }))?;
        }
        Command::Sample {
            id,
            start,
            end,
            interval,
            skip_missing,
            limit_interval,
        } => {
            let options = SampleOptions {
                skip_missing,
                limit_interval,
            };
            for sample in store.sample(id, start, end, interval, options)? {
                writeln!(out, "{}", serde_json::to_string(&sample)?)?;
            }
        }
        Command::Legacy {
            id,
            start,
            end,
            interval,
        } => {
            for point in store.sample_legacy(id, start, end, interval)? {
                writeln!(out, "{}", serde_json::to_string(&point)?)?;
            }
        }
        Command::Daily {
            id,
            start,
            end,
            timezone,
        } => {
            for point in store.sample_daily(id, start, end, timezone.as_deref())? {
                writeln!(out, "{}", serde_json::to_string(&point)?)?;
            }
        }
        Command::ExportRaw { id, start_byte } => {
            let written = store.export_raw(id, start_byte, &mut out)?;
            info!("Exported {written} bytes from feed {id}");
        }
        Command::ExportCsv {
            id,
            start,
            end,
            interval,
            timezone,
        } => {
            let lines = store.export_csv(id, start, end, interval, timezone.as_deref(), &mut out)?;
            info!("Exported {lines} lines from feed {id}");
        }
    }
    out.flush()?;
    Ok(())
}
