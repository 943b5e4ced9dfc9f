/*!
 * sync-coord - Command Line Entry Point
 *
 * - `master-worker`: producer/consumer run over a bounded queue
 * - `rw-mix`: randomized reader/writer workload over one lock
 */

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use std::io::{self, BufWriter, Write};
use std::time::Duration;
use tracing::info;

use parking_lot::Mutex;
use sync_coord::core::limits::{DEFAULT_RW_OPERATIONS, DEFAULT_RW_READERS, DEFAULT_RW_WRITERS, MAX_RW_HOLD};
use sync_coord::init_tracing;
use sync_coord::queue::{ActorId, Discipline, EventKind, Item, Reporter, TracingReporter};
use sync_coord::rwlock::Preference;
use sync_coord::workload::{master_worker, rw_mix, MasterWorkerConfig, RwMixConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run producer (master) and consumer (worker) threads over a bounded queue
    ///
    /// e.g. `sync-coord master-worker 10000 1000 4 3`
    MasterWorker {
        /// Items to produce and consume
        total_items: u64,
        /// Buffer capacity
        capacity: usize,
        /// Consumer threads
        num_workers: usize,
        /// Producer threads
        num_masters: usize,
        /// Consume in arrival order instead of stack order
        #[arg(long)]
        fifo: bool,
        /// Send produce/consume lines to the debug log instead of stdout
        #[arg(short, long)]
        quiet: bool,
        /// Print only the summary, as JSON (implies --quiet)
        #[arg(long)]
        json: bool,
    },
    /// Run reader and writer threads against one reader-writer lock
    RwMix {
        #[arg(long, default_value_t = DEFAULT_RW_READERS)]
        readers: usize,
        #[arg(long, default_value_t = DEFAULT_RW_WRITERS)]
        writers: usize,
        #[arg(long, default_value_t = DEFAULT_RW_OPERATIONS)]
        operations: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Longest time a role is held, in microseconds
        #[arg(long, default_value_t = MAX_RW_HOLD.as_micros() as u64)]
        max_hold_us: u64,
        /// Let readers pass waiting writers
        #[arg(long)]
        reader_preferred: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Prints `Produced <n> by master <id>` / `Consumed <n> by worker <id>`
///
/// Output is buffered and flushed when the reporter is dropped.
struct ConsoleReporter {
    out: Mutex<BufWriter<io::Stdout>>,
}

impl ConsoleReporter {
    fn new() -> Self {
        Self {
            out: Mutex::new(BufWriter::new(io::stdout())),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, kind: EventKind, item: Item, actor: ActorId) {
        let mut out = self.out.lock();
        // stdout going away mid-run is not worth stopping the workers for
        let _ = match kind {
            EventKind::Produced => writeln!(out, "Produced {} by master {}", item, actor),
            EventKind::Consumed => writeln!(out, "Consumed {} by worker {}", item, actor),
        };
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_tracing();

    match args.command {
        Command::MasterWorker {
            total_items,
            capacity,
            num_workers,
            num_masters,
            fifo,
            quiet,
            json,
        } => {
            let mut config = MasterWorkerConfig::new(total_items, capacity, num_workers, num_masters);
            if fifo {
                config.discipline = Discipline::Fifo;
            }

            // The reporter is dropped (and its buffer flushed) when the run ends
            let summary = if quiet || json {
                master_worker::run(config, TracingReporter)?
            } else {
                master_worker::run(config, ConsoleReporter::new())?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
            } else {
                // Join order itself is logged by the run
                for line in summary.actor_lines() {
                    println!("{}", line);
                }
                info!(
                    produced = summary.total_produced(),
                    consumed = summary.total_consumed(),
                    peak_len = summary.stats.peak_len,
                    elapsed_ms = summary.elapsed_ms,
                    "Done"
                );
            }
        }
        Command::RwMix {
            readers,
            writers,
            operations,
            seed,
            max_hold_us,
            reader_preferred,
            json,
        } => {
            let config = RwMixConfig {
                readers,
                writers,
                operations,
                seed,
                max_hold: Duration::from_micros(max_hold_us),
                preference: if reader_preferred {
                    Preference::ReaderPreferred
                } else {
                    Preference::WriterPreferred
                },
            };

            let summary = rw_mix::run(config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
            } else {
                println!(
                    "reads={} writes={} violations={} peak_readers={} elapsed_ms={}",
                    summary.reads,
                    summary.writes,
                    summary.violations,
                    summary.stats.peak_readers,
                    summary.elapsed_ms
                );
            }

            if summary.violations > 0 {
                return Err(miette::miette!(
                    "mutual exclusion violated {} times",
                    summary.violations
                ));
            }
        }
    }

    Ok(())
}
