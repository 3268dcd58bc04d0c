//! Local journal CLI.
//!
//! # Responsibility
//! - Drive `mindcare_core` against a SQLite-backed store and a seeded dev
//!   wallet, one command per invocation.
//! - Keep output line-oriented for shell pipelines.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mindcare_core::identity::short_address;
use mindcare_core::{
    init_logging, suggested_categories, DevWallet, EntryDraft, JournalConfig, JournalService,
    RecordId, RevealOutcome, SqliteKvStore, TransactionStatus, Wallet,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "mindcare", version, about = "Private mood and stress journal")]
struct Cli {
    /// SQLite file backing the journal.
    #[arg(long, env = "MINDCARE_DB", default_value = "mindcare.db")]
    db: PathBuf,

    /// TOML config; defaults apply when the file is missing.
    #[arg(long, env = "MINDCARE_CONFIG", default_value = "mindcare.toml")]
    config: PathBuf,

    /// Absolute directory for rotating log files. Logging is off when unset.
    #[arg(long, env = "MINDCARE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Seed phrase for the local dev wallet.
    #[arg(long, env = "MINDCARE_SEED", default_value = "mindcare-dev")]
    seed: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// List stored entries, newest first.
    List {
        /// Only entries written by the dev wallet.
        #[arg(long)]
        mine: bool,
    },
    /// Store a new entry.
    Add {
        #[arg(long, default_value = "Daily Check-in")]
        category: String,
        #[arg(long, default_value_t = 5)]
        mood: u8,
        #[arg(long, default_value_t = 5)]
        stress: u8,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Sign the challenge and print the decoded levels of one entry.
    Reveal { id: String },
    /// Recent feedback and the mood trend.
    Insights {
        /// Reveal every plotted entry; prompts once per entry.
        #[arg(long)]
        reveal: bool,
    },
    /// Print the suggested categories.
    Categories,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = JournalConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&config.log_level, log_dir).context("starting logger")?;
    }

    match cli.command {
        Command::Ping => {
            println!("mindcare_core ping={}", mindcare_core::ping());
            println!("mindcare_core version={}", mindcare_core::core_version());
            return Ok(());
        }
        Command::Categories => {
            for category in suggested_categories() {
                println!("{category}");
            }
            return Ok(());
        }
        _ => {}
    }

    let kv = SqliteKvStore::open(&cli.db)
        .with_context(|| format!("opening {}", cli.db.display()))?;
    let wallet: Arc<dyn Wallet> = Arc::new(DevWallet::from_seed(&cli.seed));
    let mut journal = JournalService::new(kv, wallet, &config)?;
    let address = journal.connect()?;

    match cli.command {
        Command::List { mine } => {
            journal.refresh();
            for record in journal.records() {
                if mine && !journal.is_owner(record) {
                    continue;
                }
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id,
                    record.timestamp,
                    short_address(&record.owner),
                    record.category,
                    record.note
                );
            }
        }
        Command::Add {
            category,
            mood,
            stress,
            note,
        } => {
            let draft = EntryDraft {
                category,
                mood,
                stress,
                note,
            };
            let outcome = journal.submit(draft);
            if let TransactionStatus::Success(message) | TransactionStatus::Error(message) =
                journal.status()
            {
                println!("{message}");
            }
            let record = outcome?;
            println!("{}\t{}", record.id, record.derived_annotation);
        }
        Command::Reveal { id } => {
            journal.refresh();
            let id = RecordId::from(id);
            match journal.toggle_reveal(&id).await? {
                RevealOutcome::Revealed(values) => {
                    println!("mood={} stress={}", values.mood, values.stress);
                }
                RevealOutcome::Hidden => bail!("entry {id} was already revealed"),
            }
        }
        Command::Insights { reveal } => {
            journal.refresh();
            println!("wallet {}", short_address(&address));
            for record in journal.recent_feedback() {
                println!("feedback\t{}\t{}", record.id, record.derived_annotation);
            }
            if reveal {
                let ids: Vec<RecordId> = journal
                    .mood_trend()
                    .into_iter()
                    .map(|point| point.id)
                    .collect();
                for id in ids {
                    journal.toggle_reveal(&id).await?;
                }
            }
            for point in journal.mood_trend() {
                let mood = point
                    .mood
                    .map(|mood| mood.to_string())
                    .unwrap_or_else(|| "hidden".to_string());
                println!("trend\t{}\t{}\t{}", point.id, point.timestamp, mood);
            }
        }
        Command::Ping | Command::Categories => {}
    }

    Ok(())
}
