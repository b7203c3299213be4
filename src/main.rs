use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod config;
mod contract;
mod db;
mod districts;
mod error;
mod format;
mod models;
mod report;
mod retry;
mod stats;

use config::Config;
use contract::ContractOptions;
use models::Booking;

#[derive(Parser)]
#[command(name = "booking-manager")]
#[command(about = "Concert bookings, contracts and stats for the band", long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample bookings
    Seed,
    /// Import bookings from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List bookings, latest first; cancelled ones are tagged
    List {
        /// Hide cancelled bookings
        #[arg(long)]
        active_only: bool,
    },
    /// Add a booking, or update one when --id is given
    Save(SaveArgs),
    /// Cancel a booking
    Cancel {
        #[arg(long)]
        id: Uuid,
    },
    /// Restore a cancelled booking
    Restore {
        #[arg(long)]
        id: Uuid,
    },
    /// Permanently delete a booking
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Record the balance as received and print a paid-in-full contract
    MarkPaid {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        no_contract: bool,
    },
    /// Write the printable contract for a booking
    Contract {
        #[arg(long)]
        id: Uuid,
        /// Output file; defaults to the contracts folder
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Yearly, monthly and district booking counts
    Stats {
        /// Write the markdown report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SaveArgs {
    #[arg(long)]
    id: Option<Uuid>,
    #[arg(long)]
    organizer: String,
    #[arg(long)]
    venue: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    district: String,
    /// Concert date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
    /// Stage time, HH:MM (24-hour)
    #[arg(long)]
    time: String,
    #[arg(long)]
    sound: bool,
    /// Total amount; separators such as 1,50,000 are accepted
    #[arg(long)]
    total: String,
    #[arg(long)]
    advance: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    note: Option<String>,
    /// Skip writing the contract after saving
    #[arg(long)]
    no_contract: bool,
}

impl SaveArgs {
    fn into_booking(self, existing: Option<&Booking>) -> anyhow::Result<Booking> {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Booking {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            organizer: self.organizer.trim().to_string(),
            venue: self.venue.trim().to_string(),
            city: self.city.trim().to_string(),
            district: Some(self.district.trim().to_string()),
            date: self.date,
            time: format::parse_clock_time(&self.time)?,
            is_sound_included: self.sound,
            total: format::parse_amount(&self.total).context("invalid --total")?,
            advance: format::parse_amount(&self.advance).context("invalid --advance")?,
            contact: non_blank(self.contact),
            note: non_blank(self.note),
            is_cancelled: existing.map(|b| b.is_cancelled).unwrap_or(false),
        })
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("booking_manager=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn contract_options(config: &Config, paid_in_full: bool) -> ContractOptions<'_> {
    ContractOptions {
        band: &config.band,
        accent: &config.theme.accent,
        paid_in_full,
    }
}

/// Writes the contract to `out`, or into the contracts folder by default.
fn write_booking_contract(
    config: &Config,
    booking: &Booking,
    paid_in_full: bool,
    out: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let options = contract_options(config, paid_in_full);
    match out {
        Some(path) => {
            contract::write_contract_to(path, booking, &options)?;
            Ok(path.to_path_buf())
        }
        None => contract::write_contract(&config.resolve_contracts_dir(), booking, &options),
    }
}

fn visible_bookings(bookings: &[Booking], active_only: bool) -> Vec<&Booking> {
    bookings
        .iter()
        .filter(|b| !active_only || !b.is_cancelled)
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let database_url = config
        .resolve_database_url(std::env::var(config::DATABASE_URL_ENV).ok())
        .context("DATABASE_URL must be set, or database_url given in the config file")?;
    let retry = config.retry;
    let today = Local::now().date_naive();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&pool, retry).await?;
            println!("Inserted {inserted} seed bookings.");
        }
        Commands::Import { csv } => {
            let saved = db::import_csv(&pool, retry, &csv, &config.districts).await?;
            println!("Saved {saved} bookings from {}.", csv.display());
        }
        Commands::List { active_only } => {
            let bookings = db::list_bookings(&pool, retry).await?;
            let visible = visible_bookings(&bookings, active_only);

            if visible.is_empty() {
                println!("No bookings found.");
                return Ok(());
            }
            for booking in visible {
                println!("{}", report::booking_line(booking, today));
            }
        }
        Commands::Save(args) => {
            let existing = match args.id {
                Some(id) => db::fetch_booking(&pool, retry, id).await?,
                None => None,
            };
            let no_contract = args.no_contract;
            let booking = args.into_booking(existing.as_ref())?;
            booking.validate(&config.districts)?;
            db::save_booking(&pool, retry, &booking).await?;
            println!("Booking {} saved.", booking.id);
            if !no_contract {
                let path = write_booking_contract(&config, &booking, false, None)?;
                println!("Contract written to {}.", path.display());
            }
        }
        Commands::Cancel { id } => {
            if db::set_cancelled(&pool, retry, id, true).await? {
                println!("Booking {id} cancelled.");
            } else {
                anyhow::bail!("no booking with id {id}");
            }
        }
        Commands::Restore { id } => {
            if db::set_cancelled(&pool, retry, id, false).await? {
                println!("Booking {id} restored.");
            } else {
                anyhow::bail!("no booking with id {id}");
            }
        }
        Commands::Delete { id } => {
            if db::delete_booking(&pool, retry, id).await? {
                println!("Booking {id} deleted.");
            } else {
                anyhow::bail!("no booking with id {id}");
            }
        }
        Commands::MarkPaid { id, no_contract } => {
            let booking = db::mark_paid(&pool, retry, id)
                .await?
                .with_context(|| format!("no booking with id {id}"))?;
            println!("Booking {id} marked as paid in full.");
            if !no_contract {
                let path = write_booking_contract(&config, &booking, true, None)?;
                println!("Contract written to {}.", path.display());
            }
        }
        Commands::Contract { id, out } => {
            let booking = db::fetch_booking(&pool, retry, id)
                .await?
                .with_context(|| format!("no booking with id {id}"))?;
            let path = write_booking_contract(&config, &booking, false, out.as_deref())?;
            println!("Contract written to {}.", path.display());
        }
        Commands::Stats { out } => {
            let (min, max) = stats::stats_window(today).context("date out of range")?;
            let rows = db::fetch_stats_rows(&pool, retry, min, max).await?;
            let stats = stats::compute_stats(&rows, &config.districts, today)?;
            let report = report::build_report(&stats, today);
            match out {
                Some(path) => {
                    std::fs::write(&path, report)?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{report}"),
            }
        }
    }

    Ok(())
}
