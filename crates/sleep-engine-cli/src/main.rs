use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sleep_engine::{
    classify_with, duration_minutes, parse_date, resolve, DisplayLabels, SessionDraft,
    SleepCategory, Thresholds, TimeOfDay, ValidationResult,
};

#[derive(Parser)]
#[command(
    name = "sleeplog",
    version,
    about = "Resolve, validate and label logged sleep sessions"
)]
struct Cli {
    /// TOML file overriding the duration thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a session to absolute start/end instants
    Resolve {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Classify a session as ok, warn or error (exits 2 on error)
    Check {
        #[command(flatten)]
        session: SessionArgs,

        /// Treat a missing end time as an error
        #[arg(long)]
        require_end: bool,
    },
    /// Derive the duration and recency labels for a session
    Labels {
        #[command(flatten)]
        session: SessionArgs,

        /// Clock reading as YYYY-MM-DDTHH:MM[:SS] (defaults to the local clock)
        #[arg(long)]
        now: Option<String>,

        /// Label a session without an end as "in progress"
        #[arg(long)]
        ongoing: bool,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Session category: nap or night
    #[arg(long)]
    category: String,

    /// Selected calendar date (YYYY-MM-DD)
    #[arg(long)]
    date: String,

    /// Start time (HH:MM, 24-hour)
    #[arg(long)]
    start: String,

    /// End time (HH:MM, 24-hour); omit for an ongoing session
    #[arg(long)]
    end: Option<String>,
}

impl SessionArgs {
    fn draft(&self) -> Result<SessionDraft> {
        let category: SleepCategory = self.category.parse()?;
        let selected_date = parse_date(&self.date)?;
        let start: TimeOfDay = self.start.parse().context("parsing --start")?;
        let end = self
            .end
            .as_deref()
            .map(str::parse::<TimeOfDay>)
            .transpose()
            .context("parsing --end")?;
        Ok(SessionDraft::new(category, selected_date, start, end))
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    duration_minutes: Option<u32>,
    #[serde(flatten)]
    validation: &'a ValidationResult,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let thresholds = load_thresholds(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve { session } => {
            let resolved = resolve(&session.draft()?);
            print_json(&resolved, cli.pretty)?;
            Ok(0)
        }
        Commands::Check {
            session,
            require_end,
        } => {
            let draft = session.draft()?;
            let validation = classify_with(
                &thresholds,
                draft.category,
                draft.start,
                draft.end,
                require_end,
            );
            let output = CheckOutput {
                duration_minutes: draft
                    .end
                    .map(|end| duration_minutes(draft.start, end)),
                validation: &validation,
            };
            print_json(&output, cli.pretty)?;
            Ok(if validation.is_error() { 2 } else { 0 })
        }
        Commands::Labels {
            session,
            now,
            ongoing,
        } => {
            let draft = session.draft()?;
            let now = match now {
                Some(s) => parse_now(&s)?,
                None => Local::now().naive_local(),
            };
            print_json(&DisplayLabels::for_session(&draft, now, ongoing), cli.pretty)?;
            Ok(0)
        }
    }
}

fn load_thresholds(path: Option<&Path>) -> Result<Thresholds> {
    let Some(path) = path else {
        return Ok(Thresholds::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let thresholds: Thresholds =
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("loaded thresholds from {}: {thresholds:?}", path.display());
    Ok(thresholds)
}

fn parse_now(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("parsing --now '{s}'"))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
