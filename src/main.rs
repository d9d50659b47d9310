use anyhow::{anyhow, Result};
use cardbox::add::add;
use cardbox::config::{Config, Overrides, CONFIG_FILE};
use cardbox::export::export;
use cardbox::init::init;
use cardbox::remove::remove;
use cardbox::review::review;
use cardbox::stats::{stats, verify};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::ValueEnum, Clone, Debug)]
enum Command {
    Init,
    Add,
    Review,
    Stats,
    Remove,
    Export,
    Verify,
}

/// Spaced-repetition flashcards, one directory per due date.
#[derive(Parser)]
struct Cli {
    /// What to do
    command: Command,
    /// Name of the category (card box)
    category: String,
    /// Directory holding the categories
    #[arg(long)]
    root: Option<PathBuf>,
    /// Interval multiplier between levels
    #[arg(long)]
    multiplier: Option<u32>,
    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,
    /// Remove without asking
    #[arg(short, long)]
    yes: bool,
    /// Target CSV file for `export`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardbox=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let config = Config::load(
        &args.config,
        Overrides {
            root: args.root,
            multiplier: args.multiplier,
        },
    )?;
    let name = args.category.as_str();

    match args.command {
        Command::Init => init(&config, name),
        Command::Add => add(&config, name),
        Command::Review => review(&config, name),
        Command::Stats => stats(&config, name),
        Command::Remove => remove(&config, name, args.yes),
        Command::Export => match &args.output {
            Some(path) => export(&config, name, path),
            None => Err(anyhow!("`export` needs --output <FILE>. Aborting.")),
        },
        Command::Verify => verify(&config, name),
    }
}
