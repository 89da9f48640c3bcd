use anyhow::Result;
use clap::{Parser, Subcommand};
use gemaudit::{config::Config, AdvisoryScanner, Analyzer, Database};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "gemaudit")]
#[command(
    author,
    version,
    about = "Audit Gemfile.lock for vulnerable gems and insecure sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter for diagnostics on stderr (e.g. "debug", "gemaudit=trace")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project's Gemfile.lock and print issues to stdout
    Analyze {
        /// Project directory containing Gemfile.lock
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Path to a ruby-advisory-db checkout
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Advisory id to ignore (repeatable)
        #[arg(short, long = "ignore", value_name = "ID")]
        ignore: Vec<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run(command: Commands) -> Result<u8> {
    match command {
        Commands::Analyze {
            directory,
            database,
            ignore,
        } => {
            let config = Config::load()?;
            run_analyze(&config, directory, database, ignore)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_analyze(
    config: &Config,
    directory: PathBuf,
    database: Option<PathBuf>,
    ignore: Vec<String>,
) -> Result<u8> {
    let database_path = database.unwrap_or_else(|| config.database_path());
    let database = Database::open(&database_path)?;
    tracing::info!(
        path = %database_path.display(),
        advisories = database.size(),
        "loaded advisory database"
    );

    let scanner = AdvisoryScanner::new(database)
        .with_ignore(config.ignore.advisories.iter().cloned())
        .with_ignore(ignore);

    let stdout = io::stdout();
    Analyzer::new(directory, scanner)
        .with_stdout(stdout.lock())
        .with_stderr(io::stderr())
        .run()?;

    Ok(exit_codes::SUCCESS)
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'gemaudit config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
    }

    Ok(())
}
