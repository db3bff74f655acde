use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kibble_tools::paths::missing_files;
use kibble_tools::{
    resolve_path, Config, EnvKey, MapEnv, PathEntry, PathKind, PathTable, ProcessEnv,
};

#[derive(Parser)]
#[command(name = "kibble")]
#[command(about = "Flow token tooling: account configuration and Cadence paths")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Toml,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration
    Show {
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Print secret values instead of redacting them
        #[arg(long)]
        reveal: bool,
        /// Read variables from this dotenv file ($VAR expanded unless single-quoted)
        #[arg(short, long)]
        env_file: Option<PathBuf>,
    },
    /// List Cadence script and transaction paths
    Paths {
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Verify every path exists under the root directory
        #[arg(short, long)]
        check: bool,
        /// Directory the paths are relative to
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
    /// Check that required variables are set
    Check {
        /// Variable names to require (default: all)
        #[arg(long = "require")]
        required: Vec<String>,
        /// Read variables from this dotenv file ($VAR expanded unless single-quoted)
        #[arg(short, long)]
        env_file: Option<PathBuf>,
    },
    /// Resolve a Cadence file name to its path
    Resolve {
        file_name: String,
        /// script or transaction (default: transaction)
        #[arg(short, long)]
        kind: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(env_file: Option<PathBuf>) -> Result<Config> {
    let config = match env_file {
        Some(path) => Config::load(&MapEnv::from_env_file(path)?),
        None => Config::load(&ProcessEnv::with_dotenv()),
    };
    Ok(config)
}

/// Render `config`, redacting secrets unless `reveal` is set
fn render_config(config: &Config, format: Format, reveal: bool) -> Result<String> {
    let redacted;
    let config = if reveal {
        config
    } else {
        redacted = config.redacted();
        &redacted
    };
    let out = match format {
        Format::Text => config.summary(),
        Format::Json => format!("{}\n", config.to_json()?),
        Format::Toml => config.to_toml()?,
    };
    Ok(out)
}

fn render_paths(table: &PathTable, format: Format) -> Result<String> {
    let out = match format {
        Format::Text => table
            .entries()
            .map(|(kind, name, entry)| format!("{:<12} {:<16} {}\n", kind, name, entry))
            .collect(),
        Format::Json => format!("{}\n", serde_json::to_string_pretty(table)?),
        Format::Toml => toml::to_string(table)?,
    };
    Ok(out)
}

/// Fail if any table entry has no file under `root`
async fn check_paths(table: &PathTable, root: &Path) -> Result<()> {
    let missing = missing_files(table, root).await?;
    for (name, entry) in &missing {
        eprintln!("missing: {} ({})", name, entry.resolve_against(root).display());
    }
    if !missing.is_empty() {
        bail!(
            "{} of {} Cadence files not found under {}",
            missing.len(),
            table.entries().count(),
            root.display()
        );
    }
    Ok(())
}

/// Keys named by `--require`, or every key when none are given
fn required_keys(required: &[String]) -> Result<Vec<EnvKey>> {
    if required.is_empty() {
        return Ok(EnvKey::ALL.to_vec());
    }
    let keys = required
        .iter()
        .map(|name| EnvKey::from_name(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}

fn check_required(config: &Config, required: &[String]) -> Result<usize> {
    let keys = required_keys(required)?;
    config.require(&keys)?;
    Ok(keys.len())
}

fn resolve(file_name: &str, kind: Option<&str>) -> Result<PathEntry> {
    let kind = kind.map(str::parse::<PathKind>).transpose()?;
    Ok(resolve_path(file_name, kind))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Show {
            format,
            reveal,
            env_file,
        } => {
            let config = load_config(env_file)?;
            print!("{}", render_config(&config, format, reveal)?);
        }
        Commands::Paths {
            format,
            check,
            root,
        } => {
            let table = PathTable::new();
            print!("{}", render_paths(&table, format)?);
            if check {
                check_paths(&table, &root).await?;
            }
        }
        Commands::Check { required, env_file } => {
            let config = load_config(env_file)?;
            let count = check_required(&config, &required)?;
            println!("All {} required variables are set", count);
        }
        Commands::Resolve { file_name, kind } => {
            println!("{}", resolve(&file_name, kind.as_deref())?);
        }
    }
    Ok(())
}
