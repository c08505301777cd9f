//! Filehub CLI - command-line front end for a local file catalog.
//!
//! Wraps the filehub-core library: every subcommand maps to one `FileHub`
//! operation. Structured results are printed to stdout as JSON, logs go to
//! stderr.

mod commands;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use filehub_core::{FileHub, FileHubConfig, FileHubError, Requester};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "filehub")]
#[command(about = "Catalog, search and deliver files from a local directory")]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog root directory (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Registry document, absolute or relative to the root
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Group id of the requester
    #[arg(long, global = true, default_value = "")]
    group: String,

    /// User id of the requester
    #[arg(long, global = true, default_value = "")]
    user: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List accessible files, optionally filtered by keywords
    List { query: Vec<String> },
    /// Search and print structured JSON results
    Search { query: Vec<String> },
    /// Prepare one file for delivery and print the plan
    Send { id: String },
    /// Search, then deliver if exactly one file matches
    Find {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Catalog files under the root that are not catalogued yet
    Index {
        /// `all` or `images`
        #[arg(default_value = "all")]
        mode: String,
        /// Only scan the top level of the root
        #[arg(long)]
        no_recursive: bool,
    },
    /// Show root, registry path and entry count
    Info,
    /// Classify a file by extension and magic bytes
    Classify { path: PathBuf },
    /// Update display metadata of an entry
    SetMeta {
        id: String,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Replace allow/deny lists of an entry
    SetPerm {
        id: String,
        #[command(flatten)]
        perms: PermArgs,
    },
    /// Remove an entry from the catalog
    Remove {
        id: String,
        /// Also delete the backing file
        #[arg(long)]
        delete_file: bool,
    },
    /// Copy a local file into the root and catalog it
    Import {
        path: PathBuf,
        /// Preferred id (generated from the file name otherwise)
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Validate a callback service base URL and save it to the --config file
    SetCallback { url: String },
}

#[derive(ClapArgs, Debug, Default)]
pub(crate) struct MetaArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    /// auto, image or file
    #[arg(long)]
    pub send_as: Option<String>,
}

#[derive(ClapArgs, Debug, Default)]
pub(crate) struct PermArgs {
    /// Comma-separated user ids allowed
    #[arg(long, value_delimiter = ',')]
    pub allow_users: Option<Vec<String>>,
    /// Comma-separated group ids allowed
    #[arg(long, value_delimiter = ',')]
    pub allow_groups: Option<Vec<String>>,
    /// Comma-separated user ids denied
    #[arg(long, value_delimiter = ',')]
    pub deny_users: Option<Vec<String>>,
    /// Comma-separated group ids denied
    #[arg(long, value_delimiter = ',')]
    pub deny_groups: Option<Vec<String>>,
    /// Drop the allow list entirely
    #[arg(long)]
    pub clear_allow: bool,
    /// Drop the deny list entirely
    #[arg(long)]
    pub clear_deny: bool,
}

fn load_config(args: &Args) -> Result<FileHubConfig> {
    let mut config = match &args.config {
        Some(path) => FileHubConfig::load(path)?,
        None => FileHubConfig::default(),
    };
    if let Some(root) = &args.root {
        config.root_dir = root.clone();
    }
    if let Some(registry) = &args.registry {
        config.registry_file = registry.clone();
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    debug!("Catalog root: {}", config.root_dir.display());

    let hub = FileHub::new(config)?;
    let requester = Requester::new(args.group, args.user);
    let output = commands::execute(&hub, &requester, args.config.as_deref(), args.command)?;
    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<FileHubError>() {
            Some(hub_err) if hub_err.is_user_facing() => {
                eprintln!("{}", hub_err);
                ExitCode::from(u8::try_from(hub_err.exit_code()).unwrap_or(1))
            }
            Some(hub_err) => {
                eprintln!("Error: {:#}", err);
                ExitCode::from(u8::try_from(hub_err.exit_code()).unwrap_or(1))
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
