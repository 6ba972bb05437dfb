//! Addressbook CLI - list, view, add, edit and remove contacts

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use addressbook::AddressBook;
use addressbook::config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::FieldArgs;

#[derive(Parser)]
#[command(name = "addressbook")]
#[command(version)]
#[command(about = "Contacts address book backed by a local SQLite file")]
#[command(long_about = r#"
Addressbook keeps contacts (name, phone, email and postal address) in a
single SQLite file.

Example usage:
  addressbook init
  addressbook add --name "Ada Lovelace" --phone 555-0100
  addressbook list
  addressbook show 1
  addressbook edit 1 --city London
  addressbook remove 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of styled text
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List contacts
    List {
        /// Column to sort by (name, phone, email, street, city, state, zip, id)
        #[arg(short, long)]
        sort: Option<String>,

        /// Keep storage order instead of sorting
        #[arg(long)]
        unsorted: bool,
    },

    /// Show every field of one contact
    Show {
        /// Contact id
        id: i64,
    },

    /// Add a contact
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Edit a contact; fields not given keep their current value
    Edit {
        /// Contact id
        id: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Remove a contact
    Remove {
        /// Contact id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show statistics about the address book
    Stats,
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Print a JSON success envelope for `command`
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let cwd = std::env::current_dir()?;
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    let database_flag = cli.database.clone();
    let open = || -> anyhow::Result<(AddressBook, PathBuf)> {
        let loaded = config::load_config(&config_path)?;
        let database = config::resolve_database_path(database_flag.as_deref(), loaded.as_ref(), &config_path, &cwd);
        Ok((open_book(&database)?, database))
    };

    match cli.command {
        Commands::Init { force } => {
            commands::run_init(output_mode, &config_path, database_flag.as_deref(), &cwd, force)
        }
        Commands::List { sort, unsorted } => {
            let sort_key = if unsorted {
                None
            } else {
                Some(sort.as_deref().unwrap_or("name").parse()?)
            };
            let (book, _) = open()?;
            commands::run_list(&book, output_mode, sort_key)
        }
        Commands::Show { id } => commands::run_show(&open()?.0, output_mode, id),
        Commands::Add { fields } => commands::run_add(&open()?.0, output_mode, fields),
        Commands::Edit { id, fields } => commands::run_edit(&open()?.0, output_mode, id, fields),
        Commands::Remove { id, yes } => commands::run_remove(&open()?.0, output_mode, id, yes),
        Commands::Stats => {
            let (book, database) = open()?;
            commands::run_stats(&book, output_mode, &database)
        }
    }
}

fn open_book(database: &Path) -> anyhow::Result<AddressBook> {
    tracing::debug!("Using database {}", database.display());
    Ok(AddressBook::open(database)?)
}
