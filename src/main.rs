//! zk - incremental note finder for a plain-text Zettelkasten
//!
//! # Usage
//!
//! ```bash
//! # Create the index in the vault
//! zk init
//!
//! # Pick a note interactively (default command); prints its id
//! zk
//! vim "$(zk)".md
//!
//! # Non-interactive queries
//! zk list "graph #math"
//! zk list --author ada --sort changed --desc --json
//! zk show 202401010800
//! ```
//!
//! # Configuration
//!
//! On first run, zk prompts for the vault location and author name. The
//! configuration is stored in the user's config directory
//! (`~/.config/zettel/config.toml` on Linux).

use std::process::ExitCode;
use zettel::{
    Result,
    cli::{Cli, Commands},
    commands::{self, Session, list::ListOptions},
    config::ZkConfig,
    finder::FinderOutcome,
    ui::{OutputWriter, StdoutWriter},
};

/// Exit status of a cancelled finder, as interactive pickers report it
const CANCELLED: u8 = 130;

fn run(cli: &Cli, output: &dyn OutputWriter) -> Result<ExitCode> {
    let config = ZkConfig::load_or_setup()?;
    let session = Session::new(config, cli.vault.as_deref());

    match cli.get_command() {
        Commands::Find => {
            return Ok(match commands::find(&session, output)? {
                FinderOutcome::Committed(_) => ExitCode::SUCCESS,
                FinderOutcome::Cancelled => ExitCode::from(CANCELLED),
            });
        }
        Commands::List {
            query,
            authors,
            tags,
            links,
            mine,
            sort,
            descending,
            show,
            json,
        } => {
            let options = ListOptions {
                query,
                authors,
                tags,
                links,
                mine,
                sort,
                descending,
                show,
                json,
            };
            commands::list(&session, &options, output)?;
        }
        Commands::Show { id, json } => commands::show(&session, &id, json, output)?,
        Commands::Init { force } => commands::init(&session, force, output)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let output = if cli.quiet {
        StdoutWriter::quiet()
    } else {
        StdoutWriter::new()
    };

    match run(&cli, &output) {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
