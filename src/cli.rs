//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **find**: Interactive incremental finder, prints the chosen id (default)
//! - **list**: Print the notes matching a query
//! - **show**: Print the indexed metadata of one note
//! - **init**: Create the index in the vault
//!
//! # Examples
//!
//! ```bash
//! zk
//! zk list "meeting #work !#draft"
//! zk list --tag work --sort changed --desc --show id,title,changed
//! zk show 202401010800 --json
//! ```

use crate::index::{Field, SortColumn};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zk")]
#[command(about = "Find notes in a plain-text Zettelkasten", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault directory (overrides config)
    #[arg(long = "vault", value_name = "DIR", global = true)]
    pub vault: Option<PathBuf>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Pick a note interactively and print its id (default)
    #[command(visible_alias = "f")]
    Find,

    /// List notes matching a query
    #[command(visible_alias = "ls")]
    List {
        /// Query in finder syntax: words, #tags and [[links]], `!` negates
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Author substring (prefix with ! to exclude)
        #[arg(short = 'a', long = "author", value_name = "AUTHOR", num_args = 1..)]
        authors: Vec<String>,

        /// Tag, with or without the leading # (prefix with ! to exclude)
        #[arg(short = 't', long = "tag", value_name = "TAG", num_args = 1..)]
        tags: Vec<String>,

        /// Link target substring (prefix with ! to exclude)
        #[arg(short = 'l', long = "link", value_name = "LINK", num_args = 1..)]
        links: Vec<String>,

        /// Only notes by the configured author
        #[arg(short = 'm', long = "mine")]
        mine: bool,

        /// Sort column (title, id, author, created, changed)
        #[arg(short = 's', long = "sort", value_name = "COLUMN")]
        sort: Option<SortColumn>,

        /// Sort in descending order
        #[arg(short = 'd', long = "desc")]
        descending: bool,

        /// Fields to print, comma separated
        #[arg(long = "show", value_name = "FIELDS", value_delimiter = ',')]
        show: Vec<Field>,

        /// Print JSON instead of text
        #[arg(long = "json")]
        json: bool,
    },

    /// Show the indexed metadata of a note
    Show {
        #[arg(value_name = "ID")]
        id: String,

        /// Print JSON instead of text
        #[arg(long = "json")]
        json: bool,
    },

    /// Create the index file in the vault
    Init {
        /// Drop and recreate an existing index
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run; `find` when none was given
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Find)
    }
}
