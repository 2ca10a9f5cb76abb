//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::Translation;

/// Hierarchical dictionary items: unique keys, per-language translations
#[derive(Parser, Debug)]
#[command(name = "dictree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Additional config file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Dictionary store file (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all items as a tree
    List {
        /// Indented list instead of tree drawing
        #[arg(long)]
        flat: bool,
    },

    /// Show one item with its translations
    Get {
        /// Item id
        id: i64,
    },

    /// Create an item
    Create {
        /// Unique key
        key: String,
        /// Parent item id (0 = root)
        #[arg(short, long, default_value_t = 0)]
        parent: i64,
        /// Language of the initial translation
        #[arg(long, requires = "text")]
        lang: Option<String>,
        /// Initial translation text
        #[arg(long, requires = "lang")]
        text: Option<String>,
    },

    /// Change the key of an item
    Rename {
        /// Item id
        id: i64,
        /// New unique key
        key: String,
    },

    /// Set translations: LANG=TEXT ...
    Translate {
        /// Item id
        id: i64,
        /// Translations as LANG=TEXT
        #[arg(required = true, value_parser = parse_translation)]
        translations: Vec<Translation>,
    },

    /// Delete an item and all its descendants
    Delete {
        /// Item id
        id: i64,
        /// Acting user id, recorded by the store
        #[arg(long, default_value_t = 0)]
        actor: i64,
    },

    /// Manage languages
    Language {
        #[command(subcommand)]
        command: LanguageCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommands {
    /// List languages
    List,

    /// Add a language
    Add {
        /// ISO code, e.g. da-DK
        iso: String,
        /// Display name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create global config template
    Init {
        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse `LANG=TEXT`; the text may itself contain `=`.
pub fn parse_translation(s: &str) -> Result<Translation, String> {
    let (lang, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LANG=TEXT, got '{s}'"))?;
    if lang.is_empty() {
        return Err(format!("missing language in '{s}'"));
    }
    Ok(Translation::new(lang, text))
}
