//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Multilingual collapsible navigation tree renderer for documentation TOCs
#[derive(Parser, Debug)]
#[command(name = "navtoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Use this file instead of the global config
    #[arg(long, global = true, env = "NAVTOC_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the navigation tree
    Render {
        /// TOC source (.cs/.html markup, .toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        toc: PathBuf,

        /// Display language for this run only (not persisted)
        #[arg(short, long)]
        lang: Option<String>,

        /// Url of the page being viewed; its ancestors are expanded
        #[arg(short, long)]
        active: Option<String>,

        /// Toggle the section at this url before rendering (repeatable)
        #[arg(short, long)]
        toggle: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = RenderFormat::Tree)]
        format: RenderFormat,
    },

    /// Locate a url and print its ancestor chain
    Find {
        /// TOC source
        #[arg(value_hint = ValueHint::FilePath)]
        toc: PathBuf,

        /// Page url (fragment and query are ignored)
        url: String,
    },

    /// Interactive navigation: one command per line on stdin
    Browse {
        /// TOC source
        #[arg(value_hint = ValueHint::FilePath)]
        toc: PathBuf,

        /// Url of the page being viewed
        #[arg(short, long)]
        active: Option<String>,
    },

    /// Show or change the display language
    Lang {
        #[command(subcommand)]
        command: LangCommands,
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

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Indented terminal tree
    Tree,
    /// Nested <ul id="nav"> list
    Html,
    /// Rendered nodes as JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum LangCommands {
    /// Show the current display language
    Show,

    /// Persist a new display language
    Set {
        /// Language code, e.g. ja or zh-CN
        code: String,
    },

    /// List supported languages
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory whose .navtoc.toml is merged in (default: cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
