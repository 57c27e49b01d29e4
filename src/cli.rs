// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described with structs,
// enums and #[...] attributes, and clap generates the parser.
//
// Global flags (--config, --app-url) apply to every subcommand; the rest
// belong to the subcommand they are declared on.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "indexnow",
    version,
    about = "Notify IndexNow search engines about new or changed URLs",
    long_about = "indexnow submits URLs to an IndexNow search engine, manages the site \
                  verification key and backs off for a while when the engine reports abuse."
)]
pub struct Cli {
    /// JSON config file; environment variables override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Application base URL, used for relative URLs and the key URL
    #[arg(long, global = true)]
    pub app_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit one or more URLs
    ///
    /// Example: indexnow submit https://example.com/new-post /about
    Submit {
        /// URLs to submit; relative ones are joined to the app URL
        #[arg(required = true)]
        urls: Vec<String>,

        /// Search engine identifier (indexnow, microsoft_bing, naver, seznam, yandex)
        #[arg(long)]
        engine: Option<String>,

        /// URL where the key file is hosted; its contents become the key
        #[arg(long)]
        key_location: Option<String>,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate and store a new key, replacing the current one
    GenerateKey,

    /// Print the current key, generating one if none exists
    ShowKey,

    /// Check the key, the search engine, the flags and the block state
    Status,

    /// Lift an active spam block
    ResetBlock {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Print the activity log
    Logs,

    /// Delete the activity log
    ClearLogs,

    /// Write `<key>.txt` into a public directory for verification
    ///
    /// Example: indexnow write-key-file ./public
    WriteKeyFile {
        /// Directory served at the site root
        dir: PathBuf,
    },
}
