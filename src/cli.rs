use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ytscript::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Timeline,
    Json,
    Srt,
}

#[derive(Parser)]
#[command(
    name = "ytscript",
    about = "YouTube caption track as plain text with a timeline",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: ~/.config/ytscript/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the web form and POST /api/transcript
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Language of error messages
        #[arg(short, long, value_enum)]
        locale: Option<Locale>,
    },

    /// Fetch one video's captions and print them
    Fetch {
        /// YouTube video URL or video ID
        url: String,

        /// Output format: text, timeline, json, srt
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the plain text as transcript-<video id>.txt
        #[arg(long)]
        save: bool,

        /// Language of error messages
        #[arg(short, long, value_enum)]
        locale: Option<Locale>,
    },
}
