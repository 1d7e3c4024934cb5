pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::normalizer::QueryKind;

#[derive(Parser)]
#[command(name = "groupfeed")]
#[command(about = "Turn captured group-feed GraphQL responses into a deduplicated CSV", long_about = None)]
pub struct Cli {
    /// Number of capture files read in parallel
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Config file to use instead of ~/.config/groupfeed/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse capture files and write posts and comments to CSV
    Export {
        /// HAR exports or capture logs
        #[arg(required = true)]
        captures: Vec<PathBuf>,

        /// CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON array of page-derived post stubs to add
        #[arg(long)]
        stubs: Option<PathBuf>,

        /// Stop after this many posts (0 = no limit)
        #[arg(long)]
        max_posts: Option<usize>,

        /// SQLite file that keeps records between runs
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Print the records found in capture files without writing CSV
    Inspect {
        #[arg(required = true)]
        captures: Vec<PathBuf>,

        /// Print flattened rows as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Normalize one raw response body and print the result as JSON
    Parse {
        /// Query kind that produced the body
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// File holding the raw response body
        body: PathBuf,

        /// Post id for comments whose payload carries none
        #[arg(long)]
        post_id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Feed,
    Comments,
}

impl From<KindArg> for QueryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Feed => QueryKind::Feed,
            KindArg::Comments => QueryKind::FocusedComments,
        }
    }
}
