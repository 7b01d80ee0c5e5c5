use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "dwrfdev CLI (alpha)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Scan setting as key=value (e.g. mapred.min.split.size=65536); repeatable
    #[arg(long = "conf", global = true)]
    pub conf: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sample file with nested columns
    Gen {
        out: PathBuf,

        #[arg(long, default_value_t = 10_000)]
        rows: u64,

        #[arg(long, default_value_t = 1_000)]
        stripe_rows: usize,

        /// zstd or none
        #[arg(long, default_value = "zstd")]
        compression: String,

        #[arg(long)]
        deterministic: bool,
    },

    /// Print schema and stripe directory
    Meta { file: PathBuf },

    /// Print the rows of one split
    Scan {
        file: PathBuf,

        #[arg(long, default_value_t = 0)]
        start: u64,

        /// Split length in bytes; defaults to the rest of the file
        #[arg(long)]
        len: Option<u64>,

        /// Comma separated top-level column ordinals
        #[arg(long)]
        columns: Option<String>,

        #[arg(long)]
        limit: Option<u64>,
    },

    /// Plan splits over files and directories
    Splits {
        inputs: Vec<PathBuf>,

        #[arg(long, default_value_t = 1)]
        num_splits: usize,
    },

    /// Count rows, reading splits in parallel
    Count {
        inputs: Vec<PathBuf>,

        #[arg(long, default_value_t = 8)]
        num_splits: usize,
    },

    /// Check that every input file opens
    Validate { inputs: Vec<PathBuf> },

    /// Show the leading bytes of a file and whether they carry the ORC magic
    Sniff { file: PathBuf },
}
