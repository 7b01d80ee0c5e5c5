pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use dwrf_core::ScanConf;
use dwrf_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let mut conf = ScanConf::default();
    for pair in &cli.conf {
        conf.apply(pair)?;
    }
    match cli.command {
        Commands::Gen {
            out,
            rows,
            stripe_rows,
            compression,
            deterministic,
        } => handlers::handle_gen(out, rows, stripe_rows, compression, deterministic),
        Commands::Meta { file } => handlers::handle_meta(file),
        Commands::Scan {
            file,
            start,
            len,
            columns,
            limit,
        } => handlers::handle_scan(conf, file, start, len, columns, limit),
        Commands::Splits { inputs, num_splits } => {
            handlers::handle_splits(conf, inputs, num_splits)
        }
        Commands::Count { inputs, num_splits } => handlers::handle_count(conf, inputs, num_splits),
        Commands::Validate { inputs } => handlers::handle_validate(conf, inputs),
        Commands::Sniff { file } => handlers::handle_sniff(file),
    }
}
