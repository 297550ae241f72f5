//! coherent - Relational coherence re-ranking CLI
//!
//! Re-ranks entity linker candidates by how strongly they relate to the rest
//! of the document, and evaluates the result against gold labels.
//!
//! # Usage
//!
//! ```bash
//! # Add a COHERENCE view to every document
//! coherent rerank data/linked --relations fb15k.tsv --output data/coherent
//!
//! # Narrow context, joint model output
//! coherent rerank data/linked -r fb15k.tsv -s narrow \
//!     --el-view NEUREL --candidate-map jointScoreMap
//!
//! # Bracket-averaged accuracy
//! coherent evaluate data/coherent --brackets name2bracket.tsv --format json
//!
//! # Look up an entity's neighbors
//! coherent inspect --relations fb15k.tsv Paris
//!
//! # Gold views for tokenized WNED documents
//! coherent gold wned-datasets/wikipedia/wikipedia.xml data/tokenized --output data/gold
//! ```

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

/// Log level from `-v`/`-q`; `RUST_LOG` still wins when set.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    use clap_complete::generate;
    use coherent::cli::commands::*;
    use coherent::cli::output::color;
    use coherent::cli::parser::{Cli, Commands};

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result: Result<(), String> = match cli.command {
        Commands::Rerank(args) => rerank::run(args, cli.quiet),
        Commands::Evaluate(args) => evaluate::run(args, cli.quiet),
        Commands::Inspect(args) => inspect::run(args),
        Commands::Gold(args) => gold::run(args, cli.quiet),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "coherent", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
