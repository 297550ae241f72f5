//! Evaluate command - Bracket-averaged accuracy over annotated documents

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use super::super::output::{color, log_info, pct_colored, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{format_error, load_config, ViewArgs};
use crate::coherence::DocumentFailure;
use crate::eval::{evaluate_dir, BracketMap, BracketReport, EvalViews};

/// Bracket-averaged accuracy over annotated documents
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Directory of documents carrying linker, gold and coherence views
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Bracket map (doc_id<TAB>bracket)
    #[arg(short, long, value_name = "TSV")]
    pub brackets: PathBuf,

    /// TOML config file; flags override its values
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// View-name overrides
    #[command(flatten)]
    pub views: ViewArgs,

    /// View holding gold labels [default: GOLD_WIKI_LABELS]
    #[arg(long, value_name = "VIEW")]
    pub gold_view: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a BracketReport,
    skipped: &'a [DocumentFailure],
}

/// Run the evaluate command
pub fn run(args: EvaluateArgs, quiet: bool) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    args.views.apply(&mut config);
    if let Some(gold) = &args.gold_view {
        config.gold_view.clone_from(gold);
    }

    let brackets = BracketMap::load(&args.brackets).map_err(|e| {
        format_error(
            "load brackets",
            &format!("{}: {}", args.brackets.display(), e),
        )
    })?;
    let run = evaluate_dir(&args.dir, &brackets, &EvalViews::from(&config))
        .map_err(|e| format_error("read documents", &format!("{}: {}", args.dir.display(), e)))?;

    for failure in &run.skipped {
        log_info(
            &format!("{} {}: {}", color("33", "skipped"), failure.doc_id, failure.error),
            quiet,
        );
    }
    if run.report.documents == 0 && !run.skipped.is_empty() {
        return Err(format_error(
            "evaluate",
            &format!("none of {} documents could be evaluated", run.skipped.len()),
        ));
    }

    let content = match args.format {
        OutputFormat::Json => {
            let json = JsonReport {
                report: &run.report,
                skipped: &run.skipped,
            };
            let mut s = serde_json::to_string_pretty(&json)
                .map_err(|e| format_error("serialize report", &e.to_string()))?;
            s.push('\n');
            s
        }
        OutputFormat::Human => {
            let mut s = run.report.summary();
            s.push_str(&format!(
                "\n{} {}  {} {}\n",
                color("1", "accuracy:"),
                pct_colored(run.report.accuracy),
                color("1", "coherence accuracy:"),
                pct_colored(run.report.coherence_accuracy)
            ));
            s
        }
    };
    write_output(&content, args.output.as_deref())
}
