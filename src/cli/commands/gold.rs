//! Gold command - Attach WNED gold mentions to tokenized documents

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, log_info};
use super::super::utils::format_error;
use crate::pipeline::gold_dir;
use crate::wned;

/// Attach NER and gold views from a WNED dataset file
#[derive(Parser, Debug)]
pub struct GoldArgs {
    /// WNED dataset XML (e.g. wikipedia.xml)
    #[arg(value_name = "DATASET_XML")]
    pub dataset: PathBuf,

    /// Directory of tokenized TextAnnotation JSON, one file per docName
    #[arg(value_name = "TA_DIR")]
    pub input: PathBuf,

    /// Output directory (defaults to the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Run the gold command
pub fn run(args: GoldArgs, quiet: bool) -> Result<(), String> {
    let dataset = wned::load(&args.dataset).map_err(|e| {
        format_error("load dataset", &format!("{}: {}", args.dataset.display(), e))
    })?;
    log_info(
        &format!(
            "{} {} dataset documents from {}",
            color("1;36", "loaded"),
            dataset.len(),
            args.dataset.display()
        ),
        quiet,
    );

    let output = args.output.as_ref().unwrap_or(&args.input);
    let run = gold_dir(&dataset, &args.input, output);

    for failure in &run.failures {
        log_info(
            &format!("{} {}: {}", color("33", "skipped"), failure.doc_id, failure.error),
            quiet,
        );
    }
    log_info(
        &format!(
            "{} {} documents to {} ({} gold mentions)",
            color("1;32", "wrote"),
            run.written.len(),
            output.display(),
            run.annotations
        ),
        quiet,
    );

    if run.all_failed() {
        return Err(format_error(
            "gold",
            &format!("all {} documents failed", run.failures.len()),
        ));
    }
    Ok(())
}
