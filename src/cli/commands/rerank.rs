//! Rerank command - Attach a coherence view to annotated documents

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, log_info};
use super::super::utils::{format_error, load_config, ViewArgs};
use crate::coherence::{ContextStrategy, DocumentOrchestrator};
use crate::pipeline::rerank_dir;
use crate::relation::RelationIndex;

/// Attach a coherence view to annotated documents
#[derive(Parser, Debug)]
pub struct RerankArgs {
    /// Directory of TextAnnotation JSON documents
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// Output directory (defaults to the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Relation table (head<TAB>relation<TAB>tail)
    #[arg(short, long, value_name = "TSV")]
    pub relations: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Context strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<ContextStrategy>,

    /// View-name overrides
    #[command(flatten)]
    pub views: ViewArgs,
}

/// Run the rerank command
pub fn run(args: RerankArgs, quiet: bool) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    args.views.apply(&mut config);
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(relations) = args.relations {
        config.relations = Some(relations);
    }

    let relations_path = config
        .require_relations()
        .map_err(|e| format_error("rerank", &e.to_string()))?;
    let index = RelationIndex::load(relations_path).map_err(|e| {
        format_error(
            "load relations",
            &format!("{}: {}", relations_path.display(), e),
        )
    })?;
    log_info(
        &format!(
            "{} {} relations over {} entities",
            color("1;36", "loaded"),
            index.triple_count(),
            index.entity_count()
        ),
        quiet,
    );

    let output = args.output.as_ref().unwrap_or(&args.input);
    let orchestrator = DocumentOrchestrator::new(&index).with_strategy(config.strategy);
    let run = rerank_dir(&args.input, output, &orchestrator, &config).map_err(|e| {
        format_error("read documents", &format!("{}: {}", args.input.display(), e))
    })?;

    for failure in &run.failures {
        log_info(
            &format!("{} {}: {}", color("33", "skipped"), failure.doc_id, failure.error),
            quiet,
        );
    }
    log_info(
        &format!(
            "{} {} documents to {} ({} mentions, {} changed, {} strategy)",
            color("1;32", "wrote"),
            run.written.len(),
            output.display(),
            run.mentions,
            run.changed,
            config.strategy.name()
        ),
        quiet,
    );

    if run.all_failed() {
        return Err(format_error(
            "rerank",
            &format!("all {} documents failed", run.failures.len()),
        ));
    }
    Ok(())
}
