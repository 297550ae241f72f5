//! Inspect command - Relation table statistics and neighborhoods

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use super::super::output::{color, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::format_error;
use crate::relation::RelationIndex;

/// Relation table statistics and neighborhoods
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Relation table (head<TAB>relation<TAB>tail)
    #[arg(short, long, value_name = "TSV")]
    pub relations: PathBuf,

    /// Entities whose neighbors to list
    #[arg(value_name = "ENTITY")]
    pub entities: Vec<String>,

    /// Maximum neighbors listed per entity
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Neighborhood {
    entity: String,
    degree: usize,
    neighbors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Inspection {
    relations: usize,
    entities: usize,
    neighborhoods: Vec<Neighborhood>,
}

fn inspect(index: &RelationIndex, entities: &[String], limit: usize) -> Inspection {
    let neighborhoods = entities
        .iter()
        .map(|entity| {
            let mut neighbors: Vec<String> = index.neighbors(entity).map(str::to_string).collect();
            neighbors.sort();
            neighbors.truncate(limit);
            Neighborhood {
                entity: entity.clone(),
                degree: index.degree(entity),
                neighbors,
            }
        })
        .collect();
    Inspection {
        relations: index.triple_count(),
        entities: index.entity_count(),
        neighborhoods,
    }
}

/// Run the inspect command
pub fn run(args: InspectArgs) -> Result<(), String> {
    let index = RelationIndex::load(&args.relations).map_err(|e| {
        format_error(
            "load relations",
            &format!("{}: {}", args.relations.display(), e),
        )
    })?;
    let report = inspect(&index, &args.entities, args.limit);

    let content = match args.format {
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(&report)
                .map_err(|e| format_error("serialize report", &e.to_string()))?;
            s.push('\n');
            s
        }
        OutputFormat::Human => {
            let mut s = format!(
                "{} {} relations, {} entities\n",
                color("1;36", "relations:"),
                report.relations,
                report.entities
            );
            for n in &report.neighborhoods {
                if n.degree == 0 {
                    s.push_str(&format!(
                        "\n{} {}\n",
                        color("1", &n.entity),
                        color("90", "(unknown)")
                    ));
                    continue;
                }
                s.push_str(&format!("\n{} degree {}\n", color("1", &n.entity), n.degree));
                for neighbor in &n.neighbors {
                    s.push_str(&format!("  {}\n", neighbor));
                }
                if n.degree > n.neighbors.len() {
                    s.push_str(&format!("  ... {} more\n", n.degree - n.neighbors.len()));
                }
            }
            s
        }
    };
    write_output(&content, None)
}
