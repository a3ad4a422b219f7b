use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;

use concept_linker::annotation::RelevanceAnnotator;
use concept_linker::config::{default_config_path, load_config, save_config, LinkerConfig};
use concept_linker::errors::LinkerError;
use concept_linker::linking::http_matcher;
use concept_linker::rdf::SerializationFormat;
use concept_linker::sparql::KgClient;
use concept_linker::types::ConceptId;
use tracing_subscriber::EnvFilter;

/// Resolve clinical terms to ontology concepts and record relevance provenance.
#[derive(Parser)]
#[command(
    name = "concept-linker",
    about = "Resolve clinical terms to ontology concepts"
)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more terms to concept ids
    Resolve {
        /// Terms to resolve
        #[arg(required = true)]
        terms: Vec<String>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// List the broader concepts of a concept
    Broader {
        /// Concept id
        id: String,
    },
    /// List the narrower concepts of a concept
    Narrower {
        /// Concept id
        id: String,
    },
    /// List concepts related through the domain ontology
    Related {
        /// Concept id
        id: String,
    },
    /// Record concepts as relevant to a clinical case
    Annotate {
        /// Clinical case IRI (or path relative to the data namespace)
        #[arg(long)]
        case: String,
        /// Entity mention the concepts were found for
        #[arg(long, default_value = "")]
        mention: String,
        /// Relevance score
        #[arg(short, long)]
        relevance: f64,
        /// Judging method, e.g. RAG
        #[arg(short, long, default_value = "")]
        method: String,
        /// Concept ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Build the triples without submitting them
        #[arg(long)]
        dry_run: bool,
        /// Serialization used by --dry-run (nquads, nt, turtle)
        #[arg(long, default_value = "nquads")]
        format: SerializationFormat,
        /// Write the --dry-run output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete every triple in the relevance graph
    ClearRelevance {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("concept_linker=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> concept_linker::errors::Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::InitConfig { force } => {
            if config_path.exists() && !force {
                return Err(LinkerError::Config {
                    message: format!(
                        "'{}' already exists; pass --force to overwrite",
                        config_path.display()
                    ),
                });
            }
            save_config(&config_path, &LinkerConfig::default())?;
            println!("Wrote default configuration to {}", config_path.display());
        }
        Commands::Resolve { terms, json } => {
            let config = open_config(&config_path)?;
            let client = KgClient::from_config(&config);
            let matcher = http_matcher(&config, &client);
            let summary = matcher.resolve_all(&terms);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for r in &summary.resolved {
                    let ids: Vec<&str> = r.concepts.iter().map(ConceptId::as_str).collect();
                    println!("{} -> {} ({})", r.term, ids.join(", "), r.stage);
                }
                for f in &summary.failed {
                    println!("{} -> unresolved: {}", f.term, f.error);
                }
            }
        }
        Commands::Broader { id } => {
            let client = KgClient::from_config(&open_config(&config_path)?);
            print_concepts(&client.broader_concepts(&ConceptId::new(id)?)?);
        }
        Commands::Narrower { id } => {
            let client = KgClient::from_config(&open_config(&config_path)?);
            print_concepts(&client.narrower_concepts(&ConceptId::new(id)?)?);
        }
        Commands::Related { id } => {
            let client = KgClient::from_config(&open_config(&config_path)?);
            print_concepts(&client.related_concepts(&ConceptId::new(id)?)?);
        }
        Commands::Annotate {
            case,
            mention,
            relevance,
            method,
            ids,
            dry_run,
            format,
            output,
        } => {
            let config = open_config(&config_path)?;
            let client = KgClient::from_config(&config);
            let annotator = RelevanceAnnotator::from_config(&client, &config)?;
            if dry_run {
                let (store, _) = annotator.build(&case, &ids, relevance, &method)?;
                match output {
                    Some(path) => {
                        store.serialize_to(format, &path)?;
                        println!("Wrote {} triples to {}", store.len(), path.display());
                    }
                    None => print!("{}", store.serialize(format)?),
                }
                return Ok(());
            }
            let summary = annotator.write_relevance(&case, &mention, &ids, relevance, &method)?;
            println!(
                "Wrote {} assignments ({} triples)",
                summary.assignments.len(),
                summary.triple_count
            );
            for iri in &summary.assignments {
                println!("  {}", iri);
            }
        }
        Commands::ClearRelevance { yes } => {
            let config = open_config(&config_path)?;
            let client = KgClient::from_config(&config);
            let annotator = RelevanceAnnotator::from_config(&client, &config)?;
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete every triple in {}?",
                        annotator.relevance_graph()
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| LinkerError::Config {
                        message: format!("confirmation prompt failed: {}", e),
                    })?;
            if confirmed {
                annotator.clear_relevance_graph()?;
                println!("Cleared {}", annotator.relevance_graph());
            } else {
                println!("Aborted");
            }
        }
    }
    Ok(())
}

/// Loads the configuration and applies environment overrides.
fn open_config(path: &Path) -> concept_linker::errors::Result<LinkerConfig> {
    let mut config = load_config(path)?;
    config.apply_env_overrides();
    Ok(config)
}

fn print_concepts(ids: &BTreeSet<ConceptId>) {
    if ids.is_empty() {
        println!("No concepts found");
    }
    for id in ids {
        println!("{}", id);
    }
}
