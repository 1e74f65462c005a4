//! Canonical activity CLI
//!
//! Normalizes provider audit-log exports and inspects the taxonomy.
//!
//! # Usage
//!
//! ```bash
//! # Normalize every CSV in ./exports into ./output
//! canon_cli normalize --input-dir exports --output-dir output
//!
//! # Classify a single operation
//! canon_cli classify --operation "Microsoft.Compute/virtualMachines/deallocate/action" \
//!     --resource-type "Virtual Machines"
//!
//! # Show taxonomy sizes and fingerprint
//! canon_cli --format json taxonomy
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use cloud_activity_canon::batch::{run_batch, BatchOptions, BatchSummary, FileOutcome};
use cloud_activity_canon::classify::{classify_record, RecordFields};
use cloud_activity_canon::config::{TaxonomyLocator, TAXONOMY_DIR_ENV};
use cloud_activity_canon::taxonomy::ActivityTaxonomy;

#[derive(Parser)]
#[command(name = "canon_cli")]
#[command(version = "0.1.0")]
#[command(about = "Normalize cloud audit-log exports onto a canonical activity taxonomy")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Directory holding common_objects.yaml and common_actions.yaml
    #[arg(long, global = true, env = TAXONOMY_DIR_ENV)]
    taxonomy_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize every CSV export in a directory
    Normalize {
        /// Directory with provider exports (azure*, aws*, gcp* prefixes)
        #[arg(long, env = "CANON_INPUT_DIR", default_value = ".")]
        input_dir: PathBuf,

        /// Directory for normalized outputs
        #[arg(long, env = "CANON_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Skip writing the combined all-providers file
        #[arg(long)]
        no_combine: bool,
    },

    /// Classify one record
    Classify {
        /// Operation / event name
        #[arg(long)]
        operation: String,

        /// Resource type (defaults to the operation text)
        #[arg(long)]
        resource_type: Option<String>,

        /// Mark the record as a data-plane action
        #[arg(long)]
        data_action: bool,
    },

    /// Show taxonomy index sizes and fingerprint
    Taxonomy,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_taxonomy(cli.taxonomy_dir.clone()).and_then(|taxonomy| match cli.command {
        Commands::Normalize {
            input_dir,
            output_dir,
            no_combine,
        } => cmd_normalize(input_dir, output_dir, !no_combine, &taxonomy, cli.format),
        Commands::Classify {
            operation,
            resource_type,
            data_action,
        } => cmd_classify(&operation, resource_type.as_deref(), data_action, &taxonomy, cli.format),
        Commands::Taxonomy => cmd_taxonomy(&taxonomy, cli.format),
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_taxonomy(dir: Option<PathBuf>) -> Result<ActivityTaxonomy> {
    let locator = match dir {
        Some(dir) => TaxonomyLocator::new(dir),
        None => TaxonomyLocator::from_env(),
    };
    locator
        .load()
        .with_context(|| format!("loading taxonomy from {}", locator.taxonomy_dir().display()))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_normalize(
    input_dir: PathBuf,
    output_dir: PathBuf,
    combine: bool,
    taxonomy: &ActivityTaxonomy,
    format: OutputFormat,
) -> Result<()> {
    let options = BatchOptions {
        combine,
        ..BatchOptions::new(&input_dir, &output_dir)
    };
    let summary = run_batch(&options, taxonomy)
        .with_context(|| format!("normalizing {}", input_dir.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Pretty => print_summary(&summary, &output_dir),
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary, output_dir: &std::path::Path) {
    if summary.files.is_empty() {
        println!("{} no CSV files found", "WARN".yellow().bold());
        return;
    }

    for outcome in &summary.files {
        match outcome {
            FileOutcome::Normalized {
                input,
                output,
                rows,
                ..
            } => println!(
                "{} {} -> {} ({} rows)",
                "[OK]".green().bold(),
                input,
                output_dir.join(output).display(),
                rows
            ),
            FileOutcome::Failed { input, error, .. } => {
                println!("{} {}: {}", "[FAIL]".red().bold(), input, error)
            }
        }
    }

    if let Some(combined) = &summary.combined_output {
        println!(
            "{} combined -> {} ({} rows)",
            "[OK]".green().bold(),
            output_dir.join(combined).display(),
            summary.combined_rows
        );
    }
}

fn cmd_classify(
    operation: &str,
    resource_type: Option<&str>,
    data_action: bool,
    taxonomy: &ActivityTaxonomy,
    format: OutputFormat,
) -> Result<()> {
    let fields = RecordFields {
        operation,
        resource_type: resource_type.unwrap_or(operation),
        data_flag: data_action.then_some("true"),
    };
    let result = classify_record(&fields, taxonomy);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "Common name:".bold(), result.common_name);
            println!("  object:      {}", result.object_label);
            println!("  action:      {} ({})", result.action_label, result.action_key);
            println!("  qualifiers:  {}", result.qualifier_string());
            println!("  key:         {}", result.aggregation_key.cyan());
        }
    }

    Ok(())
}

fn cmd_taxonomy(taxonomy: &ActivityTaxonomy, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "object_aliases": taxonomy.objects.len(),
                "action_variants": taxonomy.actions.len(),
                "fingerprint": taxonomy.fingerprint,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            println!("{} taxonomy loaded", "OK".green().bold());
            println!("  object aliases:  {}", taxonomy.objects.len());
            println!("  action variants: {}", taxonomy.actions.len());
            println!("  fingerprint:     {}", taxonomy.fingerprint);
        }
    }
    Ok(())
}
