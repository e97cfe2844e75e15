//! sdsim - validate and simulate stock-flow models from the command line.
//!
//! ## Commands
//!
//! - `domains`: List the supported domains
//! - `schema`: Print one domain's closed world
//! - `validate`: Check a model document against a domain
//! - `simulate`: Validate, then integrate over the model's time grid
//! - `compare`: Run several parameter scenarios side by side
//! - `sensitivity`: Sweep one parameter over a range
//! - `trace`: Show a variable's dependency tree at one grid point
//! - `examples`: List or print the built-in example models

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stockflow_core::config::{EngineConfig, DEFAULT_MAX_GRID_POINTS, MAX_GRID_POINTS_ENV};
use stockflow_core::display::{format_series_table, format_trace, format_violations};
use stockflow_core::model::ModelDocument;
use stockflow_core::scenario::{self, Scenario};
use stockflow_core::schema;
use stockflow_core::telemetry::init_tracing;
use stockflow_core::{catalog, validate, Engine, ValidatedModel};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sdsim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Closed-world System Dynamics validation and simulation", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit command output and log lines as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Refuse runs whose time grid exceeds this many points
    #[arg(long, global = true, env = MAX_GRID_POINTS_ENV, default_value_t = DEFAULT_MAX_GRID_POINTS)]
    max_grid_points: usize,

    #[command(subcommand)]
    command: Commands,
}

/// A model document and the domain to check it against.
#[derive(Args)]
struct ModelArgs {
    /// Domain name (see `sdsim domains`)
    #[arg(short, long)]
    domain: String,

    /// Path to the model document (JSON)
    file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported domains
    Domains,

    /// Print a domain's allowed identifiers and structural constraints
    Schema {
        /// Domain name
        domain: String,
    },

    /// Validate a model document
    Validate {
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Validate and simulate a model document
    Simulate {
        #[command(flatten)]
        model: ModelArgs,

        /// Parameter override, repeatable
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,

        /// Write the full result as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every n-th grid point in the table
        #[arg(long, default_value = "1")]
        every: usize,
    },

    /// Run named parameter scenarios side by side
    Compare {
        #[command(flatten)]
        model: ModelArgs,

        /// JSON array of `{"name": .., "parameters": {..}}`
        #[arg(short, long)]
        scenarios: PathBuf,
    },

    /// Sweep one parameter over an inclusive range
    Sensitivity {
        #[command(flatten)]
        model: ModelArgs,

        /// Parameter id to sweep
        #[arg(short, long)]
        parameter: String,

        #[arg(long)]
        min: f64,

        #[arg(long)]
        max: f64,

        #[arg(long, default_value = "5")]
        steps: usize,
    },

    /// Show a variable's dependency tree with values at one grid point
    Trace {
        #[command(flatten)]
        model: ModelArgs,

        /// Variable id to trace
        #[arg(long)]
        variable: String,

        /// Grid point index
        #[arg(long, default_value = "0")]
        index: usize,

        /// Parameter override, repeatable
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,
    },

    /// List the built-in example models, or print one
    Examples {
        /// Example id
        id: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(cli.json, level);

    let config = EngineConfig::default().with_max_grid_points(cli.max_grid_points);
    let json = cli.json;

    match cli.command {
        Commands::Domains => cmd_domains(json),
        Commands::Schema { domain } => cmd_schema(&domain),
        Commands::Validate { model } => cmd_validate(&model, json),
        Commands::Simulate { model, overrides, output, every } => {
            cmd_simulate(&model, overrides, output.as_deref(), every, &config, json)
        }
        Commands::Compare { model, scenarios } => cmd_compare(&model, &scenarios, &config, json),
        Commands::Sensitivity { model, parameter, min, max, steps } => {
            cmd_sensitivity(&model, &parameter, min, max, steps, &config, json)
        }
        Commands::Trace { model, variable, index, overrides } => {
            cmd_trace(&model, &variable, index, overrides, &config)
        }
        Commands::Examples { id } => cmd_examples(id.as_deref(), json),
    }
}

fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (id, value) = raw.split_once('=').ok_or_else(|| format!("expected ID=VALUE, got '{}'", raw))?;
    let value: f64 = value.trim().parse().map_err(|e| format!("bad value for '{}': {}", id, e))?;
    Ok((id.trim().to_string(), value))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Loads and validates, printing the violation report and failing on
/// rejection.
fn load_validated(args: &ModelArgs, json: bool) -> Result<ValidatedModel> {
    let doc = ModelDocument::load(&args.file)
        .with_context(|| format!("Failed to load model document {:?}", args.file))?;
    match validate(&args.domain, &doc) {
        Ok(model) => Ok(model),
        Err(violations) => {
            if json {
                print_json(&violations)?;
            } else {
                print!("{}", format_violations(&violations));
            }
            bail!("model rejected with {} violation(s)", violations.len())
        }
    }
}

fn cmd_domains(json: bool) -> Result<()> {
    if json {
        let entries: Vec<_> = schema::all().map(|s| (s.name, s.description)).collect();
        return print_json(&entries);
    }
    for s in schema::all() {
        println!("{:<12} {}", s.name, s.description);
    }
    Ok(())
}

fn cmd_schema(domain: &str) -> Result<()> {
    let schema = schema::get(domain)?;
    print_json(schema)
}

fn cmd_validate(args: &ModelArgs, json: bool) -> Result<()> {
    let model = load_validated(args, json)?;
    if json {
        print_json(&serde_json::json!({ "valid": true, "domain": model.domain(), "name": model.name() }))
    } else {
        println!("OK: '{}' is a valid {} model", model.name(), model.domain());
        Ok(())
    }
}

fn cmd_simulate(
    args: &ModelArgs,
    overrides: Vec<(String, f64)>,
    output: Option<&Path>,
    every: usize,
    config: &EngineConfig,
    json: bool,
) -> Result<()> {
    let model = load_validated(args, json)?;
    let overrides: BTreeMap<String, f64> = overrides.into_iter().collect();
    let result = Engine::simulate_with(&model, Some(&overrides), config)?;

    if let Some(path) = output {
        std::fs::write(path, result.to_json_pretty()?)
            .with_context(|| format!("Failed to write result to {:?}", path))?;
        info!(event = "result.written", path = %path.display());
    }

    if json {
        print_json(&result)
    } else {
        println!("{} ({} points)", result.metadata.model_name, result.time.len());
        print!("{}", format_series_table(&result, every));
        Ok(())
    }
}

fn cmd_compare(args: &ModelArgs, scenarios_path: &Path, config: &EngineConfig, json: bool) -> Result<()> {
    let model = load_validated(args, json)?;
    let text = std::fs::read_to_string(scenarios_path)
        .with_context(|| format!("Failed to read scenarios {:?}", scenarios_path))?;
    let scenarios: Vec<Scenario> = serde_json::from_str(&text).context("Failed to parse scenarios as JSON")?;

    let outcomes = scenario::compare(&model, &scenarios, config);
    if json {
        return print_json(&outcomes);
    }
    for outcome in &outcomes {
        match &outcome.outcome {
            Ok(result) => {
                println!("== {} ==", outcome.name);
                print!("{}", format_series_table(result, result.time.len().max(1) - 1));
            }
            Err(e) => println!("== {} == FAILED: {}", outcome.name, e),
        }
    }
    Ok(())
}

fn cmd_sensitivity(
    args: &ModelArgs,
    parameter: &str,
    min: f64,
    max: f64,
    steps: usize,
    config: &EngineConfig,
    json: bool,
) -> Result<()> {
    let model = load_validated(args, json)?;
    let report = scenario::sensitivity(&model, parameter, min, max, steps, config)?;
    if json {
        return print_json(&report);
    }
    for (value, run) in report.values.iter().zip(&report.runs) {
        match &run.outcome {
            Ok(result) => {
                let last = result.time.len().saturating_sub(1);
                let finals: Vec<String> =
                    result.stocks.iter().map(|(id, s)| format!("{}={:.3}", id, s[last])).collect();
                println!("{}={:<12} {}", parameter, value, finals.join("  "));
            }
            Err(e) => println!("{}={:<12} FAILED: {}", parameter, value, e),
        }
    }
    Ok(())
}

fn cmd_trace(
    args: &ModelArgs,
    variable: &str,
    index: usize,
    overrides: Vec<(String, f64)>,
    config: &EngineConfig,
) -> Result<()> {
    let model = load_validated(args, false)?;
    let overrides: BTreeMap<String, f64> = overrides.into_iter().collect();
    let result = Engine::simulate_with(&model, Some(&overrides), config)?;
    print!("{}", format_trace(&model, &result, variable, index));
    Ok(())
}

fn cmd_examples(id: Option<&str>, json: bool) -> Result<()> {
    match id {
        Some(id) => {
            let entry = catalog::get(id).with_context(|| format!("No example named '{}'", id))?;
            println!("{}", entry.json());
        }
        None if json => print_json(catalog::list())?,
        None => {
            for entry in catalog::list() {
                println!("{:<20} {:<12} {}", entry.id, entry.domain.as_str(), entry.title);
            }
        }
    }
    Ok(())
}
