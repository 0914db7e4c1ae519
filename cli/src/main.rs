use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use openstack_schema_catalog::{ApiCatalog, PolicyConfig};
use openstack_schema_core::{
    Operation, Parameter, Properties, RequiredPolicy, ValidationOptions,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

/// CLI output format for structured output.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "openstack-schema")]
#[command(about = "Inspect OpenStack API definitions and validate parameter values")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the operations defined by a catalog.
    List(ListArgs),
    /// Show the parameter schemas of one operation.
    Show(ShowArgs),
    /// Validate a JSON document of user values against an operation.
    Validate(InputArgs),
    /// Validate user values and print the assembled request parts.
    Serialize(InputArgs),
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Catalog definition file (YAML/JSON) or directory of definition files.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Operation name (e.g. postServer).
    #[arg(long)]
    operation: String,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct InputArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Operation name (e.g. postServer).
    #[arg(long)]
    operation: String,
    /// JSON file with user values keyed by parameter name; `-` reads stdin.
    #[arg(long)]
    input: PathBuf,
    /// Validation policy YAML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enforce `required` on nested properties regardless of the config.
    #[arg(long)]
    recursive_required: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::List(args) => run_list(args),
        Command::Show(args) => run_show(args),
        Command::Validate(args) => run_validate(args),
        Command::Serialize(args) => run_serialize(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    for name in catalog.operations() {
        if let Some(op) = catalog.get(name) {
            println!("{name}\t{}\t{}", op.method(), op.path());
        }
    }
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let op = find_operation(&catalog, &args.operation)?;

    let summary = OperationSummary {
        name: op.name(),
        method: op.method(),
        path: op.path(),
        json_key: op.json_key(),
        params: op
            .params()
            .map(|(_, param)| ParamSummary::from_param(param))
            .collect(),
    };

    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize output: {e}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&summary)
            .map_err(|e| format!("Failed to serialize output: {e}"))?,
    };
    println!("{raw}");
    Ok(())
}

fn run_validate(args: InputArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let op = find_operation(&catalog, &args.operation)?;
    let options = resolve_options(&args)?;
    let values = read_values(&args.input)?;

    op.validate_with(&values, &options)
        .map_err(|e| format!("'{}' is invalid: {e}", op.name()))?;
    println!("valid");
    Ok(())
}

fn run_serialize(args: InputArgs) -> Result<(), String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let op = find_operation(&catalog, &args.operation)?;
    let options = resolve_options(&args)?;
    let values = read_values(&args.input)?;

    let parts = op
        .serialize_with(&values, &options)
        .map_err(|e| format!("'{}' is invalid: {e}", op.name()))?;
    let raw = serde_json::to_string_pretty(&parts)
        .map_err(|e| format!("Failed to serialize request: {e}"))?;
    println!("{raw}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_catalog(path: &Path) -> Result<ApiCatalog, String> {
    let catalog = if path.is_dir() {
        ApiCatalog::from_dir(path)
    } else {
        ApiCatalog::from_file(path)
    };
    catalog.map_err(|e| format!("Failed to load catalog '{}': {e}", path.display()))
}

fn find_operation<'a>(catalog: &'a ApiCatalog, name: &str) -> Result<&'a Operation, String> {
    catalog
        .get(name)
        .ok_or_else(|| format!("Unknown operation '{name}'"))
}

fn resolve_options(args: &InputArgs) -> Result<ValidationOptions, String> {
    let mut options = match &args.config {
        Some(path) => PolicyConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?
            .validation_options(),
        None => ValidationOptions::default(),
    };
    if args.recursive_required {
        options.required = RequiredPolicy::Recursive;
    }
    tracing::debug!(required = ?options.required, "resolved validation options");
    Ok(options)
}

fn read_values(input: &Path) -> Result<Map<String, Value>, String> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        buf
    } else {
        fs::read_to_string(input)
            .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Input must be a JSON object keyed by parameter name".to_string()),
        Err(err) => Err(format!("Failed to parse input JSON: {err}")),
    }
}

#[derive(Serialize)]
struct OperationSummary<'a> {
    name: &'a str,
    method: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_key: Option<&'a str>,
    params: Vec<ParamSummary>,
}

#[derive(Serialize)]
struct ParamSummary {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sent_as: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    param_type: Option<String>,
    required: bool,
    locations: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<ParamSummary>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<ParamSummary>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    free_form: bool,
}

impl ParamSummary {
    fn from_param(param: &Parameter) -> Self {
        let properties = match param.properties() {
            Properties::Undeclared => Vec::new(),
            Properties::Declared(map) => map.values().map(Self::from_param).collect(),
        };

        Self {
            name: param.canonical_name().to_string(),
            sent_as: param.sent_as().map(String::from),
            param_type: param.param_type().map(|t| t.to_string()),
            required: param.is_required(),
            locations: param.locations().map(|l| l.to_string()).collect(),
            path: param.path().to_string(),
            items: param
                .item_schema()
                .map(|item| Box::new(Self::from_param(item))),
            properties,
            free_form: param.is_free_form(),
        }
    }
}
