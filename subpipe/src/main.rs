use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use serde_json::Value as Json;

use subpipe::{Config, OperationDescriptor, OperationKind, Pipeline, Record, compile};

/// First two bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Pipeline used when neither --script nor --config is given
const DEFAULT_SCRIPT: &str = "split_string()\nsend_stdout()";

#[derive(Parser)]
#[command(name = "subpipe", version, about = "Compile transform scripts and run them over data")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script and print the resulting operations as JSON
    Compile {
        /// Script file to compile
        script: PathBuf,
    },
    /// Run a pipeline over a file or stdin
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Script file defining the pipeline
    #[arg(long, conflicts_with = "config")]
    script: Option<PathBuf>,

    /// JSON or TOML configuration file defining the pipeline
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Decompress gzip input before running the pipeline
    #[arg(long)]
    gzip: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Compile { script } => handle_compile(script),
        Commands::Run(args) => handle_run(args),
    }
}

fn handle_compile(path: PathBuf) -> Result<()> {
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let descriptors =
        compile(&text).with_context(|| format!("Failed to compile {}", path.display()))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&descriptors).context("Failed to serialize operations")?
    );
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<()> {
    let mut descriptors = pipeline_descriptors(&args)?;

    let input = read_input(args.input.as_ref())?;
    if input.is_empty() {
        anyhow::bail!("Input is empty");
    }

    let gzipped = input.starts_with(&GZIP_MAGIC);
    if (args.gzip || gzipped) && !starts_with_decompress(&descriptors) {
        if gzipped && !args.gzip {
            log::info!("gzip input detected, decompressing first");
        }
        descriptors.insert(0, OperationDescriptor::new(OperationKind::DecompressGzip));
    }

    let pipeline = Pipeline::new(&descriptors).context("Failed to build pipeline")?;
    log::debug!("running {:?}", pipeline);

    let record = load_record(input, gzipped);
    let records = pipeline
        .apply(vec![record])
        .context("Pipeline failed")?;

    eprintln!(
        "{} {} record(s) from {} operation(s)",
        "done:".green().bold(),
        records.len(),
        pipeline.len()
    );
    Ok(())
}

fn pipeline_descriptors(args: &RunArgs) -> Result<Vec<OperationDescriptor>> {
    if let Some(path) = &args.script {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        return compile(&text).with_context(|| format!("Failed to compile {}", path.display()));
    }

    if let Some(path) = &args.config {
        let config = Config::load(path)?;
        return config
            .descriptors()
            .with_context(|| format!("Invalid configuration: {}", path.display()));
    }

    compile(DEFAULT_SCRIPT).context("Failed to compile default pipeline")
}

fn starts_with_decompress(descriptors: &[OperationDescriptor]) -> bool {
    descriptors
        .first()
        .is_some_and(|d| d.kind == OperationKind::DecompressGzip)
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read input: {}", path.display()))
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Turn raw input into the initial record
///
/// JSON objects and arrays become trees; other text stays a string and
/// compressed or binary input is kept as bytes.
fn load_record(input: Vec<u8>, compressed: bool) -> Record {
    if !compressed {
        let parsed = serde_json::from_slice::<Json>(&input);
        if let Ok(tree @ (Json::Object(_) | Json::Array(_))) = parsed {
            return Record::new(tree);
        }
    }
    Record::from_bytes(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_script_and_config_conflict() {
        let result = Cli::try_parse_from(["subpipe", "run", "--script", "a", "--config", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_record_shapes() {
        assert_eq!(
            load_record(br#"{"a": 1}"#.to_vec(), false).payload(),
            Some(&json!({"a": 1}))
        );
        assert_eq!(load_record(b"[1, 2]".to_vec(), false).payload(), Some(&json!([1, 2])));
        assert_eq!(load_record(b"42".to_vec(), false).payload(), Some(&json!("42")));
        assert_eq!(
            load_record(b"a\nb".to_vec(), false).payload(),
            Some(&json!("a\nb"))
        );
        assert_eq!(
            load_record(vec![0x1f, 0x8b, 0x08], true).payload(),
            Some(&json!([31, 139, 8]))
        );
    }

    #[test]
    fn test_default_pipeline() {
        let descriptors = compile(DEFAULT_SCRIPT).unwrap();
        assert_eq!(descriptors[0].kind, OperationKind::SplitString);
        assert_eq!(descriptors[1].kind, OperationKind::SendStdout);
        assert!(!starts_with_decompress(&descriptors));
    }
}
