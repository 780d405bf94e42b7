use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use biocyc_cache::client::Client;
use biocyc_cache::config::{ConfigLoader, parse_expiry};
use biocyc_cache::domain::{Bucket, DetailLevel, Relation};
use biocyc_cache::error::BiocycError;
use biocyc_cache::output::JsonOutput;
use biocyc_cache::remote::HttpTransport;

#[derive(Parser)]
#[command(name = "biocyc")]
#[command(about = "Query the BioCyc pathway/genome databases through a local cache")]
#[command(version, author)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Organism database, e.g. HUMAN, ECOLI, META
    #[arg(long, global = true)]
    org: Option<String>,

    #[arg(long, global = true)]
    detail: Option<DetailLevel>,

    /// Cache expiry window, e.g. 26w or 30d
    #[arg(long, global = true)]
    expiry: Option<String>,

    /// Cache directories; the first one is written, the others are read-only
    #[arg(long = "cache-dir", global = true)]
    cache_dirs: Vec<String>,

    /// Path to a biocyc.json config file
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Resolve one or more frame identifiers")]
    Get { ids: Vec<String> },
    #[command(about = "Look up a record by common name or synonym")]
    Find {
        name: String,
        #[arg(long)]
        bucket: Option<Bucket>,
    },
    #[command(about = "List every record cached for a bucket")]
    List { bucket: Bucket },
    #[command(about = "Resolve the neighbours of a record")]
    Related { id: String, relation: Relation },
    #[command(about = "Run a web-service function and resolve its results")]
    Function { name: String, id: String },
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<BiocycError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &BiocycError) -> u8 {
    match error {
        err if err.is_config() => 2,
        BiocycError::InvalidCategory(_) | BiocycError::InvalidRelation(_) => 2,
        BiocycError::Http(_) | BiocycError::DocumentParse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli.global)?;

    match cli.command {
        Command::Get { ids } => {
            if ids.len() == 1 {
                let entry = client.resolve(&ids[0])?;
                JsonOutput::print(&entry).into_diagnostic()
            } else {
                let entries = client.resolve_all(&ids)?;
                JsonOutput::print(&entries).into_diagnostic()
            }
        }
        Command::Find { name, bucket } => {
            let entry = match bucket {
                Some(bucket) => match client.lookup_name(bucket, &name) {
                    Some(id) => client.resolve(&id)?,
                    None => None,
                },
                None => client.find_by_name(&name)?,
            };
            JsonOutput::print(&entry).into_diagnostic()
        }
        Command::List { bucket } => {
            let entries = client.list(bucket)?;
            JsonOutput::print(&entries).into_diagnostic()
        }
        Command::Related { id, relation } => {
            let Some(record) = client.resolve(&id)?.and_then(|entry| entry.into_record()) else {
                return Err(miette::Report::msg(format!("no record for {id}")));
            };
            let entries = client.related(&record, relation)?;
            JsonOutput::print(&entries).into_diagnostic()
        }
        Command::Function { name, id } => {
            let entries = client.apply_function(&name, &id)?;
            JsonOutput::print(&entries).into_diagnostic()
        }
    }
}

fn build_client(args: &GlobalArgs) -> Result<Client<HttpTransport>, BiocycError> {
    let mut config = ConfigLoader::resolve(args.config.as_deref())?;
    if let Some(org) = &args.org {
        config.organism = org.parse()?;
    }
    if let Some(detail) = args.detail {
        config.detail = detail;
    }
    if let Some(expiry) = &args.expiry {
        config.expiry = parse_expiry(expiry)?;
    }
    if !args.cache_dirs.is_empty() {
        config.cache_paths = args.cache_dirs.iter().map(Utf8PathBuf::from).collect();
    }
    Client::connect(config)
}
