use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chembl_sim::app::App;
use chembl_sim::config::{ConfigLoader, RunOptions};
use chembl_sim::error::SimError;
use chembl_sim::similarity::ChemblHttpClient;

#[derive(Parser)]
#[command(name = "chembl_sim")]
#[command(about = "Perform similarity search against ChEMBL DB using the official cartridge")]
#[command(version, author)]
#[command(
    after_help = "Exit status: 0 on success, 2 for invalid options or config (nothing is written), 3 when the ChEMBL service fails, 1 otherwise."
)]
struct Cli {
    /// Input file, standard input by default
    #[arg(short = 'i', long)]
    input: Option<Utf8PathBuf>,

    /// Output file, standard output by default
    #[arg(short = 'o', long)]
    output: Option<Utf8PathBuf>,

    /// Similarity threshold, an integer in range [70-100]
    #[arg(short = 't', long, default_value = "95")]
    threshold: String,

    /// Input format: chembl_id (comma separated ChEMBL IDs), sdf (MDL molfile) or smi (SMILES)
    #[arg(short = 's', long = "source-format", default_value = "csv")]
    source_format: String,

    /// Output format: chembl_id, smi, sdf, inchi or inchi_key
    #[arg(short = 'd', long = "destination-format", default_value = "chembl_id")]
    destination_format: String,

    /// Human readable output: prints a header and a first column with the query identifiers
    #[arg(short = 'H', long = "Human")]
    human: bool,

    /// Service configuration file (JSON)
    #[arg(short = 'c', long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SimError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SimError) -> u8 {
    if error.is_configuration() {
        2
    } else if error.is_remote() {
        3
    } else {
        1
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let run_config = RunOptions {
        input: cli.input,
        output: cli.output,
        threshold: cli.threshold,
        source_format: cli.source_format,
        destination_format: cli.destination_format,
        human: cli.human,
    }
    .resolve()?;
    let service = ConfigLoader::resolve(cli.config.as_deref())?;

    let client = ChemblHttpClient::new(&service)?;
    let app = App::new(client.clone(), client);
    app.run(&run_config)?;
    Ok(())
}
