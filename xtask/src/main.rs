use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod tasks;

#[derive(Parser)]
#[command(
    name = "unet-xtask",
    about = "Inspect and sanity-check the U-Net architectures",
    author,
    version
)]
struct Cli {
    /// Also print debug events emitted while building models
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a layer-by-layer table with output shapes and parameter counts
    Summary(tasks::summary::SummaryArgs),
    /// Build a model and run one forward pass on random images
    Check(tasks::check::CheckArgs),
    /// Write a model config as JSON
    InitConfig(tasks::init_config::InitConfigArgs),
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A global tracing subscriber is already installed");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match &cli.command {
        Commands::Summary(args) => tasks::summary::run(args),
        Commands::Check(args) => tasks::check::run(args),
        Commands::InitConfig(args) => tasks::init_config::run(args),
    }
}
