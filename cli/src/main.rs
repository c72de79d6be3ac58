mod io;
mod reduce;
mod report;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pitchline",
    about = "Shrink dense sample series to a target size while keeping their shape"
)]
struct Cli {
    /// Log every search round to stderr
    #[clap(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reduce sample series and write the retained samples
    Reduce(reduce::Opts),
    /// Reduce sample series and summarise the result
    Report(report::Opts),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Reduce(opts) => reduce::reduce(&opts).await,
        Command::Report(opts) => report::report(&opts).await,
    }
}
