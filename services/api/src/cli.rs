use crate::nearby::{run_nearby, NearbyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sos_dispatch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "sos-dispatch",
    about = "Run the emergency reporting backend or query nearby services from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the emergency services nearest to a point
    Nearby(NearbyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Nearby(args) => run_nearby(args).await,
    }
}
