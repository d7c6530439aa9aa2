mod cli;
mod infra;
mod nearby;
mod routes;
mod server;

use sos_dispatch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
