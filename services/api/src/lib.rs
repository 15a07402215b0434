mod cli;
mod infra;
mod routes;
mod server;
mod terminal;

use data_maturity::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
