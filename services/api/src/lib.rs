mod cli;
mod infra;
mod routes;
mod server;
mod sim;

use claims_engine::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
