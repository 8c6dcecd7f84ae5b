mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use admissions_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
