mod assess;
mod cli;
mod infra;
mod routes;
mod server;

use visa_scout::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
