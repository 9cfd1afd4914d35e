use dinner_vote_backend::error::AppError;
use dinner_vote_backend::run_server;
use dinner_vote_backend::telemetry::setup_telemetry;
use dinner_vote_config::get_config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_telemetry();

    let config = get_config()?;
    run_server(config).await
}
