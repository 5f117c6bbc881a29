use bank_assistant_service::{
    agent::BankAgent,
    api::start_server,
    dataset::{Dataset, DEFAULT_DATASET_PATH},
    openai::OpenAiClient,
    tools::create_default_registry,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Warning: OPENAI_API_KEY is not set. Queries will fail.");
        String::new()
    });

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Bank Assistant Service - API Server");
    info!("Port: {}", port);

    // Dataset failures are startup-fatal; never serve without data.
    let dataset = Arc::new(Dataset::load(DEFAULT_DATASET_PATH)?);

    let registry = create_default_registry(dataset);
    let client = OpenAiClient::new(api_key);
    let model = BankAgent::model_from_env();
    info!("Chat model: {}", model);

    let agent = Arc::new(BankAgent::new(client, registry, model));

    info!("Starting API server...");
    start_server(agent, port).await?;

    Ok(())
}
