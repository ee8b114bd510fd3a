use chrono::Utc;
use milestone_report::config::AppConfig;
use milestone_report::github::GitHubClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // A local .env is optional; the CI host provides the real environment.
    dotenvy::dotenv().ok();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "milestone_report=info,octocrab=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let client = match GitHubClient::new(config.github_token.clone(), &config.github_api_url) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create GitHub client: {:#}. Exiting.", e);
            std::process::exit(1);
        }
    };

    match milestone_report::run(&config, &client, Utc::now()).await {
        Ok(outcome) => tracing::info!("{}", outcome),
        Err(e) => {
            tracing::error!("{:#}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    }
}
