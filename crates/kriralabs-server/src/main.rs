//! Kriralabs gateway: public chat endpoint for SDK callers.

use std::sync::Arc;

use kriralabs_chat::HttpAnsweringEngine;
use kriralabs_core::GatewayConfig;
use kriralabs_server::{routes, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USER_AGENT: &str = concat!("kriralabs-gateway/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--check-config" | "check-config" => {
                match GatewayConfig::from_env() {
                    Ok(config) => {
                        println!("{:#?}", config);
                        return Ok(());
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
            }
            "--help" | "-h" | "help" => {
                println!("Kriralabs gateway: public chat API for bots");
                println!();
                println!("Usage: kriralabs-gateway [command]");
                println!();
                println!("Commands:");
                println!("  (none)          Start the server");
                println!("  check-config    Validate environment configuration and exit");
                println!("  help            Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT, API_VERIFICATION_URL, SERVICE_API_SECRET, LLM_SERVICE_URL,");
                println!("  UPSTREAM_TIMEOUT_SECS, ENGINE_TIMEOUT_SECS, RUST_LOG");
                return Ok(());
            }
            _ => {
                eprintln!(
                    "Unknown command: {}. Use 'kriralabs-gateway help' for usage.",
                    args[1]
                );
                std::process::exit(1);
            }
        }
    }

    let config = GatewayConfig::from_env()?;
    info!("Configuration: {:?}", config);
    if config.service_secret.is_none() {
        warn!("SERVICE_API_SECRET is not set: chat requests will fail and usage is not tracked");
    }

    // One pooled client for every outbound call
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    let engine = Arc::new(HttpAnsweringEngine::new(client.clone(), &config));
    info!("Answering engine at {}", engine.url());

    let port = config.port;
    let state = Arc::new(AppState::new(config, client, engine));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Kriralabs gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
