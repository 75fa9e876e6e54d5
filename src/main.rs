use anyhow::Context;
use messenger_wit::{
    webhook::{self, AppState},
    Config, Responder,
};
use tracing::{error, info};

/// Pushes page-level settings from config. Failures are logged by the client.
async fn configure_page(config: &Config, responder: &Responder) {
    let client = responder.send_client();

    if let Some(greeting) = &config.greeting_text {
        client.set_greeting(greeting).await;
    }

    if let Some(payload) = &config.get_started_payload {
        client.set_get_started_payload(payload).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if config.wit_access_token.is_none() {
        info!("WIT_ACCESS_TOKEN not set, replies will skip classification");
    }

    let responder = Responder::new(&config).context("failed to build HTTP clients")?;
    configure_page(&config, &responder).await;

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting Messenger bot on {}", addr);

    let app = webhook::router(AppState::new(&config, responder));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
