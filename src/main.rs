//! Entry Pass server binary.
//!
//! Loads configuration, initializes logging, wires adapters into the
//! ticketing handlers and serves the HTTP API.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use entry_pass::adapters::gateway::{HttpGatewayConfig, HttpPaymentGateway, MockPaymentGateway};
use entry_pass::adapters::http::{app_router, TicketingAppState};
use entry_pass::adapters::storage::InMemoryTransactionStore;
use entry_pass::application::handlers::IntentSettings;
use entry_pass::config::AppConfig;
use entry_pass::domain::ticketing::{CredentialSigner, IssuancePolicy, WebhookVerifier};
use entry_pass::ports::PaymentGateway;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config)?;
    let router = app_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        mock_gateway = config.payment.uses_mock_gateway(),
        "entry pass listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<TicketingAppState, Box<dyn std::error::Error>> {
    let payment = &config.payment;
    let ticketing = &config.ticketing;

    let gateway: Arc<dyn PaymentGateway> = if payment.uses_mock_gateway() {
        tracing::warn!("using in-process mock payment gateway");
        Arc::new(MockPaymentGateway::new())
    } else {
        let api_key = payment
            .gateway_api_key
            .clone()
            .ok_or("payment.gateway_api_key is required")?;
        Arc::new(HttpPaymentGateway::new(HttpGatewayConfig::new(
            payment.gateway_base_url.clone(),
            api_key,
            payment.gateway_timeout(),
        ))?)
    };

    let signing_secret = ticketing
        .signing_secret
        .clone()
        .ok_or("ticketing.signing_secret is required")?;
    let currencies = ticketing.accepted_currencies()?;

    let intent_settings = IntentSettings {
        expected_price: ticketing.expected_price,
        currency: currencies.primary().clone(),
        description: ticketing.event_description.clone(),
        callback_url: payment.callback_url.clone(),
        gateway_timeout: payment.gateway_timeout(),
    };

    Ok(TicketingAppState {
        store: Arc::new(InMemoryTransactionStore::new()),
        gateway,
        webhook_verifier: Arc::new(WebhookVerifier::new(payment.webhook_secret.clone())),
        signer: Arc::new(CredentialSigner::new(signing_secret)),
        policy: Arc::new(IssuancePolicy::new(ticketing.expected_price, currencies)),
        intent_settings: Arc::new(intent_settings),
        signature_header: Arc::from(payment.webhook_signature_header.as_str()),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
