// src/bin/api_server.rs

use fhevm_sdk::infra::clock::{Clock, SystemClock};
use fhevm_sdk::infra::config;
use fhevm_sdk::transport;
use fhevm_sdk::transport::http::RateLimiter;
use fhevm_sdk::{
    ClientRegistry, DefaultInstanceFactory, FheService, FileStore, KeyCache, StubComputation,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // --- Configuration ---
    let client_config = config::client_config()?;
    let rpc_timeout = config::rpc_timeout()?;
    let (rate_limit, rate_window) = config::compute_rate_limit()?;
    let bind_addr = config::bind_addr();
    let key_store_path = config::key_store_path();
    info!(
        network = %client_config.network,
        contract = %client_config.contract_address,
        gateway = ?client_config.gateway_url,
        "loaded configuration"
    );

    // --- Service Initialization ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let factory = DefaultInstanceFactory {
        gateway_timeout: Some(rpc_timeout),
    };
    let registry = ClientRegistry::new(Arc::new(factory));
    let fhe_service = FheService::new(
        registry,
        client_config,
        Arc::new(StubComputation::with_clock(clock.clone())),
    );
    // Eager init surfaces config problems at startup; requests retry lazily if it fails.
    if let Err(e) = fhe_service.client().await {
        warn!(error = %e, "FHEVM client not ready at startup, will retry on first request");
    }

    info!(path = %key_store_path.display(), "using key store");
    let key_cache = KeyCache::with_clock(Arc::new(FileStore::new(key_store_path)), clock.clone());

    let app_state = transport::http::AppState {
        fhe_service: Arc::new(fhe_service),
        key_cache: Arc::new(key_cache),
        compute_limiter: Arc::new(RateLimiter::new(rate_limit, rate_window, clock.clone())),
        clock,
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API server listening on http://{}", bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!(error = %e, "server stopped");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
