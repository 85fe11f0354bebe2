use anyhow::Context;
use lettings_proxy::config::Config;
use lettings_proxy::import::Importer;
use lettings_proxy::server::{self, AppState};
use lettings_proxy::token::TokenManager;
use lettings_proxy::vendor::{HttpVendorApi, VendorApi};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("configuration is incomplete")?;

    let vendor: Arc<dyn VendorApi> = Arc::new(HttpVendorApi::new(
        config.api_base(),
        config.vendor_username.clone(),
        config.vendor_password.clone(),
    ));
    let tokens = Arc::new(TokenManager::new(Arc::clone(&vendor), config.token_ttl));
    let importer = Arc::new(Importer::new(
        vendor,
        tokens,
        config.property_list_url(),
        config.classifier_strict,
    ));

    let state = AppState {
        importer,
        proxy_secret: config.proxy_secret.clone(),
        proxy_ip: config.proxy_ip.clone(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    tracing::info!(%addr, "lettings proxy listening");

    axum::serve(listener, server::router(state))
        .await
        .context("server terminated")?;

    Ok(())
}
