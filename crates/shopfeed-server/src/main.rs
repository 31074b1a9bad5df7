use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shopfeed_server::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    pipeline::FeedPipeline,
    scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shopfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, shops = config.shop_tokens.len(), "starting shopfeed-server");

    let pool_config = shopfeed_db::PoolConfig::from_app_config(&config);
    let pool = shopfeed_db::connect_pool(&config.database_url, pool_config).await?;
    shopfeed_db::run_migrations(&pool).await?;

    let client = Arc::new(shopfeed_shopify::ShopifyClient::from_app_config(&config)?);
    let pipeline = Arc::new(FeedPipeline::new(
        pool.clone(),
        client,
        config.shop_tokens.clone(),
    ));

    let _scheduler =
        scheduler::build_scheduler(Arc::clone(&pipeline), config.refresh_cron.as_deref()).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        shopfeed_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, pipeline }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
