use std::sync::Arc;

use sensorwatch_monitor::{MonitorConfig, PgSensorStore, Scheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorwatch_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env().expect("Invalid monitor configuration");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sensorwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    sensorwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    sensorwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let scheduler = Scheduler::new(Arc::new(PgSensorStore::new(pool)), config);
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Received SIGINT (Ctrl-C), stopping monitor");
        signal_cancel.cancel();
    });

    scheduler.run(cancel).await;
    tracing::info!("Monitor stopped");
}
