use routine_tracker::{router, schedule::Schedule, AppState, Config, LocalStore};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    let schedule = match &config.schedule_path {
        Some(path) => {
            let schedule = Schedule::load(path).await?;
            info!(path = %path.display(), tasks = schedule.task_count(), "loaded schedule");
            schedule
        }
        None => Schedule::builtin(),
    };

    let store = LocalStore::open(&config.data_path, config.store_disabled).await;
    let state = AppState::new(schedule, store);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
