use serde_json::json;
use tokio::net::TcpListener;

use twelvefactor::app::bootstrap;
use twelvefactor::http::{serve, ServerTimeouts};
use twelvefactor::{Config, Logger, StartupError};

#[tokio::main]
async fn main() {
    // A local .env never overrides the real environment.
    let _ = dotenvy::dotenv();

    // 1. Load Config
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            Logger::new("app-startup".to_string())
                .error("Failed to load configuration", Some(&json!({"error": e.to_string()})));
            std::process::exit(1);
        }
    };

    // 2. Initialize Logger
    let logger = Logger::new(config.instance_id.clone());
    logger.info("Service starting up", Some(&json!({
        "bind": config.bind_addr(),
        "ping_path": config.ping_path,
        "users_path": config.users_path_prefix,
        "users_select_limit": config.users_select_limit,
        "req_timeout_ms": config.req_timeout.as_millis() as u64,
    })));

    if let Err(e) = run(&config, &logger).await {
        logger.error("Startup failed", Some(&json!({"error": e.to_string()})));
        std::process::exit(1);
    }

    logger.info("Service shutdown", None);
}

async fn run(config: &Config, logger: &Logger) -> Result<(), StartupError> {
    // 3. Connect store, build services, compose router
    let (router, pool) = bootstrap(config, logger).await?;

    // 4. Bind and serve until Ctrl+C
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;

    let served = serve(
        listener,
        router,
        ServerTimeouts::from(config),
        logger.scoped("http"),
        shutdown_signal(logger.clone()),
    )
    .await;

    pool.close().await;
    served.map_err(StartupError::Serve)
}

async fn shutdown_signal(logger: Logger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger.info("Shutdown signal received", None),
        Err(e) => {
            logger.error("Failed to listen for Ctrl+C", Some(&json!({"error": e.to_string()})));
            std::future::pending::<()>().await;
        }
    }
}
