use log::*;
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting login portal on {}:{} (login path {})",
        config.interface.as_deref().unwrap_or("127.0.0.1"),
        config.port,
        config.login_path()
    );

    let app_state = AppState::new(config);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed to start: {e:?}");
        std::process::exit(1);
    }
}
