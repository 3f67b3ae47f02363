use dotenv::dotenv;
use log::{error, info};
use std::net::SocketAddr;
use std::process;
use warp::Filter;

use investimate_backend::config::Settings;
use investimate_backend::routes;
use investimate_backend::services::registry::ModelRegistry;
use investimate_backend::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            process::exit(1);
        }
    };

    // No traffic is served without all three models
    let registry = match ModelRegistry::load(&settings.model_dir) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Error loading models: {}", e);
            process::exit(1);
        }
    };

    let addr: SocketAddr = ([0, 0, 0, 0], settings.port).into();
    info!("Will bind to: {}", addr);

    let cors = routes::cors(&settings);
    let api = routes::routes(AppState::new(registry, settings)).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
