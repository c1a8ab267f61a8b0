use actix_web::{middleware, web, App, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod handlers;

use handlers::{estimate, health};
use pricecast::predictor::DealPredictor;

/// Application state shared across handlers
pub struct AppState {
    pub predictor: Option<DealPredictor>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    // Load the trained model
    let model_path = std::env::var("MODEL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("models/pricecast.json"));

    info!("Loading model from {:?}", model_path);

    let predictor = match DealPredictor::load(&model_path) {
        Ok(p) => {
            info!("Model loaded successfully");
            Some(p)
        }
        Err(e) => {
            warn!(
                "Failed to load model: {}. Estimates will be unavailable until one is trained.",
                e
            );
            None
        }
    };

    let app_state = Arc::new(AppState { predictor });

    info!("Starting Pricecast API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/estimate", web::post().to(estimate::estimate_device))
    })
    .bind(&addr)?
    .run()
    .await
}
