use std::sync::Arc;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;
use env_logger::Env;
use log::{info, warn};

use trip_planner::config::{AppConfig, SESSION_LIFETIME_HOURS, STATIC_FOLDER};
use trip_planner::db::session_store::SessionStore;
use trip_planner::middleware::session::SessionMiddleware;
use trip_planner::routes;
use trip_planner::services::itinerary_generation_service::{
    GroqItineraryGenerator, ItineraryGenerator,
};
use trip_planner::services::upload_service::UploadService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    info!(
        "GROQ_API_KEY loaded: {}",
        if config.groq_api_key.is_some() { "yes" } else { "no" }
    );
    if config.uses_default_secret() {
        warn!("SECRET_KEY not set, session cookies are signed with the default key");
    }

    let uploads = UploadService::new(&config.upload_folder);
    uploads
        .ensure_dir()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let generator: Arc<dyn ItineraryGenerator> =
        Arc::new(GroqItineraryGenerator::from_config(&config));
    let sessions = SessionStore::new(Duration::hours(SESSION_LIFETIME_HOURS));
    let secret = config.secret_key.clone();

    info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(sessions.clone(), &secret))
            .wrap(Logger::default())
            .app_data(web::Data::from(generator.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(web::Data::new(uploads.clone()))
            .configure(routes::configure)
            .service(Files::new("/static", STATIC_FOLDER))
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
