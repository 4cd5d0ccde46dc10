use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::db::session_store::SessionStore;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::upload_service::UploadService;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details.into()),
        }
    }

    fn degraded(details: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            details: Some(details.into()),
        }
    }
}

pub async fn health_check(
    generator: web::Data<dyn ItineraryGenerator>,
    uploads: web::Data<UploadService>,
    sessions: web::Data<SessionStore>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let generator_status = if generator.is_configured() {
        ServiceStatus::ok("API key loaded")
    } else {
        ServiceStatus::degraded("GROQ_API_KEY not set")
    };
    health
        .services
        .insert("itinerary_generator".to_string(), generator_status);

    health
        .services
        .insert("uploads".to_string(), check_upload_dir(&uploads).await);

    health.services.insert(
        "sessions".to_string(),
        ServiceStatus::ok(format!("{} active", sessions.len())),
    );

    if health.services.values().any(|s| s.status != "ok") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_upload_dir(uploads: &UploadService) -> ServiceStatus {
    let dir = uploads.upload_dir();
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => ServiceStatus::ok(dir.display().to_string()),
        Ok(_) => ServiceStatus::degraded(format!("{} is not a directory", dir.display())),
        Err(err) => ServiceStatus::degraded(format!("{}: {}", dir.display(), err)),
    }
}
