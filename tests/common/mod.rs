#![allow(dead_code)]

use actix_web::{
    cookie::Cookie,
    dev::{ServiceRequest, ServiceResponse},
    web, App,
};
use chrono::{Duration, Utc};
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use trip_planner::config::SESSION_COOKIE;
use trip_planner::db::session_store::{SessionState, SessionStore};
use trip_planner::middleware::session::{sign_session, verify_session, SessionMiddleware};
use trip_planner::models::trip::{TripParams, TripRecord};
use trip_planner::routes;
use trip_planner::services::itinerary_generation_service::{GenerationError, ItineraryGenerator};
use trip_planner::services::upload_service::UploadService;

pub const TEST_SECRET: &str = "test_secret_key";
pub const BOUNDARY: &str = "----trip-planner-test-boundary";
pub const SAMPLE_ITINERARY: &str = "SUMMARY\nThree relaxed days of forts and food.\n\nDAILY ITINERARY\nDay 1:\n- Morning: Amber Fort (Duration: 3 hours, Cost: ₹200)";

/// Generator double that records prompts and answers with a canned reply.
pub struct StubGenerator {
    reply: Result<String, (u16, String)>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.to_string())),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ItineraryGenerator for StubGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenerationError>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(GenerationError::ApiError {
                status: *status,
                message: message.clone(),
            }),
        };
        Box::pin(async move { reply })
    }
}

pub struct TestApp {
    pub sessions: Arc<SessionStore>,
    pub generator: Arc<StubGenerator>,
    pub uploads: UploadService,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_generator(StubGenerator::replying(SAMPLE_ITINERARY))
    }

    pub fn with_generator(generator: Arc<StubGenerator>) -> Self {
        let upload_dir = tempfile::tempdir().expect("temp upload dir");
        let uploads = UploadService::new(upload_dir.path());
        Self {
            sessions: SessionStore::new(Duration::hours(1)),
            generator,
            uploads,
            upload_dir,
        }
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.uploads = self.uploads.with_max_content_length(limit);
        self
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let generator: Arc<dyn ItineraryGenerator> = self.generator.clone();
        App::new()
            .wrap(SessionMiddleware::new(self.sessions.clone(), TEST_SECRET))
            .app_data(web::Data::from(generator))
            .app_data(web::Data::from(self.sessions.clone()))
            .app_data(web::Data::new(self.uploads.clone()))
            .configure(routes::configure)
    }

    /// Starts a session directly in the store and returns its signed cookie.
    pub fn open_session(&self) -> Cookie<'static> {
        let sid = self.sessions.create();
        let token = sign_session(&sid, TEST_SECRET, &self.sessions).expect("sign session");
        Cookie::new(SESSION_COOKIE, token)
    }

    /// Runs `f` against the server-side state behind a session cookie.
    pub fn with_state<R>(&self, cookie: &Cookie<'static>, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let claims = verify_session(cookie.value(), TEST_SECRET).expect("valid session cookie");
        self.sessions.with_session(&claims.sid, f)
    }

    pub fn saved_trips(&self, cookie: &Cookie<'static>) -> Vec<TripRecord> {
        self.with_state(cookie, |s| s.saved_trips.iter().cloned().collect())
    }

    pub fn seed_trips(&self, cookie: &Cookie<'static>, cities: &[&str]) {
        self.with_state(cookie, |s| {
            for city in cities {
                s.saved_trips.append(sample_trip(city));
            }
        });
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir.path())
            .expect("read upload dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

pub fn sample_trip(city: &str) -> TripRecord {
    TripRecord::new(
        TripParams {
            city: city.to_string(),
            days: 3,
            interests: vec!["history".to_string(), "food".to_string()],
            transport: "Train".to_string(),
            budget: "Moderate".to_string(),
            group_type: "Couple".to_string(),
        },
        vec![],
        SAMPLE_ITINERARY.to_string(),
        Utc::now(),
    )
}

pub fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

pub fn location(resp: &ServiceResponse) -> Option<String> {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub fn trip_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("city", "Jaipur"),
        ("days", "3"),
        ("interests", "forts, street food ,textiles"),
        ("transport", "Auto rickshaw"),
        ("budget", "Moderate"),
        ("group_type", "Family"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"photos\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
