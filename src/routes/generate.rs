use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::{error, info, warn};
use std::fmt;

use crate::middleware::session_context::SessionContext;
use crate::models::flash::FlashMessage;
use crate::models::trip::{TripInputError, TripParams, TripRecord};
use crate::routes::redirect;
use crate::services::itinerary_generation_service::{GenerationError, ItineraryGenerator};
use crate::services::prompt_service::build_prompt;
use crate::services::upload_service::{
    read_submission, MultipartSubmission, UploadError, UploadService,
};
use crate::views::{render, GenerateTemplate, ResultTemplate, TripView};

#[derive(Debug)]
pub enum GenerateError {
    InvalidInput(TripInputError),
    Upload(UploadError),
    Generation(GenerationError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::InvalidInput(err) => write!(f, "{}", err),
            GenerateError::Upload(err) => write!(f, "{}", err),
            GenerateError::Generation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<TripInputError> for GenerateError {
    fn from(err: TripInputError) -> Self {
        GenerateError::InvalidInput(err)
    }
}

impl From<UploadError> for GenerateError {
    fn from(err: UploadError) -> Self {
        GenerateError::Upload(err)
    }
}

impl From<GenerationError> for GenerateError {
    fn from(err: GenerationError) -> Self {
        GenerateError::Generation(err)
    }
}

/*
    GET /generate
*/
pub async fn generate_form(session: SessionContext) -> impl Responder {
    render(&GenerateTemplate {
        active: "generate",
        flashes: session.take_flashes(),
    })
}

/*
    POST /generate
*/
pub async fn generate_trip(
    req: HttpRequest,
    session: SessionContext,
    generator: web::Data<dyn ItineraryGenerator>,
    uploads: web::Data<UploadService>,
    payload: web::Payload,
) -> impl Responder {
    let limit = uploads.max_content_length();
    if content_length(&req).is_some_and(|len| len > limit) {
        warn!("Rejecting /generate body larger than {} bytes", limit);
        return payload_too_large(limit);
    }

    let submission = match read_submission(&req, payload, limit).await {
        Ok(submission) => submission,
        Err(UploadError::PayloadTooLarge(limit)) => return payload_too_large(limit),
        Err(err) => return generation_failed(&session, err.into()),
    };

    match build_trip(submission, generator.get_ref(), &uploads).await {
        Ok(record) => {
            let view = TripView::new(session.trip_count(), &record);
            session.set_current_trip(record);
            render(&ResultTemplate {
                active: "generate",
                flashes: session.take_flashes(),
                trip: view,
            })
        }
        Err(err) => generation_failed(&session, err),
    }
}

async fn build_trip(
    submission: MultipartSubmission,
    generator: &dyn ItineraryGenerator,
    uploads: &UploadService,
) -> Result<TripRecord, GenerateError> {
    let params = TripParams::from_fields(&submission.fields)?;
    let photos = uploads.save_all(submission.files).await?;

    info!("Generating itinerary for {} ({} days)", params.city, params.days);
    let itinerary = generator.generate(&build_prompt(&params)).await?;
    info!("Itinerary received ({} chars)", itinerary.len());

    Ok(TripRecord::new(params, photos, itinerary, Utc::now()))
}

fn content_length(req: &HttpRequest) -> Option<usize> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn payload_too_large(limit: usize) -> HttpResponse {
    HttpResponse::PayloadTooLarge().body(format!("Upload exceeds the {} byte limit", limit))
}

fn generation_failed(session: &SessionContext, err: GenerateError) -> HttpResponse {
    error!("Error generating itinerary: {}", err);
    session.flash(FlashMessage::error(format!(
        "Error generating itinerary: {}",
        err
    )));
    redirect("/generate")
}

/*
    POST /save
*/
pub async fn save_trip(session: SessionContext) -> impl Responder {
    match session.save_current_trip(Utc::now()) {
        Ok(index) => {
            info!("Saved trip at index {}", index);
            session.flash(FlashMessage::success("Trip saved successfully!"));
            redirect("/my-trips")
        }
        Err(err) => {
            session.flash(FlashMessage::error(err.to_string()));
            redirect("/generate")
        }
    }
}
