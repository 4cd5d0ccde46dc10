use actix_web::HttpResponse;
use askama::Template;
use chrono::{DateTime, Utc};
use log::error;

use crate::models::flash::FlashMessage;
use crate::models::trip::TripRecord;

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(DISPLAY_FORMAT).to_string()
}

/// Display-ready copy of a trip record.
#[derive(Debug, Clone)]
pub struct TripView {
    pub index: usize,
    pub city: String,
    pub days: u32,
    pub interests: String,
    pub transport: String,
    pub budget: String,
    pub group_type: String,
    pub photos: Vec<String>,
    pub itinerary: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl TripView {
    pub fn new(index: usize, record: &TripRecord) -> Self {
        Self {
            index,
            city: record.params.city.clone(),
            days: record.params.days,
            interests: record.params.interests_joined(),
            transport: record.params.transport.clone(),
            budget: record.params.budget.clone(),
            group_type: record.params.group_type.clone(),
            photos: record.photos.clone(),
            itinerary: record.itinerary.clone(),
            created_at: format_timestamp(&record.created_at),
            updated_at: record.updated_at.as_ref().map(format_timestamp),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "generate.html")]
pub struct GenerateTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
    pub trip: TripView,
}

#[derive(Template)]
#[template(path = "my_trips.html")]
pub struct MyTripsTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
    pub trips: Vec<TripView>,
}

#[derive(Template)]
#[template(path = "trip_detail.html")]
pub struct TripDetailTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
    pub trip: TripView,
}

#[derive(Template)]
#[template(path = "edit_trip.html")]
pub struct EditTripTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
    pub trip: TripView,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub active: &'static str,
    pub flashes: Vec<FlashMessage>,
}

pub fn render<T: Template>(template: &T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            error!("Failed to render template: {}", err);
            HttpResponse::InternalServerError().body("Failed to render page")
        }
    }
}
