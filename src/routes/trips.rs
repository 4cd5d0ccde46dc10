use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{info, warn};

use crate::middleware::session_context::SessionContext;
use crate::models::flash::FlashMessage;
use crate::models::trip::{TripEditForm, TripPatch};
use crate::routes::redirect;
use crate::services::trip_store::TripStoreError;
use crate::views::{render, EditTripTemplate, MyTripsTemplate, TripDetailTemplate, TripView};

fn trip_not_found(session: &SessionContext, index: usize) -> HttpResponse {
    warn!("Trip index {} out of range", index);
    session.flash(FlashMessage::error("Trip not found"));
    redirect("/my-trips")
}

/*
    /my-trips
*/
pub async fn my_trips(session: SessionContext) -> impl Responder {
    let trips = session
        .saved_trips()
        .iter()
        .enumerate()
        .map(|(index, record)| TripView::new(index, record))
        .collect();

    render(&MyTripsTemplate {
        active: "trips",
        flashes: session.take_flashes(),
        trips,
    })
}

/*
    /trip/{id}
*/
pub async fn view_trip(session: SessionContext, path: web::Path<usize>) -> impl Responder {
    let index = path.into_inner();
    match session.get_trip(index) {
        Ok(record) => render(&TripDetailTemplate {
            active: "trips",
            flashes: session.take_flashes(),
            trip: TripView::new(index, &record),
        }),
        Err(_) => trip_not_found(&session, index),
    }
}

/*
    GET /edit-trip/{id}
*/
pub async fn edit_trip_form(session: SessionContext, path: web::Path<usize>) -> impl Responder {
    let index = path.into_inner();
    match session.get_trip(index) {
        Ok(record) => render(&EditTripTemplate {
            active: "trips",
            flashes: session.take_flashes(),
            trip: TripView::new(index, &record),
        }),
        Err(_) => trip_not_found(&session, index),
    }
}

/*
    POST /edit-trip/{id}
*/
pub async fn edit_trip(
    session: SessionContext,
    path: web::Path<usize>,
    input: Option<web::Form<TripEditForm>>,
) -> impl Responder {
    let index = path.into_inner();
    if session.get_trip(index).is_err() {
        return trip_not_found(&session, index);
    }
    let Some(input) = input else {
        warn!("Rejecting malformed edit form for trip {}", index);
        return HttpResponse::BadRequest().body("Invalid trip form");
    };
    let patch = TripPatch::from(input.into_inner());

    match session.update_trip(index, &patch, Utc::now()) {
        Ok(_) => {
            info!("Updated trip at index {}", index);
            session.flash(FlashMessage::success("Trip updated successfully!"));
            redirect(&format!("/trip/{}", index))
        }
        Err(TripStoreError::InvalidPatch(err)) => {
            session.flash(FlashMessage::error(err.to_string()));
            redirect(&format!("/edit-trip/{}", index))
        }
        Err(_) => trip_not_found(&session, index),
    }
}

/*
    /delete-trip/{id}
*/
pub async fn delete_trip(session: SessionContext, path: web::Path<usize>) -> impl Responder {
    let index = path.into_inner();
    match session.delete_trip(index) {
        Ok(record) => {
            info!("Deleted trip to {} at index {}", record.params.city, index);
            session.flash(FlashMessage::success("Trip deleted successfully"));
        }
        Err(_) => {
            warn!("Trip index {} out of range", index);
            session.flash(FlashMessage::error("Trip not found"));
        }
    }
    redirect("/my-trips")
}
