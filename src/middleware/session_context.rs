use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorInternalServerError, web, Error, FromRequest, HttpMessage,
    HttpRequest,
};
use chrono::{DateTime, Utc};

use crate::db::session_store::{SessionState, SessionStore};
use crate::middleware::session::SessionSlot;
use crate::models::flash::FlashMessage;
use crate::models::trip::{TripPatch, TripRecord};
use crate::services::trip_store::TripStoreError;

/// Per-request handle on the caller's session. Each method is one locked
/// operation on the store; a sequence of calls is not atomic. Reads never
/// allocate a session, writes allocate one on first use.
#[derive(Clone)]
pub struct SessionContext {
    store: web::Data<SessionStore>,
    slot: SessionSlot,
}

impl SessionContext {
    pub fn new(store: web::Data<SessionStore>, slot: SessionSlot) -> Self {
        Self { store, slot }
    }

    fn existing<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let id = self.slot.get()?;
        self.store.with_existing(&id, f)
    }

    fn write<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let id = self.slot.get_or_create(&self.store);
        self.store.with_session(&id, f)
    }

    pub fn set_current_trip(&self, record: TripRecord) {
        self.write(|s| s.current_trip = Some(record));
    }

    /// Moves the pending trip into the saved list, stamping its creation time.
    pub fn save_current_trip(&self, now: DateTime<Utc>) -> Result<usize, TripStoreError> {
        self.existing(|s| {
            let mut record = s.current_trip.take().ok_or(TripStoreError::NoCurrentTrip)?;
            record.created_at = now;
            Ok(s.saved_trips.append(record))
        })
        .unwrap_or(Err(TripStoreError::NoCurrentTrip))
    }

    pub fn saved_trips(&self) -> Vec<TripRecord> {
        self.existing(|s| s.saved_trips.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn trip_count(&self) -> usize {
        self.existing(|s| s.saved_trips.len()).unwrap_or(0)
    }

    pub fn get_trip(&self, index: usize) -> Result<TripRecord, TripStoreError> {
        self.existing(|s| s.saved_trips.get(index).cloned())
            .unwrap_or(Err(TripStoreError::NotFound(index)))
    }

    pub fn update_trip(
        &self,
        index: usize,
        patch: &TripPatch,
        now: DateTime<Utc>,
    ) -> Result<TripRecord, TripStoreError> {
        self.existing(|s| s.saved_trips.update(index, patch, now).cloned())
            .unwrap_or(Err(TripStoreError::NotFound(index)))
    }

    pub fn delete_trip(&self, index: usize) -> Result<TripRecord, TripStoreError> {
        self.existing(|s| s.saved_trips.delete(index))
            .unwrap_or(Err(TripStoreError::NotFound(index)))
    }

    pub fn flash(&self, message: FlashMessage) {
        self.write(|s| s.flashes.push(message));
    }

    /// Returns and clears pending flash messages.
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        self.existing(|s| std::mem::take(&mut s.flashes))
            .unwrap_or_default()
    }
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let store = req.app_data::<web::Data<SessionStore>>().cloned();
        let slot = req.extensions().get::<SessionSlot>().cloned();

        match (store, slot) {
            (Some(store), Some(slot)) => ready(Ok(SessionContext::new(store, slot))),
            _ => ready(Err(ErrorInternalServerError("Session not available"))),
        }
    }
}
