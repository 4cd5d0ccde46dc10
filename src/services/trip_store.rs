use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::trip::{TripInputError, TripPatch, TripRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripStoreError {
    NotFound(usize),
    NoCurrentTrip,
    InvalidPatch(TripInputError),
}

impl fmt::Display for TripStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStoreError::NotFound(_) => write!(f, "Trip not found"),
            TripStoreError::NoCurrentTrip => write!(f, "No trip to save"),
            TripStoreError::InvalidPatch(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TripStoreError {}

/// Ordered list of saved trips. Indices are positional, so a delete shifts
/// every later trip down by one.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct TripStore {
    trips: Vec<TripRecord>,
}

impl TripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TripRecord> {
        self.trips.iter()
    }

    /// Appends and returns the index of the new trip.
    pub fn append(&mut self, record: TripRecord) -> usize {
        self.trips.push(record);
        self.trips.len() - 1
    }

    pub fn get(&self, index: usize) -> Result<&TripRecord, TripStoreError> {
        self.trips.get(index).ok_or(TripStoreError::NotFound(index))
    }

    pub fn update(
        &mut self,
        index: usize,
        patch: &TripPatch,
        now: DateTime<Utc>,
    ) -> Result<&TripRecord, TripStoreError> {
        let record = self
            .trips
            .get_mut(index)
            .ok_or(TripStoreError::NotFound(index))?;
        patch.validate().map_err(TripStoreError::InvalidPatch)?;
        patch.apply(record, now);
        Ok(record)
    }

    pub fn delete(&mut self, index: usize) -> Result<TripRecord, TripStoreError> {
        if index >= self.trips.len() {
            return Err(TripStoreError::NotFound(index));
        }
        Ok(self.trips.remove(index))
    }
}
