use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripInputError {
    MissingField(&'static str),
    InvalidDays(String),
    EmptyCity,
}

impl fmt::Display for TripInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripInputError::MissingField(name) => write!(f, "Missing form field: {}", name),
            TripInputError::InvalidDays(raw) => {
                write!(f, "Days must be a positive whole number, got '{}'", raw)
            }
            TripInputError::EmptyCity => write!(f, "City must not be empty"),
        }
    }
}

impl std::error::Error for TripInputError {}

/// Splits a comma separated interests field into trimmed, non-empty entries.
pub fn parse_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn parse_days(raw: &str) -> Result<u32, TripInputError> {
    match raw.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(TripInputError::InvalidDays(raw.to_string())),
    }
}

/// User supplied part of a trip, as entered on the generate form.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TripParams {
    pub city: String,
    pub days: u32,
    pub interests: Vec<String>,
    pub transport: String,
    pub budget: String,
    pub group_type: String,
}

impl TripParams {
    /// Builds parameters from raw text form fields.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, TripInputError> {
        let field = |name: &'static str| {
            fields
                .get(name)
                .map(|v| v.as_str())
                .ok_or(TripInputError::MissingField(name))
        };

        let city = field("city")?.trim().to_string();
        if city.is_empty() {
            return Err(TripInputError::EmptyCity);
        }

        Ok(Self {
            city,
            days: parse_days(field("days")?)?,
            interests: parse_interests(field("interests")?),
            transport: field("transport")?.to_string(),
            budget: field("budget")?.to_string(),
            group_type: field("group_type")?.to_string(),
        })
    }

    pub fn interests_joined(&self) -> String {
        self.interests.join(", ")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TripRecord {
    #[serde(flatten)]
    pub params: TripParams,
    pub photos: Vec<String>,
    pub itinerary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TripRecord {
    pub fn new(
        params: TripParams,
        photos: Vec<String>,
        itinerary: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            params,
            photos,
            itinerary,
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update applied by the edit form. Absent fields keep their value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TripPatch {
    pub city: Option<String>,
    pub days: Option<u32>,
    pub interests: Option<Vec<String>>,
    pub transport: Option<String>,
    pub budget: Option<String>,
    pub group_type: Option<String>,
}

impl TripPatch {
    pub fn validate(&self) -> Result<(), TripInputError> {
        if let Some(city) = &self.city {
            if city.trim().is_empty() {
                return Err(TripInputError::EmptyCity);
            }
        }
        if self.days == Some(0) {
            return Err(TripInputError::InvalidDays("0".to_string()));
        }
        Ok(())
    }

    /// Merges the present fields into `record` and stamps `updated_at`.
    /// Callers validate first.
    pub fn apply(&self, record: &mut TripRecord, now: DateTime<Utc>) {
        let params = &mut record.params;
        if let Some(city) = &self.city {
            params.city = city.trim().to_string();
        }
        if let Some(days) = self.days {
            params.days = days;
        }
        if let Some(interests) = &self.interests {
            params.interests = interests.clone();
        }
        if let Some(transport) = &self.transport {
            params.transport = transport.clone();
        }
        if let Some(budget) = &self.budget {
            params.budget = budget.clone();
        }
        if let Some(group_type) = &self.group_type {
            params.group_type = group_type.clone();
        }
        record.updated_at = Some(now);
    }
}

/// Body of the edit form. All fields are required, matching the form markup.
#[derive(Debug, Deserialize)]
pub struct TripEditForm {
    pub city: String,
    pub days: u32,
    pub interests: String,
    pub transport: String,
    pub budget: String,
    pub group_type: String,
}

impl From<TripEditForm> for TripPatch {
    fn from(form: TripEditForm) -> Self {
        Self {
            city: Some(form.city),
            days: Some(form.days),
            interests: Some(parse_interests(&form.interests)),
            transport: Some(form.transport),
            budget: Some(form.budget),
            group_type: Some(form.group_type),
        }
    }
}
