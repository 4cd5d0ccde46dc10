pub mod itinerary_generation_service;
pub mod prompt_service;
pub mod trip_store;
pub mod upload_service;
