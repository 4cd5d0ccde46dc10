use crate::models::trip::TripParams;

/// Section headers the generated itinerary is asked to use, in order.
pub const SECTION_HEADERS: [&str; 5] = [
    "SUMMARY",
    "DAILY ITINERARY",
    "FOOD RECOMMENDATIONS",
    "HIDDEN GEMS",
    "ESTIMATED COSTS",
];

const RESPONSE_FORMAT: &str = "IMPORTANT: Format your response EXACTLY as follows:

SUMMARY
[Brief overview of the trip]

DAILY ITINERARY
Day 1:
- Morning: [Activity] (Duration: X hours, Cost: ₹X)
- Afternoon: [Activity] (Duration: X hours, Cost: ₹X)
- Evening: [Activity] (Duration: X hours, Cost: ₹X)

Day 2:
[Same structure...]

FOOD RECOMMENDATIONS
1. [Dish Name]: [Description] (Type: [Food Type])
2. [Another Dish]

HIDDEN GEMS
1. [Place Name]: [Description] (Why Visit: [Reason])
2. [Another Place]

ESTIMATED COSTS
Total estimated cost: ₹XXX
Breakdown:
- Accommodation: ₹XXX
- Food: ₹XXX
- Activities: ₹XXX
- Transportation: ₹XXX";

/// Renders the system prompt sent to the itinerary generator.
pub fn build_prompt(params: &TripParams) -> String {
    format!(
        "You are a travel assistant. Generate a detailed {}-day trip itinerary for {} traveling to {}, interested in {}, \nusing {} as transportation, with a {} budget. \n\n{}",
        params.days,
        params.group_type,
        params.city,
        params.interests_joined(),
        params.transport,
        params.budget,
        RESPONSE_FORMAT
    )
}
