//! The only place that knows about the different shapes the backend sends.
use log::debug;

use super::models::{
    api_model::{ApprovedTutor, BookingPlan, TutorDetail},
    DayLabel, ScheduleEntry, TutorRecord,
};

pub const DEFAULT_RATING: f64 = 5.0;
pub const PLACEHOLDER_AVATAR_URL: &str = "https://placehold.co/150x150?text=Tutor";
pub const DEFAULT_BIO: &str = "This tutor has not shared a biography yet.";
pub const DEFAULT_AVAILABILITY: &str = "Available";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_specialties(source: Option<&str>) -> Vec<String> {
    source
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Builds a record from the list entry alone, as if every enrichment call failed.
pub fn tutor_from_listing(tutor: &ApprovedTutor) -> TutorRecord {
    let price_per_hour = match tutor.price_per_hour {
        Some(price) if price.is_finite() && price > 0.0 => price.round() as u64,
        _ => 0,
    };
    let rating = match tutor.rating {
        Some(rating) if rating.is_finite() => rating,
        _ => DEFAULT_RATING,
    };
    let avatar_url = non_blank(tutor.avatar_url.as_deref())
        .or(non_blank(tutor.avatar_url_upper.as_deref()))
        .unwrap_or(PLACEHOLDER_AVATAR_URL);

    TutorRecord {
        id: tutor.tutor_id,
        name: non_blank(tutor.user_name.as_deref())
            .unwrap_or_default()
            .to_owned(),
        language: non_blank(tutor.teaching_language.as_deref())
            .unwrap_or_default()
            .to_owned(),
        country: non_blank(tutor.country.as_deref())
            .unwrap_or_default()
            .to_owned(),
        rating,
        review_count: 0,
        price_per_hour,
        specialties: parse_specialties(tutor.specialization.as_deref()),
        avatar_url: avatar_url.to_owned(),
        bio: DEFAULT_BIO.to_owned(),
        availability: non_blank(tutor.availability.as_deref())
            .unwrap_or(DEFAULT_AVAILABILITY)
            .to_owned(),
    }
}

/// Merges a successfully fetched detail into the record.
pub fn apply_detail(record: &mut TutorRecord, detail: &TutorDetail) {
    if let Some(bio) = non_blank(detail.bio.as_deref()) {
        record.bio = bio.to_owned();
    }
    record.review_count = detail.feedbacks.as_ref().map_or(0, Vec::len);
}

/// Takes the hour out of `"HH:MM"`. Minutes are truncated.
pub fn parse_hour(value: &str) -> Option<u8> {
    let hour = value.trim().split(':').next()?.trim().parse::<u8>().ok()?;
    (hour <= 24).then_some(hour)
}

/// Turns one booking plan into a schedule entry.
/// Returns `None` for plans that are not bookable or cannot be understood.
pub fn schedule_entry(tutor_id: u32, plan: &BookingPlan) -> Option<ScheduleEntry> {
    if !(plan.is_open && plan.is_active) {
        return None;
    }
    let Ok(day) = plan.title.parse::<DayLabel>() else {
        debug!(
            "Skipping plan of tutor {} with unknown day {:?}",
            tutor_id, plan.title
        );
        return None;
    };
    let (Some(start_hour), Some(end_hour)) =
        (parse_hour(&plan.start_hours), parse_hour(&plan.end_hours))
    else {
        debug!(
            "Skipping plan of tutor {} with malformed hours {:?}-{:?}",
            tutor_id, plan.start_hours, plan.end_hours
        );
        return None;
    };
    if start_hour >= end_hour {
        debug!(
            "Skipping plan of tutor {} with empty interval {}-{}",
            tutor_id, start_hour, end_hour
        );
        return None;
    }
    Some(ScheduleEntry {
        tutor_id,
        day,
        start_hour,
        end_hour,
        is_open: plan.is_open,
        is_active: plan.is_active,
    })
}

pub fn schedule_entries(tutor_id: u32, plans: &[BookingPlan]) -> Vec<ScheduleEntry> {
    plans
        .iter()
        .filter_map(|plan| schedule_entry(tutor_id, plan))
        .collect()
}
