//! Module with tutor models compatible with the marketplace backend's REST API
use serde::{Deserialize, Serialize};

/// One entry of the approved-tutor list.
/// Every field except the id is optional on the wire, the backend is not consistent about it.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedTutor {
    pub tutor_id: u32,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub teaching_language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, rename = "avatarURL")]
    pub avatar_url_upper: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
pub struct TutorDetail {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub feedbacks: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct BookingPlan {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_hours: String,
    #[serde(default)]
    pub end_hours: String,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
pub struct BookingPlanResponse {
    #[serde(default)]
    pub plans: Vec<BookingPlan>,
}
