use std::{fmt, path::PathBuf, str::FromStr};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod api_model;

/// A model for describing one tutor as the discovery pipeline sees it.
/// It is merged from the approved-tutor list, the tutor detail and the booking plan,
/// and is rebuilt from scratch on every load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorRecord {
    pub id: u32,
    pub name: String,
    pub language: String,
    pub country: String,
    pub rating: f64,
    pub review_count: usize,
    /// Price of one hour in VND, never negative.
    pub price_per_hour: u64,
    pub specialties: Vec<String>,
    pub avatar_url: String,
    pub bio: String,
    pub availability: String,
}

/// Day of the week as used by booking plans, Monday (`T2`) through Sunday (`CN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayLabel {
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
    CN,
}

impl DayLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::T2 => "T2",
            DayLabel::T3 => "T3",
            DayLabel::T4 => "T4",
            DayLabel::T5 => "T5",
            DayLabel::T6 => "T6",
            DayLabel::T7 => "T7",
            DayLabel::CN => "CN",
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown day label {0:?}")]
pub struct UnknownDay(pub String);

impl FromStr for DayLabel {
    type Err = UnknownDay;

    /// Accepts the short codes (`T2`..`T7`, `CN`) as well as English day names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_lowercase().as_str() {
            "t2" | "mon" | "monday" => DayLabel::T2,
            "t3" | "tue" | "tuesday" => DayLabel::T3,
            "t4" | "wed" | "wednesday" => DayLabel::T4,
            "t5" | "thu" | "thursday" => DayLabel::T5,
            "t6" | "fri" | "friday" => DayLabel::T6,
            "t7" | "sat" | "saturday" => DayLabel::T7,
            "cn" | "sun" | "sunday" => DayLabel::CN,
            _ => return Err(UnknownDay(s.to_owned())),
        };
        Ok(day)
    }
}

/// A model for describing one weekly availability window of a tutor.
/// Hours form a half-open interval `[start_hour, end_hour)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub tutor_id: u32,
    pub day: DayLabel,
    pub start_hour: u8,
    pub end_hour: u8,
    pub is_open: bool,
    pub is_active: bool,
}

impl ScheduleEntry {
    pub fn is_bookable(&self) -> bool {
        self.is_open && self.is_active
    }
}

/// What the search index returns when a query fails internally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Return every tutor, unranked.
    #[default]
    FailOpen,
    /// Return nothing.
    FailClosed,
}

/// What the listing does when the approved-tutor list cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFailurePolicy {
    /// Log the failure and show an empty listing.
    #[default]
    Silent,
    /// Move the listing into a failed state carrying the error message.
    Surface,
}

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json, that contains the backend address and pipeline policies.
/// 2. Free-text search term.
/// 3. Structured filters: language, price range, minimum rating, day and hour range.
/// 4. Result page to print.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, default_value = "")]
    pub query: String,
    #[arg(long, default_value = "all")]
    pub language: String,
    #[arg(long, default_value_t = 0)]
    pub min_price: u64,
    #[arg(long, default_value_t = u64::MAX)]
    pub max_price: u64,
    #[arg(long, default_value_t = 0.0)]
    pub min_rating: f64,
    #[arg(long, default_value = "All")]
    pub day: String,
    #[arg(long, default_value_t = 0)]
    pub from_hour: u8,
    #[arg(long, default_value_t = 24)]
    pub to_hour: u8,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Backend base URL and an optional bearer token
/// 2. Endpoint paths, where `{id}` stands for the tutor id
/// 3. Whether booking plans are requested without authentication
/// 4. Policies for list-fetch failures and search failures, and the number of list-fetch retries
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_approved_tutors_path")]
    pub approved_tutors_path: String,
    #[serde(default = "default_tutor_detail_path")]
    pub tutor_detail_path: String,
    #[serde(default = "default_booking_plan_path")]
    pub booking_plan_path: String,
    #[serde(default = "default_public_booking_plans")]
    pub public_booking_plans: bool,
    #[serde(default)]
    pub list_failure: ListFailurePolicy,
    #[serde(default)]
    pub list_fetch_retries: u32,
    #[serde(default)]
    pub search_fallback: FallbackPolicy,
}

fn default_approved_tutors_path() -> String {
    "/api/tutors/approved".to_owned()
}

fn default_tutor_detail_path() -> String {
    "/api/tutors/{id}".to_owned()
}

fn default_booking_plan_path() -> String {
    "/api/booking-plans/tutor/{id}".to_owned()
}

fn default_public_booking_plans() -> bool {
    true
}
