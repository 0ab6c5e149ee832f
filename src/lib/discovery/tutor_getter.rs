use std::collections::BTreeMap;

use futures::future;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{
    models::{
        api_model::{ApprovedTutor, BookingPlanResponse, TutorDetail},
        Config, ScheduleEntry, TutorRecord,
    },
    normalize::{apply_detail, schedule_entries, tutor_from_listing},
    session::Session,
};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend answered {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// Raised by sources that read tutors from files.
    #[error("Could not read tutor data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tutor data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A trait, necessary for every entity that will be used for getting tutors from the backend.
#[allow(async_fn_in_trait)]
pub trait TutorSource {
    async fn approved_tutors(&self) -> Result<Vec<ApprovedTutor>, LoaderError>;
    async fn tutor_detail(&self, tutor_id: u32) -> Result<TutorDetail, LoaderError>;
    async fn booking_plan(&self, tutor_id: u32) -> Result<BookingPlanResponse, LoaderError>;
}

/// Tutors and their bookable slots, as produced by one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTutors {
    pub tutors: Vec<TutorRecord>,
    pub schedules: BTreeMap<u32, Vec<ScheduleEntry>>,
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, LoaderError> {
    Ok(serde_json::from_str(body)?)
}

/// Talks to the marketplace REST backend.
pub struct ApiClient {
    http: Client,
    session: Session,
    base_url: String,
    approved_tutors_path: String,
    tutor_detail_path: String,
    booking_plan_path: String,
    public_booking_plans: bool,
}

impl ApiClient {
    pub fn new(http: Client, config: &Config, session: Session) -> Self {
        Self {
            http,
            session,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            approved_tutors_path: config.approved_tutors_path.clone(),
            tutor_detail_path: config.tutor_detail_path.clone(),
            booking_plan_path: config.booking_plan_path.clone(),
            public_booking_plans: config.public_booking_plans,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn endpoint(&self, path: &str, tutor_id: Option<u32>) -> String {
        let path = match tutor_id {
            Some(id) => path.replace("{id}", &id.to_string()),
            None => path.to_owned(),
        };
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        authorized: bool,
    ) -> Result<T, LoaderError> {
        let mut request = self.http.get(&url);
        if authorized {
            if let Some(token) = self.session.current_token() {
                request = request.bearer_auth(token);
            }
        }
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(LoaderError::Http { url, source }),
        };
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Status { url, status });
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => return Err(LoaderError::Http { url, source }),
        };
        parse_body(&body)
    }
}

/// Allows ApiClient to be used for getting tutors via requests to the marketplace backend.
impl TutorSource for ApiClient {
    async fn approved_tutors(&self) -> Result<Vec<ApprovedTutor>, LoaderError> {
        let url = self.endpoint(&self.approved_tutors_path, None);
        info!("Getting approved tutors from {}", url);
        self.get_json(url, true).await
    }

    async fn tutor_detail(&self, tutor_id: u32) -> Result<TutorDetail, LoaderError> {
        let url = self.endpoint(&self.tutor_detail_path, Some(tutor_id));
        self.get_json(url, true).await
    }

    async fn booking_plan(&self, tutor_id: u32) -> Result<BookingPlanResponse, LoaderError> {
        let url = self.endpoint(&self.booking_plan_path, Some(tutor_id));
        self.get_json(url, !self.public_booking_plans).await
    }
}

async fn enrich_tutor<TS: TutorSource>(source: &TS, tutor: &ApprovedTutor) -> TutorRecord {
    let mut record = tutor_from_listing(tutor);
    match source.tutor_detail(tutor.tutor_id).await {
        Ok(detail) => apply_detail(&mut record, &detail),
        Err(e) => warn!(
            "Could not get detail of tutor {}, using defaults: {}",
            tutor.tutor_id, e
        ),
    }
    record
}

async fn bookable_slots<TS: TutorSource>(source: &TS, tutor_id: u32) -> (u32, Vec<ScheduleEntry>) {
    match source.booking_plan(tutor_id).await {
        Ok(response) => (tutor_id, schedule_entries(tutor_id, &response.plans)),
        Err(e) => {
            warn!(
                "Could not get booking plan of tutor {}, assuming no open slots: {}",
                tutor_id, e
            );
            (tutor_id, Vec::new())
        }
    }
}

/// Loads the approved tutors and enriches every one of them.
/// Only a failure of the approved-tutor list itself is returned as an error,
/// failures of single tutors degrade that tutor to defaults.
pub async fn load_tutors<TS: TutorSource>(source: &TS) -> Result<LoadedTutors, LoaderError> {
    let approved = source.approved_tutors().await?;
    info!("Found {} approved tutors", approved.len());

    /* Details and booking plans are independent, so both batches run at once */
    let (tutors, schedules) = future::join(
        future::join_all(approved.iter().map(|tutor| enrich_tutor(source, tutor))),
        future::join_all(approved.iter().map(|tutor| bookable_slots(source, tutor.tutor_id))),
    )
    .await;
    let schedules = schedules.into_iter().collect::<BTreeMap<_, _>>();
    info!(
        "Collected {} bookable slots for {} tutors",
        schedules.values().map(Vec::len).sum::<usize>(),
        tutors.len()
    );

    Ok(LoadedTutors { tutors, schedules })
}

pub async fn load_tutors_with_retries<TS: TutorSource>(
    source: &TS,
    retries: u32,
) -> Result<LoadedTutors, LoaderError> {
    let mut attempt = 0;
    loop {
        match load_tutors(source).await {
            Ok(loaded) => return Ok(loaded),
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!(
                    "Could not get approved tutors ({}), retry {} of {}",
                    e, attempt, retries
                );
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[path = "tests/tutor_getter.rs"]
mod tests;
