use std::collections::BTreeMap;

use log::{debug, error, info};
use serde::Serialize;

use super::{
    filters::{
        apply_filters, page_slice, total_pages, DayFilter, HourRange, LanguageFilter, PriceRange,
        TutorFilters, TUTORS_PER_PAGE,
    },
    models::{FallbackPolicy, ListFailurePolicy, ScheduleEntry, TutorRecord},
    search_index::SearchIndex,
    tutor_getter::{LoadedTutors, LoaderError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    Loading,
    Ready,
    /// Only reachable with [`ListFailurePolicy::Surface`].
    Failed(String),
}

/// One page of filtered tutors.
#[derive(Debug, Serialize)]
pub struct Page<'a> {
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub tutors: Vec<&'a TutorRecord>,
}

/// State of the tutor listing: the loaded tutors, their index and everything the user selected.
/// Filtered results are recomputed on every read, nothing derived is cached besides the index.
#[derive(Debug)]
pub struct TutorListing {
    state: ListingState,
    tutors: Vec<TutorRecord>,
    schedules: BTreeMap<u32, Vec<ScheduleEntry>>,
    index: SearchIndex,
    fallback: FallbackPolicy,
    search_term: String,
    filters: TutorFilters,
    current_page: usize,
}

impl TutorListing {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self {
            state: ListingState::Loading,
            tutors: Vec::new(),
            schedules: BTreeMap::new(),
            index: SearchIndex::default().with_fallback(fallback),
            fallback,
            search_term: String::new(),
            filters: TutorFilters::default(),
            current_page: 1,
        }
    }

    pub fn finish_loading(
        &mut self,
        loaded: Result<LoadedTutors, LoaderError>,
        policy: ListFailurePolicy,
    ) {
        match loaded {
            Ok(loaded) => {
                self.replace_tutors(loaded);
                self.state = ListingState::Ready;
            }
            Err(e) => {
                error!("Could not load tutors: {}", e);
                self.replace_tutors(LoadedTutors::default());
                self.state = match policy {
                    ListFailurePolicy::Silent => ListingState::Ready,
                    ListFailurePolicy::Surface => ListingState::Failed(e.to_string()),
                };
            }
        }
    }

    /// Swaps in a new collection and rebuilds the index over it.
    pub fn replace_tutors(&mut self, loaded: LoadedTutors) {
        self.index = SearchIndex::build(&loaded.tutors).with_fallback(self.fallback);
        self.tutors = loaded.tutors;
        self.schedules = loaded.schedules;
        info!("Listing holds {} tutors", self.tutors.len());
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn tutors(&self) -> &[TutorRecord] {
        &self.tutors
    }

    pub fn schedules(&self) -> &BTreeMap<u32, Vec<ScheduleEntry>> {
        &self.schedules
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &TutorFilters {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn reset_page_if(&mut self, changed: bool) {
        if changed {
            self.current_page = 1;
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        let changed = term != self.search_term;
        self.search_term = term;
        self.reset_page_if(changed);
    }

    pub fn set_language(&mut self, selected: &str) {
        let language = LanguageFilter::parse(selected);
        let changed = language != self.filters.language;
        self.filters.language = language;
        self.reset_page_if(changed);
    }

    pub fn set_price_range(&mut self, price: PriceRange) {
        let changed = price != self.filters.price;
        self.filters.price = price;
        self.reset_page_if(changed);
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        let changed = min_rating != self.filters.min_rating;
        self.filters.min_rating = min_rating;
        self.reset_page_if(changed);
    }

    pub fn set_day(&mut self, day: DayFilter) {
        let changed = day != self.filters.day;
        self.filters.day = day;
        self.reset_page_if(changed);
    }

    pub fn set_hour_range(&mut self, hours: HourRange) {
        let changed = hours != self.filters.hours;
        self.filters.hours = hours;
        self.reset_page_if(changed);
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
    }

    /// Every tutor matching the search term and the filters, best match first.
    pub fn results(&self) -> Vec<&TutorRecord> {
        let ranked = self.index.search(&self.search_term);
        apply_filters(&ranked, &self.tutors, &self.schedules, &self.filters)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.results().len(), TUTORS_PER_PAGE)
    }

    /// The current page of results. Falls back to the first page when the current one
    /// no longer exists.
    pub fn page(&mut self) -> Page<'_> {
        let ranked = self.index.search(&self.search_term);
        let results = apply_filters(&ranked, &self.tutors, &self.schedules, &self.filters);
        let total = total_pages(results.len(), TUTORS_PER_PAGE);
        if self.current_page == 0 || self.current_page > total {
            if self.current_page != 1 {
                debug!(
                    "Page {} is out of {} pages, going back to the first one",
                    self.current_page, total
                );
            }
            self.current_page = 1;
        }

        Page {
            page: self.current_page,
            total_pages: total,
            total_results: results.len(),
            tutors: page_slice(&results, self.current_page, TUTORS_PER_PAGE).to_vec(),
        }
    }
}

#[cfg(test)]
#[path = "tests/listing.rs"]
mod tests;
