use std::collections::{BTreeMap, HashMap};

use super::models::{DayLabel, ScheduleEntry, TutorRecord, UnknownDay};

pub const ALL_LANGUAGES: &str = "all";
pub const ALL_DAYS: &str = "All";
pub const TUTORS_PER_PAGE: usize = 6;

/// Language names as shown to users, paired with the names tutors are stored under.
pub const LANGUAGE_NAMES: [(&str, &str); 11] = [
    ("Tiếng Anh", "English"),
    ("Tiếng Nhật", "Japanese"),
    ("Tiếng Hàn", "Korean"),
    ("Tiếng Trung", "Chinese"),
    ("Tiếng Pháp", "French"),
    ("Tiếng Đức", "German"),
    ("Tiếng Tây Ban Nha", "Spanish"),
    ("Tiếng Nga", "Russian"),
    ("Tiếng Ý", "Italian"),
    ("Tiếng Thái", "Thai"),
    ("Tiếng Việt", "Vietnamese"),
];

/// Canonical name for a selected language, whichever of the two names was selected.
/// Languages missing from the table are compared as given.
pub fn canonical_language(selected: &str) -> String {
    let selected = selected.trim();
    LANGUAGE_NAMES
        .iter()
        .find(|(display, canonical)| {
            display.to_lowercase() == selected.to_lowercase()
                || canonical.eq_ignore_ascii_case(selected)
        })
        .map_or_else(|| selected.to_owned(), |(_, canonical)| canonical.to_string())
}

pub fn display_language(canonical: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(canonical.trim()))
        .map(|(display, _)| *display)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageFilter {
    #[default]
    All,
    /// Lower-cased canonical language name.
    Only(String),
}

impl LanguageFilter {
    pub fn parse(selected: &str) -> Self {
        let selected = selected.trim();
        if selected.is_empty() || selected.eq_ignore_ascii_case(ALL_LANGUAGES) {
            LanguageFilter::All
        } else {
            LanguageFilter::Only(canonical_language(selected).to_lowercase())
        }
    }

    pub fn matches(&self, language: &str) -> bool {
        match self {
            LanguageFilter::All => true,
            LanguageFilter::Only(wanted) => language.trim().to_lowercase() == *wanted,
        }
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: u64::MAX,
        }
    }
}

impl PriceRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: u64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Half-open `[from, to)` range of hours of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub from: u8,
    pub to: u8,
}

impl Default for HourRange {
    fn default() -> Self {
        Self { from: 0, to: 24 }
    }
}

impl HourRange {
    pub fn new(from: u8, to: u8) -> Self {
        Self { from, to }
    }

    pub fn overlaps(&self, start_hour: u8, end_hour: u8) -> bool {
        intervals_overlap(start_hour, end_hour, self.from, self.to)
    }
}

/// `[a, b)` and `[c, d)` share at least one point.
pub fn intervals_overlap(a: u8, b: u8, c: u8, d: u8) -> bool {
    !(b <= c || a >= d)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayFilter {
    #[default]
    All,
    Only(DayLabel),
}

impl DayFilter {
    pub fn parse(selected: &str) -> Result<Self, UnknownDay> {
        let selected = selected.trim();
        if selected.is_empty() || selected.eq_ignore_ascii_case(ALL_DAYS) {
            Ok(DayFilter::All)
        } else {
            selected.parse().map(DayFilter::Only)
        }
    }
}

/// Structured filters of the tutor listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TutorFilters {
    pub language: LanguageFilter,
    pub price: PriceRange,
    /// Zero disables the rating filter.
    pub min_rating: f64,
    pub day: DayFilter,
    /// Only consulted when a day is selected.
    pub hours: HourRange,
}

impl TutorFilters {
    pub fn matches(&self, tutor: &TutorRecord, schedule: &[ScheduleEntry]) -> bool {
        if !self.language.matches(&tutor.language) {
            return false;
        }
        if !self.price.contains(tutor.price_per_hour) {
            return false;
        }
        if self.min_rating > 0.0 && tutor.rating < self.min_rating {
            return false;
        }
        match self.day {
            DayFilter::All => true,
            DayFilter::Only(day) => schedule.iter().any(|entry| {
                entry.is_bookable()
                    && entry.day == day
                    && self.hours.overlaps(entry.start_hour, entry.end_hour)
            }),
        }
    }
}

/// Keeps the ranked tutors passing every filter, in ranked order.
pub fn apply_filters<'a>(
    ranked: &[u32],
    tutors: &'a [TutorRecord],
    schedules: &BTreeMap<u32, Vec<ScheduleEntry>>,
    filters: &TutorFilters,
) -> Vec<&'a TutorRecord> {
    let by_id = tutors
        .iter()
        .map(|tutor| (tutor.id, tutor))
        .collect::<HashMap<_, _>>();
    ranked
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .filter(|tutor| {
            let schedule = schedules.get(&tutor.id).map_or(&[][..], Vec::as_slice);
            filters.matches(tutor, schedule)
        })
        .collect()
}

pub fn total_pages(count: usize, per_page: usize) -> usize {
    count.div_ceil(per_page.max(1))
}

/// Items of the 1-based `page`, empty when the page is out of range.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
#[path = "tests/filters.rs"]
mod tests;
