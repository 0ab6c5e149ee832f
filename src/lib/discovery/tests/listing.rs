use std::io;

use crate::discovery::models::DayLabel;

use super::*;

fn tutor(id: u32, language: &str, price_per_hour: u64, rating: f64) -> TutorRecord {
    TutorRecord {
        id,
        name: format!("Tutor {}", id),
        language: language.to_owned(),
        country: "Vietnam".to_owned(),
        rating,
        review_count: 0,
        price_per_hour,
        specialties: Vec::new(),
        avatar_url: String::new(),
        bio: String::new(),
        availability: "Available".to_owned(),
    }
}

fn slot(tutor_id: u32, day: DayLabel, start_hour: u8, end_hour: u8) -> ScheduleEntry {
    ScheduleEntry {
        tutor_id,
        day,
        start_hour,
        end_hour,
        is_open: true,
        is_active: true,
    }
}

/// Twenty english tutors priced 10k..200k, the even ones teaching on Monday mornings.
fn many_tutors() -> LoadedTutors {
    let tutors = (1..=20)
        .map(|id| tutor(id, "English", id as u64 * 10_000, 4.0))
        .collect::<Vec<_>>();
    let schedules = (1..=20)
        .map(|id| {
            let slots = if id % 2 == 0 {
                vec![slot(id, DayLabel::T2, 8, 10)]
            } else {
                Vec::new()
            };
            (id, slots)
        })
        .collect();
    LoadedTutors { tutors, schedules }
}

fn ready_listing(loaded: LoadedTutors) -> TutorListing {
    let mut listing = TutorListing::new(FallbackPolicy::FailOpen);
    listing.finish_loading(Ok(loaded), ListFailurePolicy::Silent);
    listing
}

fn list_failure() -> LoaderError {
    LoaderError::Io(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
}

#[test]
fn new_listing_is_loading() {
    let listing = TutorListing::new(FallbackPolicy::FailOpen);
    assert_eq!(listing.state(), &ListingState::Loading);
    assert_eq!(listing.current_page(), 1);
}

#[test]
fn loading_moves_to_ready() {
    let listing = ready_listing(many_tutors());
    assert_eq!(listing.state(), &ListingState::Ready);
    assert_eq!(listing.tutors().len(), 20);
    assert_eq!(listing.schedules().len(), 20);
    assert_eq!(listing.total_pages(), 4);
}

#[test]
fn silent_list_failure_shows_empty_listing() {
    let mut listing = TutorListing::new(FallbackPolicy::FailOpen);
    listing.finish_loading(Err(list_failure()), ListFailurePolicy::Silent);
    assert_eq!(listing.state(), &ListingState::Ready);
    let page = listing.page();
    assert!(page.tutors.is_empty());
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.page, 1);
}

#[test]
fn surfaced_list_failure_carries_message() {
    let mut listing = TutorListing::new(FallbackPolicy::FailOpen);
    listing.finish_loading(Err(list_failure()), ListFailurePolicy::Surface);
    match listing.state() {
        ListingState::Failed(message) => assert!(message.contains("timed out")),
        other => panic!("unexpected state {:?}", other),
    }
    assert!(listing.results().is_empty());
}

#[test]
fn pages_follow_ranked_results() {
    let mut listing = ready_listing(many_tutors());
    listing.set_page(2);
    let page = listing.page();
    assert_eq!(page.page, 2);
    assert_eq!(page.total_results, 20);
    assert_eq!(
        page.tutors.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![7, 8, 9, 10, 11, 12]
    );
}

#[test]
fn every_input_change_resets_page() {
    let mut listing = ready_listing(many_tutors());
    let changes: Vec<Box<dyn Fn(&mut TutorListing)>> = vec![
        Box::new(|l: &mut TutorListing| l.set_search_term("english")),
        Box::new(|l: &mut TutorListing| l.set_language("Tiếng Anh")),
        Box::new(|l: &mut TutorListing| l.set_price_range(PriceRange::new(0, 150_000))),
        Box::new(|l: &mut TutorListing| l.set_min_rating(3.5)),
        Box::new(|l: &mut TutorListing| l.set_day(DayFilter::Only(DayLabel::T2))),
        Box::new(|l: &mut TutorListing| l.set_hour_range(HourRange::new(8, 12))),
    ];
    for change in changes.iter() {
        listing.set_page(3);
        change(&mut listing);
        assert_eq!(listing.current_page(), 1);
    }
}

#[test]
fn unchanged_input_keeps_page() {
    let mut listing = ready_listing(many_tutors());
    listing.set_page(3);
    listing.set_search_term("");
    listing.set_language("all");
    listing.set_min_rating(0.0);
    listing.set_day(DayFilter::All);
    assert_eq!(listing.current_page(), 3);
}

#[test]
fn page_beyond_results_goes_back_to_first() {
    let mut listing = ready_listing(many_tutors());
    listing.set_page(4);
    assert_eq!(listing.page().page, 4);

    listing.set_day(DayFilter::Only(DayLabel::T2));
    listing.set_page(4);
    let page = listing.page();
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page, 1);
    assert_eq!(listing.current_page(), 1);
}

#[test]
fn narrower_reload_resets_page() {
    let mut listing = ready_listing(many_tutors());
    listing.set_page(3);
    listing.replace_tutors(LoadedTutors {
        tutors: vec![tutor(1, "English", 10_000, 4.0)],
        schedules: BTreeMap::new(),
    });
    let page = listing.page();
    assert_eq!(page.page, 1);
    assert_eq!(page.tutors.len(), 1);
}

#[test]
fn search_and_filters_combine() {
    let mut listing = ready_listing(LoadedTutors {
        tutors: vec![
            tutor(1, "english", 100_000, 4.5),
            tutor(2, "japanese", 200_000, 5.0),
            tutor(3, "english", 500_000, 3.0),
        ],
        schedules: BTreeMap::from([
            (1, vec![slot(1, DayLabel::T2, 9, 11)]),
            (3, vec![slot(3, DayLabel::T2, 10, 12)]),
        ]),
    });

    listing.set_search_term("engl");
    listing.set_price_range(PriceRange::new(0, 300_000));
    assert_eq!(
        listing.results().iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1]
    );

    listing.set_price_range(PriceRange::default());
    listing.set_day(DayFilter::Only(DayLabel::T2));
    listing.set_hour_range(HourRange::new(10, 13));
    let mut found = listing.results().iter().map(|t| t.id).collect::<Vec<_>>();
    found.sort();
    assert_eq!(found, vec![1, 3]);

    listing.set_search_term("japan");
    assert!(listing.results().is_empty());
}
