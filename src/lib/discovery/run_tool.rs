use std::{error::Error, path::Path};

use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::info;

use super::{
    filters::{DayFilter, HourRange, PriceRange},
    listing::TutorListing,
    models::{Args, Config},
    tutor_getter::{load_tutors_with_retries, TutorSource},
};

/// Reads config.json and lets `TUTORS_`-prefixed environment variables override it.
pub fn load_config(config_json_path: &Path) -> Result<Config, figment::Error> {
    Figment::new()
        .merge(Json::file(config_json_path))
        .merge(Env::prefixed("TUTORS_"))
        .extract()
}

/// Loads the tutors and applies everything the user asked for in `args`.
pub async fn run<TS: TutorSource>(
    tutor_source: TS,
    args: &Args,
    config: &Config,
) -> Result<TutorListing, Box<dyn Error>> {
    let day = DayFilter::parse(&args.day)?;

    let mut listing = TutorListing::new(config.search_fallback);
    let loaded = load_tutors_with_retries(&tutor_source, config.list_fetch_retries).await;
    listing.finish_loading(loaded, config.list_failure);

    listing.set_search_term(args.query.as_str());
    listing.set_language(&args.language);
    listing.set_price_range(PriceRange::new(args.min_price, args.max_price));
    listing.set_min_rating(args.min_rating);
    listing.set_day(day);
    listing.set_hour_range(HourRange::new(args.from_hour, args.to_hour));
    listing.set_page(args.page);

    info!(
        "Found {} tutors for query {:?}",
        listing.results().len(),
        listing.search_term()
    );
    Ok(listing)
}
