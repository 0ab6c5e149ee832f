use std::error::Error;

use clap::Parser;
use log::info;
use tutor_discovery::discovery::{
    listing::ListingState,
    models::Args,
    run_tool::{load_config, run},
    session::Session,
    tutor_getter::ApiClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging, stdout is reserved for the results */
    env_logger::builder()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config = load_config(&args.config_json_path)?;
    info!(
        "Read config.json from {}",
        std::path::absolute(&args.config_json_path)?.display()
    );
    let session = Session::from_config(&config);
    info!(
        "Talking to {} as {} user",
        config.api_base_url,
        if session.is_authenticated() {
            "an authenticated"
        } else {
            "an anonymous"
        }
    );
    let api_client = ApiClient::new(reqwest::Client::new(), &config, session);

    /* Load tutors and narrow them down */
    let mut listing = run(api_client, &args, &config).await?;
    if let ListingState::Failed(message) = listing.state() {
        return Err(message.clone().into());
    }

    let page = listing.page();
    info!(
        "Showing page {} of {} ({} tutors in total)",
        page.page, page.total_pages, page.total_results
    );
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
