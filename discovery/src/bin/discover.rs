//! List restaurants and cafes near a position, optionally reviewing the
//! nearest one.
//!
//! Places come from the configured Overpass endpoint; reviews live in an
//! in-memory store for the lifetime of the process.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use discovery::config::DiscoverySettings;
use discovery::domain::ports::{PhotoLibrary, PositionProvider};
use discovery::domain::{
    CategoryFilter, Coordinates, MapRegion, Place, PlaceCatalog, PlaceCatalogPorts, PhotoHandle,
    Rating, ReviewDraft, ReviewLedger, ReviewLedgerPorts,
};
use discovery::outbound::identity::FileBackedIdentity;
use discovery::outbound::memory::{FixedPositionProvider, InMemoryPhotoStore, InMemoryReviewStore};
use discovery::outbound::notifications::TracingReviewNotifier;
use discovery::outbound::overpass::OverpassHttpSource;
use discovery::outbound::photos::FilePhotoLibrary;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `discover` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "discover",
    about = "List nearby restaurants and cafes ordered by distance",
    version
)]
struct CliArgs {
    /// Latitude of the search centre.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude of the search centre.
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Case-insensitive search over name, address, and cuisine.
    #[arg(long, default_value = "")]
    search: String,
    /// Category filter: all, restaurant, or cafe.
    #[arg(long, default_value_t = CategoryFilter::All)]
    category: CategoryFilter,
    /// Submit a review of the nearest visible place with this comment.
    #[arg(long = "review-nearest", value_name = "comment")]
    review_comment: Option<String>,
    /// Stars for `--review-nearest`.
    #[arg(long, default_value_t = 5, value_parser = parse_rating)]
    rating: u8,
    /// Photo to attach, relative to `--photo-dir`.
    #[arg(long, value_name = "file", requires = "review_comment")]
    photo: Option<String>,
    /// Directory photos are read from.
    #[arg(long = "photo-dir", value_name = "path", default_value = ".")]
    photo_dir: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = load_settings()?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args, settings))
}

/// Settings come from `DISCOVERY_*` variables and configuration files only.
fn load_settings() -> Result<DiscoverySettings> {
    DiscoverySettings::load_from_iter([OsString::from("discover")])
        .map_err(|error| eyre!("load settings: {error}"))
}

async fn run(args: CliArgs, settings: DiscoverySettings) -> Result<()> {
    let position =
        Coordinates::new(args.lat, args.lon).wrap_err("--lat/--lon must be a valid position")?;
    let clock = Arc::new(DefaultClock);
    let review_store = Arc::new(InMemoryReviewStore::new(clock.clone()));
    let poi_source = OverpassHttpSource::new(
        settings.overpass_endpoint()?,
        settings.request_timeout(),
        settings.overpass_identity(),
    )
    .wrap_err("build Overpass client")?;
    let position_provider: Arc<dyn PositionProvider> =
        Arc::new(FixedPositionProvider::new(position));

    let catalog = PlaceCatalog::new(
        PlaceCatalogPorts {
            position: position_provider,
            poi_source: Arc::new(poi_source),
            review_store: review_store.clone(),
        },
        settings.catalog_config(),
    );
    catalog.set_search_term(args.search.as_str());
    catalog.set_category_filter(args.category);
    catalog.reload().await.wrap_err("discovery failed")?;

    let visible = catalog.visible_places();
    print_places(&visible);

    let Some(comment) = args.review_comment else {
        return Ok(());
    };
    let Some(nearest) = visible.first() else {
        return Err(eyre!("no visible place to review"));
    };

    let photo_library: Arc<dyn PhotoLibrary> = Arc::new(
        FilePhotoLibrary::open(&args.photo_dir)
            .wrap_err_with(|| format!("open photo dir {}", args.photo_dir.display()))?,
    );
    let ledger = ReviewLedger::new(
        ReviewLedgerPorts {
            store: review_store,
            photo_library,
            photo_store: Arc::new(InMemoryPhotoStore::new()),
            identity: Arc::new(FileBackedIdentity::new(settings.identity_dir())),
            notifier: Arc::new(TracingReviewNotifier),
        },
        clock,
    );

    let mut draft = ReviewDraft::new(Rating::new(args.rating)?, comment);
    if let Some(photo) = args.photo {
        draft = draft.with_photo(PhotoHandle::new(photo));
    }
    let review_id = ledger
        .submit_review(&nearest.id, &draft)
        .await
        .wrap_err_with(|| format!("review of {} failed", nearest.name))?;
    println!("review_id={review_id}");

    for review in ledger.list_reviews(&nearest.id).await? {
        println!(
            "{} ★{} {}{}",
            review.id,
            review.rating,
            review.comment,
            review
                .image_url
                .map(|url| format!(" [{url}]"))
                .unwrap_or_default()
        );
    }

    catalog.reload().await.wrap_err("refresh after review failed")?;
    let refreshed = catalog.visible_places();
    if let Some(place) = refreshed.iter().find(|place| place.id == nearest.id) {
        print_places(std::slice::from_ref(place));
    }
    Ok(())
}

fn print_places(places: &[Place]) {
    if let Some(region) = MapRegion::around_nearest(places) {
        println!(
            "map_center={} span={}x{}",
            region.center, region.latitude_delta, region.longitude_delta
        );
    }
    for place in places {
        let mut details = vec![place.distance_label()];
        if let Some(cuisine) = place.cuisine_label() {
            details.push(cuisine);
        }
        if !place.address.is_empty() {
            details.push(place.address.clone());
        }
        details.push(place.rating_label().unwrap_or_else(|| "no reviews".to_owned()));
        println!("{} [{}] {}", place.name, place.id, details.join(" | "));
    }
}

fn parse_rating(raw: &str) -> Result<u8, String> {
    let stars = raw
        .parse::<u8>()
        .map_err(|error| format!("rating must be a number: {error}"))?;
    Rating::new(stars)
        .map(Rating::stars)
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Ok(1))]
    #[case("5", Ok(5))]
    fn rating_parser_accepts_valid_stars(#[case] raw: &str, #[case] expected: Result<u8, String>) {
        assert_eq!(parse_rating(raw), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("6")]
    #[case("five")]
    fn rating_parser_rejects_invalid_stars(#[case] raw: &str) {
        assert!(parse_rating(raw).is_err());
    }

    #[test]
    fn cli_accepts_negative_coordinates_and_filters() {
        let args = CliArgs::try_parse_from([
            "discover",
            "--lat",
            "-33.86",
            "--lon",
            "151.2",
            "--category",
            "cafe",
        ])
        .expect("arguments parse");
        assert_eq!(args.lat, -33.86);
        assert_eq!(args.category, CategoryFilter::Cafe);
        assert!(args.review_comment.is_none());
    }

    #[test]
    fn photo_requires_a_review() {
        let result = CliArgs::try_parse_from([
            "discover", "--lat", "60.17", "--lon", "24.94", "--photo", "a.jpg",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn settings_load_with_an_empty_environment() {
        let _guard = lock_env(
            [
                "DISCOVERY_OVERPASS_ENDPOINT",
                "DISCOVERY_SEARCH_RADIUS_METERS",
                "DISCOVERY_REQUEST_TIMEOUT_SECONDS",
                "DISCOVERY_OVERPASS_USER_AGENT",
                "DISCOVERY_OVERPASS_QUERY_TIMEOUT_SECONDS",
                "DISCOVERY_RATING_QUERY_TIMEOUT_SECONDS",
                "DISCOVERY_MAX_CONCURRENT_RATING_QUERIES",
                "DISCOVERY_IDENTITY_DIR",
            ]
            .map(|name| (name, None::<String>)),
        );

        let settings = load_settings().expect("settings load without any variables");

        assert_eq!(settings.search_radius().meters(), 10_000);
        assert!(settings.overpass_endpoint().is_ok());
    }
}
