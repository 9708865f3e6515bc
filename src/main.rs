use dotenvy::dotenv;
use showtime_booking::{
    config::{self, catalog::seed_catalog},
    core::{catalog::Catalog, show::ShowService},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal: env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load booking settings and the seed catalog
    let app_config = config::settings::load_default_config()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;
    info!(booking = ?app_config.booking, "Loaded booking settings");

    // 4. Connect and make sure the schema exists
    let database_url = config::database::get_database_url();
    if database_url == config::database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = config::database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to {}: {}", database_url, e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed shows from config
    let shows = ShowService::new(db.clone(), app_config.booking.clone());
    let summary = seed_catalog(&shows, &app_config.shows)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    info!(
        created = summary.created,
        skipped = summary.skipped,
        "Catalog seeding finished"
    );

    // 6. Report what is bookable
    for details in Catalog::new(db).list_shows(None).await? {
        let open_seats: i64 = details
            .showtimes
            .iter()
            .map(|s| i64::from(s.available_seats))
            .sum();
        info!(
            show_id = details.show.id,
            showtimes = details.showtimes.len(),
            open_seats,
            "'{}' at {} for {} points",
            details.show.name,
            details.show.location,
            details.show.price
        );
    }

    Ok(())
}
