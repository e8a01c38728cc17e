use bookit_engine::{
    config::{self, database},
    core::{catalog, promo},
    errors::Result,
};
use dotenvy::dotenv;
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

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let db_settings = app_config.database.clone().with_env_override();

    // 4. Connect and create tables
    let db = database::create_connection(&db_settings)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog on first start
    let seeded = catalog::seed_catalog(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Report what callers can book against
    let promo_codes = promo::list_active_promo_codes(&db).await?;
    info!(
        experiences_seeded = seeded.experiences,
        slots_seeded = seeded.slots,
        active_promo_codes = promo_codes.len(),
        reference_prefix = %app_config.booking.reference_prefix,
        "Booking engine ready"
    );
    for code in &promo_codes {
        info!(
            code = %code.code,
            discount_type = ?code.discount_type,
            value = %code.discount_value,
            valid_until = %code.valid_until,
            "Active promo code"
        );
    }

    db.close().await?;
    Ok(())
}
