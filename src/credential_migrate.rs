use color_eyre::eyre::{Result, bail};
use dotenv::dotenv;
use duebot::config::AppConfig;
use duebot_core::models::user::CipherScheme;
use duebot_db::{SqlStore, create_pool, schema::initialize_database};

/// Re-encrypts every Fernet-sealed credential under the envelope scheme.
/// Safe to run more than once; already migrated rows are skipped.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = AppConfig::from_env()?;
    if config.envelope_master_key.is_none() {
        bail!("ENVELOPE_MASTER_KEY must be set to migrate credentials");
    }

    println!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;
    initialize_database(&pool).await?;
    let store = SqlStore::new(pool, config.keyring()?);

    println!("Re-encrypting credentials...");
    let report = store
        .migrate_credentials(CipherScheme::Fernet, CipherScheme::Envelope)
        .await?;
    println!(
        "Migration finished: {} migrated, {} failed.",
        report.migrated, report.failed
    );

    if report.failed > 0 {
        bail!("{} credential(s) could not be re-encrypted", report.failed);
    }
    Ok(())
}
