use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use duebot::config::AppConfig;
use duebot_api::{ApiState, config::{ApiConfig, parse_log_level}};
use duebot_canvas::CanvasClient;
use duebot_core::{
    aggregator::Aggregator,
    course_cache::CourseCache,
    link::{LinkTokens, Linker},
    overlay::Overlay,
    scheduler::ReminderScheduler,
    time::SystemClock,
};
use duebot_db::{SqlStore, create_pool, schema::initialize_database};
use duebot_discord_bot::{
    config::BotConfig, notifier::DiscordNotifier, services::BotServices, start_bot,
};
use serenity::http::Http;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging
    let level = parse_log_level(&std::env::var("LOG_LEVEL").unwrap_or_default());
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting duebot");

    // Load configuration
    let app_config = AppConfig::from_env()?;
    let api_config = ApiConfig::from_env()?;
    let bot_config = BotConfig::from_env()?;

    // Storage
    let pool = create_pool(&app_config.database_url).await?;
    initialize_database(&pool).await?;
    let store = Arc::new(SqlStore::new(pool, app_config.keyring()?));

    // Core services
    let clock = Arc::new(SystemClock);
    let lms = Arc::new(CanvasClient::new(
        app_config.canvas_base_url.clone(),
        app_config.remote_timeout,
    )?);
    let cache = Arc::new(CourseCache::new(lms.clone()));
    let aggregator = Arc::new(Aggregator::new(
        lms.clone(),
        store.clone(),
        cache.clone(),
        clock.clone(),
    ));
    let notifier = Arc::new(DiscordNotifier::new(Arc::new(Http::new(&bot_config.token))));
    let link_tokens = Arc::new(LinkTokens::new(clock.clone()));
    let linker = Arc::new(Linker::new(
        lms,
        store.clone(),
        store.clone(),
        store.clone(),
        cache.clone(),
        notifier.clone(),
    ));

    // Reminder scheduler
    let scheduler = Arc::new(ReminderScheduler::new(
        aggregator.clone(),
        store.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    tokio::spawn(scheduler.run(app_config.reminder_tick));

    // Link web server
    let api_state = Arc::new(ApiState {
        link_tokens: link_tokens.clone(),
        linker: linker.clone(),
    });
    tokio::spawn(async move {
        if let Err(err) = duebot_api::start_server(api_config, api_state).await {
            error!("Link server stopped: {:?}", err);
        }
    });

    // Discord bot runs in the foreground
    let services = Arc::new(BotServices {
        aggregator,
        overlay: Arc::new(Overlay::new(store.clone())),
        linker,
        link_tokens,
        cache,
        reminders: store.clone(),
        users: store,
        notifier,
        clock,
    });
    start_bot(bot_config, services).await?;

    Ok(())
}
