use std::{env, sync::Arc, time::Duration};

use duebot_canvas::normalize_base_url;
use duebot_core::crypto::{Keyring, LocalKeyWrapper};
use eyre::{Result, WrapErr, eyre};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://duebot.db";
pub const DEFAULT_CANVAS_BASE_URL: &str = "https://canvas.nus.edu.sg";

/// Settings for the storage layer and the Canvas connection.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub canvas_base_url: String,
    pub fernet_key: String,
    /// Base64 master key; enables the envelope scheme for new credentials
    pub envelope_master_key: Option<String>,
    pub reminder_tick: Duration,
    pub remote_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let canvas_base_url = normalize_base_url(
            &env::var("CANVAS_BASE_URL").unwrap_or_else(|_| DEFAULT_CANVAS_BASE_URL.to_string()),
        )?;

        let fernet_key = env::var("FERNET_KEY")
            .map_err(|_| eyre!("FERNET_KEY environment variable not set"))?;
        let envelope_master_key = env::var("ENVELOPE_MASTER_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let reminder_tick = seconds("REMINDER_TICK_SECONDS", 60)?;
        let remote_timeout = seconds("REMOTE_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            database_url,
            canvas_base_url,
            fernet_key,
            envelope_master_key,
            reminder_tick,
            remote_timeout,
        })
    }

    /// Ciphers for this process. Fails on a malformed key so a bad deploy
    /// stops before it writes anything.
    pub fn keyring(&self) -> Result<Keyring> {
        let keyring = Keyring::new(&self.fernet_key).wrap_err("Invalid FERNET_KEY")?;
        match &self.envelope_master_key {
            Some(master) => {
                let wrapper =
                    LocalKeyWrapper::from_base64(master).wrap_err("Invalid ENVELOPE_MASTER_KEY")?;
                Ok(keyring.with_envelope(Arc::new(wrapper)))
            }
            None => Ok(keyring),
        }
    }
}

fn seconds(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .wrap_err_with(|| format!("Invalid {name} value"))?;
            if secs == 0 {
                return Err(eyre!("{name} must be greater than zero"));
            }
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
