use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Chat-platform user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// SQLite has no unsigned 64-bit column type, so ids are stored bit-cast.
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }

    pub fn from_i64(raw: i64) -> Self {
        UserId(raw as u64)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decrypted LMS API token. Only ever held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherScheme {
    Fernet,
    Envelope,
}

impl CipherScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            CipherScheme::Fernet => "fernet",
            CipherScheme::Envelope => "envelope",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "fernet" => Some(CipherScheme::Fernet),
            "envelope" => Some(CipherScheme::Envelope),
            _ => None,
        }
    }
}

/// Ciphertext plus the tag of the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    pub scheme: CipherScheme,
    pub ciphertext: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Valid,
    Invalid,
}

/// A user's credential in decrypted, in-memory form.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: UserId,
    pub token: AccessToken,
    pub scheme: CipherScheme,
    pub status: CredentialStatus,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_valid(&self) -> bool {
        self.status == CredentialStatus::Valid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Daily reminder preference. `hour` is local (UTC+8) civic time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSetting {
    pub user_id: UserId,
    pub hour: u8,
    pub enabled: bool,
    pub last_fired_on: Option<NaiveDate>,
}

pub const DEFAULT_REMINDER_HOUR: u8 = 9;
