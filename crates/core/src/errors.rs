use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("No LMS credential linked")]
    NotLinked,

    #[error("LMS credential expired or was rejected")]
    AuthExpired,

    #[error("LMS unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Store failure: {0}")]
    StoreFailure(#[from] eyre::Report),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl BotError {
    /// One-line, user-facing guidance for this error.
    pub fn user_message(&self) -> String {
        match self {
            BotError::NotLinked => {
                "You haven't linked your Canvas account yet. Run /setup first.".to_string()
            }
            BotError::AuthExpired => "Your Canvas token has expired or is invalid. Run /setup to add a new one (your notes, todos, etc. will be kept).".to_string(),
            BotError::RemoteUnavailable(_) => {
                "Canvas is not responding right now. Please try again in a few minutes.".to_string()
            }
            BotError::Validation(msg) => msg.clone(),
            BotError::NotFound(what) => format!("{} not found.", what),
            BotError::StoreFailure(_) | BotError::Crypto(_) => {
                "Something went wrong. Please try again or type /help.".to_string()
            }
        }
    }

    /// Whether the user can fix this by acting on the message.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            BotError::NotLinked | BotError::AuthExpired | BotError::Validation(_) | BotError::NotFound(_)
        )
    }
}

pub type BotResult<T> = Result<T, BotError>;
