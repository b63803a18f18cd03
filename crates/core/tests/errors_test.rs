use std::error::Error;

use duebot_core::{
    errors::{BotError, BotResult},
    lms::LmsError,
};
use pretty_assertions::assert_eq;

#[test]
fn test_bot_error_display() {
    assert_eq!(BotError::NotLinked.to_string(), "No LMS credential linked");
    assert_eq!(
        BotError::RemoteUnavailable("HTTP 502".to_string()).to_string(),
        "LMS unavailable: HTTP 502"
    );
    assert_eq!(
        BotError::Validation("Invalid hour".to_string()).to_string(),
        "Validation error: Invalid hour"
    );
    let store = BotError::StoreFailure(eyre::eyre!("disk full"));
    assert!(store.to_string().contains("Store failure:"));
}

#[test]
fn test_store_failure_from_report() {
    let err: BotError = eyre::eyre!("connection reset").into();
    assert!(matches!(err, BotError::StoreFailure(_)));
    assert!(err.source().is_some());
}

#[test]
fn test_user_messages_are_single_actionable_lines() {
    let errors = [
        BotError::NotLinked,
        BotError::AuthExpired,
        BotError::RemoteUnavailable("timeout".to_string()),
        BotError::StoreFailure(eyre::eyre!("locked")),
        BotError::Validation("Hour must be between 0 and 23.".to_string()),
        BotError::NotFound("Todo".to_string()),
        BotError::Crypto("bad key".to_string()),
    ];

    for err in &errors {
        let message = err.user_message();
        assert!(!message.is_empty());
        assert!(!message.contains('\n'), "multi-line message for {err:?}");
    }

    assert!(BotError::NotLinked.user_message().contains("/setup"));
    assert!(BotError::AuthExpired.user_message().contains("/setup"));
    assert_eq!(BotError::NotFound("Todo".to_string()).user_message(), "Todo not found.");
}

#[test]
fn test_internal_errors_do_not_leak_details() {
    let err = BotError::Crypto("Fernet token could not be decrypted".to_string());
    assert!(!err.user_message().contains("Fernet"));
    assert!(!err.is_user_correctable());
    assert!(BotError::AuthExpired.is_user_correctable());
}

#[test]
fn test_lms_error_conversion() {
    assert!(matches!(BotError::from(LmsError::AuthExpired), BotError::AuthExpired));
    assert!(matches!(
        BotError::from(LmsError::Unavailable("HTTP 503".to_string())),
        BotError::RemoteUnavailable(reason) if reason == "HTTP 503"
    ));
    assert!(matches!(
        BotError::from(LmsError::Unsupported("HTTP 404".to_string())),
        BotError::RemoteUnavailable(_)
    ));
}

#[test]
fn test_bot_result() {
    let result: BotResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BotResult<i32> = Err(BotError::NotLinked);
    assert!(result.is_err());
}
