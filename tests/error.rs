use serde_json::Value;
use todo::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::Validation("task title is required".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    let err = Error::Aborted("declined".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::Api {
        status: 500,
        message: "boom".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    let err = Error::OperationFailed("could not delete any of 3 tasks".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn rate_limit_shows_server_detail() {
    let err = Error::RateLimited {
        detail: "Too many requests. IP blocked for 5 seconds.".to_string(),
        retry_after_secs: Some(5),
    };
    assert_eq!(
        err.to_string(),
        "Too many requests. IP blocked for 5 seconds."
    );
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);

    let details = err.details().expect("details");
    assert_eq!(details["status"], Value::from(429));
    assert_eq!(details["retry_after_secs"], Value::from(5));
}

#[test]
fn json_error_includes_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Invalid configuration"));
    let details = json.details.expect("details");
    assert_eq!(details["message"], Value::String("bad config".to_string()));
}
