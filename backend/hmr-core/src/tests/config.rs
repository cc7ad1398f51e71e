use crate::config::ClientOptions;
use crate::error::ConfigError;

#[test]
fn given_default_options_when_validated_then_ok() {
    let options = ClientOptions::default();

    assert_eq!(options.asset_prefix, "");
    assert!(options.validate().is_ok());
}

#[test]
fn given_absolute_prefix_when_validated_then_ok() {
    assert!(ClientOptions::new("/_next").validate().is_ok());
}

/// **VALUE**: Verifies that a trailing slash in the asset prefix is rejected.
///
/// **WHY THIS MATTERS**: The CSS chunk prefix is built as `"{assetPrefix}/"`. A trailing slash
/// yields `//`, which matches no link, and CSS hot reload silently stops working.
///
/// **BUG THIS CATCHES**: Would catch removal of the trailing-slash validation.
#[test]
fn given_trailing_slash_when_validated_then_returns_validation_error() {
    let result = ClientOptions::new("/_next/").validate();

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_relative_prefix_when_validated_then_returns_validation_error() {
    let result = ClientOptions::new("_next").validate();

    match result {
        Err(ConfigError::ValidationError { reason, .. }) => {
            assert!(reason.contains("start with '/'"), "Unexpected reason: {reason}");
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[test]
fn given_camel_case_json_when_deserialized_then_reads_asset_prefix() {
    let options: ClientOptions = serde_json::from_str(r#"{"assetPrefix":"/_next"}"#).unwrap();

    assert_eq!(options, ClientOptions::new("/_next"));
}

#[test]
fn given_empty_json_object_when_deserialized_then_uses_default_prefix() {
    let options: ClientOptions = serde_json::from_str("{}").unwrap();

    assert_eq!(options, ClientOptions::default());
}
