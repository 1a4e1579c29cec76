use super::*;

#[test]
fn classifies_status_errors_by_code() {
    let unauthorized = ClientError::status(401, ApiError::from_status(401, ""));
    assert_eq!(unauthorized.category(), ErrorCategory::Auth);
    assert!(unauthorized.requires_reauth());

    let missing = ClientError::status(404, ApiError::from_status(404, "no such person"));
    assert_eq!(missing.category(), ErrorCategory::NotFound);
    assert!(!missing.requires_reauth());

    let invalid = ClientError::status(422, ApiError::new(ErrorCode::Validation, "bad sort"));
    assert_eq!(invalid.category(), ErrorCategory::Validation);
}

#[test]
fn unsupported_relation_names_list_and_master() {
    let err = ClientError::UnsupportedRelation {
        list: "publications",
        via: Master::Quotations,
    };
    assert_eq!(err.to_string(), "publications cannot be related to QUOTATIONS");
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[test]
fn malformed_base_url_is_a_validation_error() {
    let err = ClientError::from(url::Url::parse("climate.test").expect_err("relative"));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(!err.requires_reauth());
}
