//! Tests for core_kernel error types

use core_kernel::{AccountId, ClaimId, CoreError, PortError, TargetId};

#[test]
fn test_malformed_id_names_the_kind() {
    let error = "CLM-nope".parse::<ClaimId>().unwrap_err();

    assert_eq!(error, CoreError::malformed_id("ClaimId", "CLM-nope"));
    assert_eq!(error.to_string(), "Malformed ClaimId 'CLM-nope'");
}

#[test]
fn test_wrong_prefix_is_malformed() {
    let claim = ClaimId::new().to_string();

    assert!(matches!(
        claim.parse::<AccountId>(),
        Err(CoreError::MalformedId { kind: "AccountId", .. })
    ));
}

#[test]
fn test_blank_target_id() {
    assert_eq!(TargetId::new("\t \n"), Err(CoreError::BlankTargetId));
}

#[test]
fn test_port_error_classification() {
    assert!(PortError::connection("refused").is_transient());
    assert!(PortError::ServiceUnavailable { service: "places".to_string() }.is_transient());
    assert!(!PortError::validation("bad").is_transient());
    assert!(!PortError::internal("boom").is_transient());
    assert!(PortError::not_found("Account", "ACC-1").is_not_found());
}
