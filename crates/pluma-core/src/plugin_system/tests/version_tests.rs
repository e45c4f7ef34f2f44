use crate::plugin_system::version::{ApiVersion, VersionRange};

#[test]
fn api_version_parses_three_components() {
    let v: ApiVersion = "1.2.3".parse().unwrap();
    assert_eq!(v.major, 1);
    assert_eq!(v.minor, 2);
    assert_eq!(v.patch, 3);
    assert_eq!(v.to_string(), "1.2.3");
}

#[test]
fn api_version_rejects_garbage() {
    assert!("".parse::<ApiVersion>().is_err());
    assert!("1.2".parse::<ApiVersion>().is_err());
    assert!("a.b.c".parse::<ApiVersion>().is_err());
    assert!("1.2.3.4".parse::<ApiVersion>().is_err());
}

#[test]
fn range_includes_matching_versions() {
    let range = VersionRange::from_constraint(">=1.0.0, <2.0.0").unwrap();
    let v1: ApiVersion = "1.5.0".parse().unwrap();
    let v2: ApiVersion = "2.0.0".parse().unwrap();
    assert!(range.includes(&v1.as_semver()));
    assert!(!range.includes(&v2.as_semver()));
}

#[test]
fn range_keeps_original_constraint_text() {
    let range = VersionRange::from_constraint("^0.1").unwrap();
    assert_eq!(range.constraint_string(), "^0.1");
}

#[test]
fn range_rejects_malformed_constraints() {
    assert!(VersionRange::from_constraint(">>nope").is_err());
}
