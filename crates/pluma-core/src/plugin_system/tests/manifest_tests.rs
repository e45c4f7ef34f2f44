use std::path::Path;

use crate::plugin_system::manifest::{DefaultGrant, ManifestBuilder, PluginManifest};
use crate::plugin_system::version::ApiVersion;

fn parse(content: &str) -> Result<PluginManifest, crate::plugin_system::error::PluginSystemError> {
    PluginManifest::parse(content, Path::new("plugin.yml"))
}

#[test]
fn parses_minimal_manifest() {
    let manifest = parse(
        "name: Echo\nversion: 1.0.0\nmain: unit.echo\n",
    )
    .unwrap();
    assert_eq!(manifest.name, "Echo");
    assert_eq!(manifest.version, "1.0.0");
    assert_eq!(manifest.main, "unit.echo");
    assert!(manifest.api.is_empty());
    assert!(manifest.depend.is_empty());
    assert!(manifest.permissions.is_empty());
    assert_eq!(manifest.full_name(), "Echo v1.0.0");
}

#[test]
fn parses_dependencies_and_permissions() {
    let manifest = parse(
        r#"
name: Worldgen
version: 2.1.0
main: unit.worldgen
api: [">=0.1.0, <1.0.0"]
depend: [Core]
softdepend: [Mapper]
loadbefore: [Exporter]
permissions:
  always: [worldgen.view]
  operator: [worldgen.reset]
  not-operator: [worldgen.request]
"#,
    )
    .unwrap();
    assert_eq!(manifest.depend, vec!["Core"]);
    assert_eq!(manifest.softdepend, vec!["Mapper"]);
    assert_eq!(manifest.loadbefore, vec!["Exporter"]);

    let perms: Vec<_> = manifest.permissions.iter().collect();
    assert_eq!(perms.len(), 3);
    assert!(perms.contains(&(DefaultGrant::Always, "worldgen.view")));
    assert!(perms.contains(&(DefaultGrant::Operator, "worldgen.reset")));
    assert!(perms.contains(&(DefaultGrant::NotOperator, "worldgen.request")));
}

#[test]
fn rejects_empty_name() {
    assert!(parse("name: \"\"\nversion: 1.0.0\nmain: unit.x\n").is_err());
}

#[test]
fn rejects_missing_required_fields() {
    assert!(parse("name: NoMain\nversion: 1.0.0\n").is_err());
}

#[test]
fn rejects_bad_api_constraint() {
    assert!(parse("name: X\nversion: 1.0.0\nmain: unit.x\napi: [\">>nope\"]\n").is_err());
}

#[test]
fn api_check_passes_when_constraints_absent() {
    let manifest = ManifestBuilder::new("X", "1.0.0", "unit.x").build();
    let host: ApiVersion = "0.1.0".parse().unwrap();
    assert!(manifest.api_incompatibility(&host).is_none());
}

#[test]
fn api_check_accepts_any_matching_constraint() {
    let manifest = parse(
        "name: X\nversion: 1.0.0\nmain: unit.x\napi: [\">=9.0.0\", \"^0.1\"]\n",
    )
    .unwrap();
    let host: ApiVersion = "0.1.0".parse().unwrap();
    assert!(manifest.api_incompatibility(&host).is_none());
}

#[test]
fn api_check_reports_offending_constraints() {
    let manifest =
        parse("name: X\nversion: 1.0.0\nmain: unit.x\napi: [\">=9.0.0\"]\n").unwrap();
    let host: ApiVersion = "0.1.0".parse().unwrap();
    let required = manifest.api_incompatibility(&host).unwrap();
    assert!(required.contains(">=9.0.0"));
}
