use gridfinity_engine::ObjectKind;
use gridfinity_types::ParamValue;
use test_harness::scenarios::{scenario, REFERENCE_SCENARIOS};
use test_harness::{DocumentBuilder, HarnessError};

// ── Naming ─────────────────────────────────────────────────────────────────

#[test]
fn duplicate_names_rejected() {
    let mut m = DocumentBuilder::mock();
    m.create("bin", ObjectKind::BinBlank).unwrap();
    let err = m.create("bin", ObjectKind::EcoBin).unwrap_err();
    assert!(matches!(err, HarnessError::DuplicateName { .. }));
}

#[test]
fn unknown_name_rejected() {
    let m = DocumentBuilder::mock();
    assert!(matches!(m.volume("nope"), Err(HarnessError::ObjectNotFound { .. })));
}

#[test]
fn deleted_object_is_forgotten() {
    let mut m = DocumentBuilder::mock();
    m.create("a", ObjectKind::Baseplate).unwrap();
    m.create("b", ObjectKind::BinBase).unwrap();
    m.delete("a").unwrap();
    assert!(m.object("a").is_err());
    assert_eq!(m.recompute_all().unwrap().len(), 1);
}

// ── Failures ───────────────────────────────────────────────────────────────

#[test]
fn failed_rebuild_surfaces_as_dispatch_error() {
    let mut m = DocumentBuilder::mock();
    m.create("bin", ObjectKind::BinBlank).unwrap();
    let err = m.set("bin", "xGridUnits", ParamValue::Float(1.5)).unwrap_err();
    assert!(matches!(err, HarnessError::DispatchError { .. }));
    assert!(matches!(m.solid("bin"), Err(HarnessError::NoSolid { .. })));
    assert!(m.assert_no_diagnostics("bin").is_err());
}

#[test]
fn history_records_outcomes() {
    let mut m = DocumentBuilder::mock();
    m.create("bin", ObjectKind::BinBlank).unwrap();
    let _ = m.set("bin", "HeightUnits", ParamValue::Bool(true));
    let history = m.history();
    assert_eq!(history.len(), 3);
    assert!(history[0].0.contains("OpenDocument"));
    assert_eq!(history[1].1, "ok");
    assert!(history[2].1.starts_with("error"));
}

// ── Scenario table ─────────────────────────────────────────────────────────

#[test]
fn scenario_table_is_complete() {
    assert_eq!(REFERENCE_SCENARIOS.len(), 8);
    assert!(REFERENCE_SCENARIOS.iter().all(|s| s.volume > 0.0));
    let recessed = scenario("bin_blank_recessed").unwrap();
    assert_eq!(recessed.kind, ObjectKind::BinBlank);
    assert!(recessed.tweaks.iter().any(|t| t.name() == "RecessedTopDepth"));
    assert!(scenario("nope").is_none());
}
