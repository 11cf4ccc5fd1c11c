use std::f64::consts::PI;

use approx::assert_relative_eq;
use brep_kernel::{KernelIntrospect, MockKernel};
use gridfinity_engine::preferences::{PreferenceKey, PreferenceValue};
use gridfinity_engine::{
    Document, EngineError, GridfinityObject, ObjectKind, PreferenceStore, Severity,
};
use gridfinity_types::{Category, LayoutMatrix, Param, ParamValue, SchemaVersion};
use uuid::Uuid;

fn setup() -> (Document, MockKernel, PreferenceStore) {
    (Document::new("test"), MockKernel::new(), PreferenceStore::factory())
}

/// Object added with the lip switched off, then built.
fn lipless(doc: &mut Document, k: &mut MockKernel, prefs: &PreferenceStore, kind: ObjectKind) -> Uuid {
    let id = doc.add_object(kind, prefs).unwrap();
    doc.set_parameter(id, "StackingLip", ParamValue::Bool(false), k).unwrap();
    id
}

fn volume(doc: &Document, k: &MockKernel, id: Uuid) -> f64 {
    let shape = doc.object(id).unwrap().shape.unwrap();
    k.volume(&shape).unwrap()
}

// ── Every kind ─────────────────────────────────────────────────────────────

#[test]
fn every_kind_builds_with_factory_preferences() {
    let (mut doc, mut k, prefs) = setup();
    for kind in ObjectKind::ALL {
        let id = doc
            .create_object(kind, &prefs, &mut k)
            .unwrap_or_else(|e| panic!("{kind:?}: {e}"));
        assert!(volume(&doc, &k, id) > 0.0, "{kind:?}");
        assert!(doc.object(id).unwrap().diagnostics.is_empty(), "{kind:?}");
    }
    assert_eq!(doc.objects().len(), ObjectKind::ALL.len());
}

// ── Reference parameters ───────────────────────────────────────────────────

#[test]
fn reference_widths_and_heights() {
    let (mut doc, mut k, prefs) = setup();
    let id = doc.create_object(ObjectKind::SimpleStorageBin, &prefs, &mut k).unwrap();
    let p = &doc.object(id).unwrap().params;
    assert_relative_eq!(p.number("xTotalWidth").unwrap(), 2.0 * 42.0 - 0.5);
    assert_relative_eq!(p.number("TotalHeight").unwrap(), 42.0);
    assert_relative_eq!(
        p.number("UsableHeight").unwrap() + p.number("HeightUnitValue").unwrap(),
        p.number("TotalHeight").unwrap()
    );
    assert_relative_eq!(p.number("BaseProfileHeight").unwrap(), 4.75, epsilon = 1e-12);
    assert_eq!(p.integer("xMaxGrids").unwrap(), 2);
}

#[test]
fn non_standard_height_drives_total_height() {
    let (mut doc, mut k, prefs) = setup();
    let id = lipless(&mut doc, &mut k, &prefs, ObjectKind::BinBlank);
    doc.set_parameter(id, "NonStandardHeight", ParamValue::Bool(true), &mut k).unwrap();
    doc.set_expression(id, "CustomHeight", "HeightUnitValue * 4", &mut k).unwrap();

    let obj = doc.object(id).unwrap();
    assert_relative_eq!(obj.params.number("TotalHeight").unwrap(), 28.0);
    let bb = k.bounding_box(&obj.shape.unwrap()).unwrap();
    assert_relative_eq!(bb.max[2], 28.0, epsilon = 1e-9);
}

#[test]
fn reference_parameters_are_read_only() {
    let (mut doc, mut k, prefs) = setup();
    let id = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap();
    let err = doc
        .set_parameter(id, "xTotalWidth", ParamValue::Length(10.0), &mut k)
        .unwrap_err();
    assert!(matches!(err, EngineError::Parameter(_)));
}

// ── Equivalences ───────────────────────────────────────────────────────────

#[test]
fn hole_parity() {
    let (mut doc, mut k, prefs) = setup();
    let id = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap();
    let without = volume(&doc, &k, id);
    doc.set_parameter(id, "MagnetHoles", ParamValue::Bool(true), &mut k).unwrap();
    let with = volume(&doc, &k, id);

    let (d, depth, cells) = (6.5, 2.4, 4.0);
    let expected = 4.0 * PI * (d / 2.0) * (d / 2.0) * depth * cells;
    assert_relative_eq!(without - with, expected, epsilon = 1e-6);
}

#[test]
fn custom_two_by_two_matches_blank() {
    let (mut doc, mut k, prefs) = setup();
    let blank = lipless(&mut doc, &mut k, &prefs, ObjectKind::BinBlank);
    let custom = lipless(&mut doc, &mut k, &prefs, ObjectKind::CustomBin);

    assert_relative_eq!(volume(&doc, &k, blank), volume(&doc, &k, custom), epsilon = 1e-6);
    let a = k.center_of_gravity(&doc.object(blank).unwrap().shape.unwrap()).unwrap();
    let b = k.center_of_gravity(&doc.object(custom).unwrap().shape.unwrap()).unwrap();
    for i in 0..3 {
        assert_relative_eq!(a[i], b[i], epsilon = 1e-6);
    }
}

#[test]
fn l_bin_matches_custom_l() {
    let (mut doc, mut k, prefs) = setup();
    let l = lipless(&mut doc, &mut k, &prefs, ObjectKind::LBinBlank);
    let custom = lipless(&mut doc, &mut k, &prefs, ObjectKind::CustomBin);
    let layout = LayoutMatrix::from_columns(vec![
        vec![true, true],
        vec![true, false],
        vec![true, false],
    ])
    .unwrap();
    doc.set_parameter(custom, "Layout", ParamValue::Layout(layout), &mut k)
        .unwrap();

    assert_relative_eq!(volume(&doc, &k, l), volume(&doc, &k, custom), epsilon = 1e-6);
    let p = &doc.object(custom).unwrap().params;
    assert_eq!(p.integer("xMaxGrids").unwrap(), 3);
    assert_eq!(p.integer("yMaxGrids").unwrap(), 2);
}

// ── Placement ──────────────────────────────────────────────────────────────

#[test]
fn placement_positive_and_centered() {
    let (mut doc, mut k, prefs) = setup();
    let id = lipless(&mut doc, &mut k, &prefs, ObjectKind::BinBlank);
    let cog = k.center_of_gravity(&doc.object(id).unwrap().shape.unwrap()).unwrap();
    assert_relative_eq!(cog[0], 42.0, epsilon = 1e-6);
    assert_relative_eq!(cog[1], 42.0, epsilon = 1e-6);

    let centered = ParamValue::enumeration("Centered at Origin", &[]);
    doc.set_parameter(id, "GenerationLocation", centered, &mut k).unwrap();
    let cog = k.center_of_gravity(&doc.object(id).unwrap().shape.unwrap()).unwrap();
    assert_relative_eq!(cog[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(cog[1], 0.0, epsilon = 1e-6);
}

// ── Diagnostics ────────────────────────────────────────────────────────────

#[test]
fn fractional_grid_units_record_invalid_geometry() {
    let (mut doc, mut k, prefs) = setup();
    let id = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap();
    let err = doc
        .set_parameter(id, "xGridUnits", ParamValue::Float(1.5), &mut k)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidGeometry { .. }));

    let obj = doc.object(id).unwrap();
    assert!(obj.shape.is_none());
    assert!(obj.has_errors());
}

#[test]
fn unknown_magnet_shape_is_recorded() {
    let (mut doc, mut k, prefs) = setup();
    let mut obj = GridfinityObject::new(ObjectKind::BinBlank, &prefs).unwrap();
    obj.params.set("MagnetHoles", ParamValue::Bool(true)).unwrap();
    obj.params.remove_property("MagnetHolesShape");
    obj.params.add_property(
        "MagnetHolesShape",
        Param::new(
            ParamValue::enumeration("Triangle", &["Triangle"]),
            Category::Gridfinity,
            "",
        ),
    );
    let id = doc.insert_object(obj);

    let err = doc.recompute(id, &mut k).unwrap_err();
    assert!(matches!(err, EngineError::UnknownEnumValue { ref value, .. } if value == "Triangle"));
    let diag = &doc.object(id).unwrap().diagnostics;
    assert_eq!(diag.len(), 1);
    assert_eq!(diag[0].severity, Severity::Error);
}

#[test]
fn cramped_scoop_is_skipped_with_warning() {
    let (mut doc, mut k, prefs) = setup();
    let id = doc.add_object(ObjectKind::PartsBin, &prefs).unwrap();
    assert!(doc.object(id).unwrap().params.flag("Scoop").unwrap());
    doc.set_parameter(id, "xDividers", ParamValue::Integer(1), &mut k).unwrap();
    doc.set_parameter(id, "xDividerHeight", ParamValue::Length(7.5), &mut k)
        .unwrap();

    let obj = doc.object(id).unwrap();
    assert!(obj.shape.is_some());
    assert_eq!(obj.diagnostics.len(), 1);
    assert_eq!(obj.diagnostics[0].severity, Severity::Warning);
    assert!(!obj.has_errors());
}

#[test]
fn unknown_object_is_reported() {
    let (mut doc, mut k, _) = setup();
    let id = Uuid::new_v4();
    assert!(matches!(
        doc.recompute(id, &mut k),
        Err(EngineError::ObjectNotFound { id: missing }) if missing == id
    ));
}

// ── Preferences ────────────────────────────────────────────────────────────

#[test]
fn missing_preference_aborts_creation() {
    let (mut doc, mut k, mut prefs) = setup();
    prefs.unset(PreferenceKey::Clearance);
    let err = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap_err();
    assert!(matches!(err, EngineError::MissingPreference { .. }));
    assert!(doc.objects().is_empty());
}

#[test]
fn preferences_seed_new_objects() {
    let (mut doc, mut k, mut prefs) = setup();
    prefs.set(PreferenceKey::GridSizeX, PreferenceValue::Number(40.0));
    prefs.set(PreferenceKey::GridUnitsX, PreferenceValue::Number(3.0));
    let id = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap();
    let p = &doc.object(id).unwrap().params;
    assert_relative_eq!(p.number("xTotalWidth").unwrap(), 3.0 * 40.0 - 0.5);
    assert_relative_eq!(p.number("yGridSize").unwrap(), 40.0);
}

// ── Migration ──────────────────────────────────────────────────────────────

#[test]
fn legacy_object_is_migrated_on_recompute() {
    let (mut doc, mut k, prefs) = setup();
    let mut obj = GridfinityObject::new(ObjectKind::BinBlank, &prefs).unwrap();
    obj.version = SchemaVersion::new(&[0, 9, 0]);
    obj.params.remove_property("GenerationLocation");
    obj.params.rename_property("MagnetRemoveChannel", "MagnetRelief").unwrap();
    let id = doc.insert_object(obj);

    doc.recompute(id, &mut k).unwrap();
    let obj = doc.object(id).unwrap();
    assert_eq!(obj.version, SchemaVersion::new(&[0, 12, 0]));
    assert!(obj.params.has_property("GenerationLocation"));
    assert!(obj.params.has_property("MagnetRemoveChannel"));
}

#[test]
fn recompute_all_collects_failures() {
    let (mut doc, mut k, prefs) = setup();
    let good = doc.create_object(ObjectKind::Baseplate, &prefs, &mut k).unwrap();
    let bad = doc.create_object(ObjectKind::BinBlank, &prefs, &mut k).unwrap();
    let _ = doc.set_parameter(bad, "xGridUnits", ParamValue::Float(2.5), &mut k);

    let failures = doc.recompute_all(&mut k);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, bad);
    assert!(doc.object(good).unwrap().shape.is_some());
}
