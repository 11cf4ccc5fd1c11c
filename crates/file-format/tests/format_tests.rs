use approx::assert_relative_eq;
use brep_kernel::{KernelIntrospect, MockKernel};
use file_format::{load_document, save_document, DocumentMetadata, LoadError, FORMAT_ID};
use gridfinity_engine::migrate::current_version;
use gridfinity_engine::{Document, GridfinityObject, ObjectKind, PreferenceStore};
use gridfinity_types::{Category, Param, ParamType, ParamValue, SchemaVersion};

fn document_with(kinds: &[ObjectKind]) -> Document {
    let prefs = PreferenceStore::factory();
    let mut doc = Document::new("drawer");
    for &kind in kinds {
        doc.add_object(kind, &prefs).unwrap();
    }
    doc
}

fn round_trip(doc: &Document) -> (Document, DocumentMetadata) {
    let json = save_document(doc, &DocumentMetadata::new(doc.name.clone())).unwrap();
    load_document(&json).unwrap()
}

/// A bin as written before placement options and crush ribs existed.
fn legacy_bin() -> GridfinityObject {
    let mut obj = GridfinityObject::new(ObjectKind::SimpleStorageBin, &PreferenceStore::factory()).unwrap();
    obj.version = SchemaVersion::new(&[0, 9, 0]);
    let p = &mut obj.params;
    p.remove_property("GenerationLocation");
    p.rename_property("MagnetRemoveChannel", "MagnetRelief").unwrap();
    p.remove_property("CrushRibsCount");
    p.remove_property("CrushRibsWaviness");
    p.remove_property("MagnetHolesShape");
    p.remove_property("yGridUnits");
    p.add_property(
        "yGridUnits",
        Param::new(ParamValue::Integer(2), Category::Gridfinity, ""),
    );
    obj
}

// ── Round trip ─────────────────────────────────────────────────────────────

#[test]
fn round_trip_preserves_objects() {
    let doc = document_with(&[ObjectKind::BinBlank, ObjectKind::PartsBin, ObjectKind::Baseplate]);
    let (loaded, meta) = round_trip(&doc);

    assert_eq!(meta.name, "drawer");
    assert_eq!(loaded.name, "drawer");
    assert_eq!(loaded.objects().len(), 3);
    for (a, b) in doc.objects().iter().zip(loaded.objects()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.version, b.version);
        assert_eq!(a.params, b.params);
    }
}

#[test]
fn round_trip_preserves_edits_and_expressions() {
    let mut doc = document_with(&[ObjectKind::SimpleStorageBin]);
    let mut k = MockKernel::new();
    let id = doc.objects()[0].id;
    doc.set_parameter(id, "xDividers", ParamValue::Integer(2), &mut k).unwrap();
    doc.set_expression(id, "CustomHeight", "HeightUnitValue * 4", &mut k).unwrap();

    let (loaded, _) = round_trip(&doc);
    let obj = loaded.object(id).unwrap();
    assert_eq!(obj.params.integer("xDividers").unwrap(), 2);
    assert_eq!(obj.params.expression("CustomHeight"), Some("HeightUnitValue * 4"));
    assert_eq!(
        obj.params.expression("TotalHeight"),
        doc.object(id).unwrap().params.expression("TotalHeight")
    );
}

#[test]
fn metadata_timestamps_survive() {
    let doc = document_with(&[]);
    let meta = DocumentMetadata::new("empty");
    let json = save_document(&doc, &meta).unwrap();
    let (loaded, loaded_meta) = load_document(&json).unwrap();
    assert!(loaded.objects().is_empty());
    assert_eq!(loaded_meta, meta);
}

#[test]
fn touch_moves_modified_forward() {
    let mut meta = DocumentMetadata::new("m");
    let created = meta.created;
    meta.touch();
    assert!(meta.modified >= created);
    assert_eq!(meta.created, created);
}

// ── Geometry ───────────────────────────────────────────────────────────────

#[test]
fn geometry_is_not_persisted() {
    let mut doc = document_with(&[ObjectKind::BinBlank]);
    let mut k = MockKernel::new();
    assert!(doc.recompute_all(&mut k).is_empty());
    assert!(doc.objects()[0].shape.is_some());

    let json = save_document(&doc, &DocumentMetadata::new("d")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let stored = &value["objects"][0];
    assert!(stored.get("shape").is_none());
    assert!(stored.get("diagnostics").is_none());

    let (loaded, _) = load_document(&json).unwrap();
    assert!(loaded.objects()[0].shape.is_none());
}

#[test]
fn loaded_document_rebuilds_same_solid() {
    let mut doc = document_with(&[ObjectKind::SimpleStorageBin, ObjectKind::MagnetBaseplate]);
    let mut k = MockKernel::new();
    assert!(doc.recompute_all(&mut k).is_empty());
    let before: Vec<f64> = doc
        .objects()
        .iter()
        .map(|o| k.volume(&o.shape.unwrap()).unwrap())
        .collect();

    let (mut loaded, _) = round_trip(&doc);
    assert!(loaded.recompute_all(&mut k).is_empty());
    for (obj, v) in loaded.objects().iter().zip(before) {
        assert_relative_eq!(k.volume(&obj.shape.unwrap()).unwrap(), v, epsilon = 1e-6);
    }
}

// ── Header validation ──────────────────────────────────────────────────────

#[test]
fn file_carries_format_and_version() {
    let json = save_document(&document_with(&[]), &DocumentMetadata::new("d")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["format"], FORMAT_ID);
    assert_eq!(value["version"], current_version().to_string());
}

#[test]
fn unknown_format_rejected() {
    let json = save_document(&document_with(&[]), &DocumentMetadata::new("d")).unwrap();
    let json = json.replace("\"gridfinity\"", "\"mesh-project\"");
    match load_document(&json) {
        Err(LoadError::UnknownFormat(f)) => assert_eq!(f, "mesh-project"),
        other => panic!("expected UnknownFormat, got {other:?}"),
    }
}

#[test]
fn future_file_version_rejected() {
    let json = save_document(&document_with(&[]), &DocumentMetadata::new("d")).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["version"] = serde_json::json!("99.0.0");
    match load_document(&value.to_string()) {
        Err(LoadError::FutureVersion { file_version, supported_version }) => {
            assert_eq!(file_version, "99.0.0");
            assert_eq!(supported_version, current_version().to_string());
        }
        other => panic!("expected FutureVersion, got {other:?}"),
    }
}

#[test]
fn future_object_version_rejected() {
    let mut doc = document_with(&[]);
    let mut obj = GridfinityObject::new(ObjectKind::BinBlank, &PreferenceStore::factory()).unwrap();
    obj.version = SchemaVersion::new(&[1, 0]);
    doc.insert_object(obj);
    let json = save_document(&doc, &DocumentMetadata::new("d")).unwrap();
    assert!(matches!(load_document(&json), Err(LoadError::FutureVersion { .. })));
}

#[test]
fn malformed_json_is_parse_error() {
    assert!(matches!(load_document("{ not json"), Err(LoadError::ParseError(_))));
    assert!(matches!(
        load_document(r#"{"format": "gridfinity"}"#),
        Err(LoadError::ParseError(_))
    ));
}

// ── Migration ──────────────────────────────────────────────────────────────

#[test]
fn legacy_objects_migrate_on_load() {
    let mut doc = document_with(&[]);
    let id = doc.insert_object(legacy_bin());
    let json = save_document(&doc, &DocumentMetadata::new("old")).unwrap();

    let (loaded, _) = load_document(&json).unwrap();
    let obj = loaded.object(id).unwrap();
    assert_eq!(obj.version, current_version());
    let p = &obj.params;
    assert!(p.has_property("GenerationLocation"));
    assert!(p.has_property("MagnetRemoveChannel"));
    assert!(!p.has_property("MagnetRelief"));
    assert_eq!(p.selection("MagnetHolesShape").unwrap(), "Round");
    assert_eq!(p.property_type("yGridUnits"), Some(ParamType::Float));
    assert_eq!(p.number("yGridUnits").unwrap(), 2.0);
}

#[test]
fn migrated_legacy_bin_builds() {
    let mut doc = document_with(&[]);
    let id = doc.insert_object(legacy_bin());
    let json = save_document(&doc, &DocumentMetadata::new("old")).unwrap();
    let (mut loaded, _) = load_document(&json).unwrap();

    let mut k = MockKernel::new();
    let shape = loaded.recompute(id, &mut k).unwrap();
    let bb = k.bounding_box(&shape).unwrap();
    assert_relative_eq!(bb.max[1] - bb.min[1], 2.0 * 42.0 - 0.5, epsilon = 1e-6);
}
