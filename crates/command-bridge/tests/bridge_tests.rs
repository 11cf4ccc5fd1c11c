use approx::assert_relative_eq;
use brep_kernel::MockKernel;
use command_bridge::*;
use gridfinity_engine::{ObjectKind, Severity};
use gridfinity_types::ParamValue;
use uuid::Uuid;

fn open_session() -> (Session, MockKernel) {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    let r = dispatch(
        &mut session,
        Command::OpenDocument {
            name: "drawer".to_string(),
        },
        &mut k,
    );
    assert!(matches!(r, Response::DocumentOpened { .. }));
    (session, k)
}

fn created(r: Response) -> ObjectSummary {
    match r {
        Response::ObjectCreated { object } => object,
        other => panic!("expected ObjectCreated, got {other:?}"),
    }
}

const CREATE_COMMANDS: [Command; 11] = [
    Command::CreateBinBlank,
    Command::CreateBinBase,
    Command::CreateSimpleStorageBin,
    Command::CreateEcoBin,
    Command::CreatePartsBin,
    Command::CreateBaseplate,
    Command::CreateMagnetBaseplate,
    Command::CreateScrewTogetherBaseplate,
    Command::CreateLBinBlank,
    Command::CreateCustomBin,
    Command::CreateCustomBaseplate,
];

// ── Command activity ───────────────────────────────────────────────────────

#[test]
fn create_commands_inactive_without_document() {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    for cmd in CREATE_COMMANDS {
        assert!(cmd.needs_document());
        match dispatch(&mut session, cmd, &mut k) {
            Response::Error { message, object_id } => {
                assert!(message.contains("no document"), "{message}");
                assert!(object_id.is_none());
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }
}

#[test]
fn every_create_command_builds_its_kind() {
    let (mut session, mut k) = open_session();
    for (cmd, kind) in CREATE_COMMANDS.into_iter().zip(ObjectKind::ALL) {
        assert_eq!(cmd.creates(), Some(kind));
        let object = created(dispatch(&mut session, cmd, &mut k));
        assert_eq!(object.kind, kind);
        assert_eq!(object.name, kind.label());
        assert!(object.volume.is_some_and(|v| v > 0.0), "{kind:?}");
    }
    assert_eq!(session.document().unwrap().objects().len(), 11);
}

#[test]
fn session_commands_do_not_create() {
    assert_eq!(Command::CloseDocument.creates(), None);
    assert!(!Command::OpenDocument { name: "x".into() }.needs_document());
    assert!(!Command::LoadDocument { data: String::new() }.needs_document());
}

// ── Editing ────────────────────────────────────────────────────────────────

#[test]
fn set_parameter_rebuilds_object() {
    let (mut session, mut k) = open_session();
    let bin = created(dispatch(&mut session, Command::CreateBinBlank, &mut k));

    let r = dispatch(
        &mut session,
        Command::SetParameter {
            object_id: bin.id,
            name: "xGridUnits".to_string(),
            value: ParamValue::Float(3.0),
        },
        &mut k,
    );
    let updated = match r {
        Response::ObjectUpdated { object } => object,
        other => panic!("expected ObjectUpdated, got {other:?}"),
    };
    assert_eq!(updated.id, bin.id);
    assert!(updated.volume.unwrap() > bin.volume.unwrap());
}

#[test]
fn invalid_value_reports_object() {
    let (mut session, mut k) = open_session();
    let bin = created(dispatch(&mut session, Command::CreatePartsBin, &mut k));
    let r = dispatch(
        &mut session,
        Command::SetParameter {
            object_id: bin.id,
            name: "xGridUnits".to_string(),
            value: ParamValue::Float(1.5),
        },
        &mut k,
    );
    match r {
        Response::Error { object_id, .. } => assert_eq!(object_id, Some(bin.id)),
        other => panic!("expected Error, got {other:?}"),
    }

    let r = dispatch(&mut session, Command::Recompute { object_id: Some(bin.id) }, &mut k);
    assert!(matches!(r, Response::Error { .. }));
    let obj = session.document().unwrap().object(bin.id).unwrap();
    assert!(obj.shape.is_none());
    assert!(obj.diagnostics.iter().any(|d| d.severity == Severity::Error));
}

#[test]
fn set_expression_drives_height() {
    let (mut session, mut k) = open_session();
    let bin = created(dispatch(&mut session, Command::CreateBinBlank, &mut k));
    dispatch(
        &mut session,
        Command::SetParameter {
            object_id: bin.id,
            name: "NonStandardHeight".to_string(),
            value: ParamValue::Bool(true),
        },
        &mut k,
    );
    let r = dispatch(
        &mut session,
        Command::SetExpression {
            object_id: bin.id,
            name: "CustomHeight".to_string(),
            expression: "HeightUnitValue * 4".to_string(),
        },
        &mut k,
    );
    assert!(matches!(r, Response::ObjectUpdated { .. }));
    let obj = session.document().unwrap().object(bin.id).unwrap();
    assert_relative_eq!(obj.params.number("TotalHeight").unwrap(), 28.0);
}

#[test]
fn unknown_object_is_error() {
    let (mut session, mut k) = open_session();
    let missing = Uuid::new_v4();
    match dispatch(&mut session, Command::DeleteObject { object_id: missing }, &mut k) {
        Response::Error { object_id, .. } => assert_eq!(object_id, Some(missing)),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn delete_then_recompute_all() {
    let (mut session, mut k) = open_session();
    let a = created(dispatch(&mut session, Command::CreateBaseplate, &mut k));
    let b = created(dispatch(&mut session, Command::CreateBinBase, &mut k));
    let r = dispatch(&mut session, Command::DeleteObject { object_id: a.id }, &mut k);
    assert!(matches!(r, Response::ObjectDeleted { object_id } if object_id == a.id));

    match dispatch(&mut session, Command::Recompute { object_id: None }, &mut k) {
        Response::Recomputed { objects } => {
            assert_eq!(objects.len(), 1);
            assert_eq!(objects[0].id, b.id);
            assert_relative_eq!(objects[0].volume.unwrap(), b.volume.unwrap(), epsilon = 1e-6);
        }
        other => panic!("expected Recomputed, got {other:?}"),
    }
}

// ── Documents ──────────────────────────────────────────────────────────────

#[test]
fn save_close_load_round_trip() {
    let (mut session, mut k) = open_session();
    let bin = created(dispatch(&mut session, Command::CreateSimpleStorageBin, &mut k));

    let json_data = match dispatch(&mut session, Command::SaveDocument, &mut k) {
        Response::SaveReady { json_data } => json_data,
        other => panic!("expected SaveReady, got {other:?}"),
    };
    assert!(matches!(
        dispatch(&mut session, Command::CloseDocument, &mut k),
        Response::DocumentClosed
    ));
    assert!(!session.is_open());

    match dispatch(&mut session, Command::LoadDocument { data: json_data }, &mut k) {
        Response::DocumentLoaded { name, objects } => {
            assert_eq!(name, "drawer");
            assert_eq!(objects.len(), 1);
            assert_eq!(objects[0].id, bin.id);
            assert_relative_eq!(objects[0].volume.unwrap(), bin.volume.unwrap(), epsilon = 1e-6);
        }
        other => panic!("expected DocumentLoaded, got {other:?}"),
    }
    assert!(session.is_open());
}

#[test]
fn close_without_document_is_error() {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    assert!(matches!(
        dispatch(&mut session, Command::CloseDocument, &mut k),
        Response::Error { .. }
    ));
    assert!(matches!(session.close(), Err(BridgeError::NoDocument)));
}

#[test]
fn bad_file_is_error() {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    let r = dispatch(
        &mut session,
        Command::LoadDocument {
            data: r#"{"format":"other","version":"0.1","document":{}}"#.to_string(),
        },
        &mut k,
    );
    assert!(matches!(r, Response::Error { .. }));
    assert!(!session.is_open());
}

// ── JSON surface ───────────────────────────────────────────────────────────

#[test]
fn json_messages_round_trip() {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    let out = process_message(&mut session, r#"{"type":"OpenDocument","name":"json"}"#, &mut k);
    let r: Response = serde_json::from_str(&out).unwrap();
    assert!(matches!(r, Response::DocumentOpened { name } if name == "json"));

    let out = process_message(&mut session, r#"{"type":"CreateEcoBin"}"#, &mut k);
    let r: Response = serde_json::from_str(&out).unwrap();
    assert_eq!(created(r).kind, ObjectKind::EcoBin);

    let out = process_message(&mut session, r#"{"type":"Recompute"}"#, &mut k);
    assert!(out.contains("\"Recomputed\""));
}

#[test]
fn malformed_json_is_error() {
    let mut session = Session::new();
    let mut k = MockKernel::new();
    let out = process_message(&mut session, r#"{"type":"Explode"}"#, &mut k);
    let r: Response = serde_json::from_str(&out).unwrap();
    match r {
        Response::Error { message, .. } => assert!(message.contains("failed to parse")),
        other => panic!("expected Error, got {other:?}"),
    }
}
