use gridfinity_engine::preferences;
use gridfinity_ops::KernelBundle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::messages::{Command, ObjectSummary, Response};
use crate::session::{summarize, BridgeError, Session};

/// Run one command against the session and return the response.
///
/// Failures become `Response::Error`, carrying the object id when the
/// failure belongs to one object.
pub fn dispatch(session: &mut Session, cmd: Command, kb: &mut dyn KernelBundle) -> Response {
    let target = target_of(&cmd);
    match handle_command(session, cmd, kb) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "command failed");
            let object_id = match &e {
                BridgeError::ObjectFailed { id, .. } => Some(*id),
                _ => target,
            };
            Response::Error {
                message: e.to_string(),
                object_id,
            }
        }
    }
}

/// Parse a JSON command, dispatch it and serialize the response.
pub fn process_message(session: &mut Session, json_input: &str, kb: &mut dyn KernelBundle) -> String {
    let response = match serde_json::from_str::<Command>(json_input) {
        Ok(cmd) => dispatch(session, cmd, kb),
        Err(e) => Response::Error {
            message: format!("failed to parse command: {e}"),
            object_id: None,
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"type":"Error","message":"serialization failed: {e}","object_id":null}}"#)
    })
}

fn target_of(cmd: &Command) -> Option<Uuid> {
    match cmd {
        Command::SetParameter { object_id, .. }
        | Command::SetExpression { object_id, .. }
        | Command::DeleteObject { object_id } => Some(*object_id),
        Command::Recompute { object_id } => *object_id,
        _ => None,
    }
}

fn handle_command(
    session: &mut Session,
    cmd: Command,
    kb: &mut dyn KernelBundle,
) -> Result<Response, BridgeError> {
    if cmd.needs_document() && !session.is_open() {
        return Err(BridgeError::NoDocument);
    }

    match cmd {
        Command::SetParameter {
            object_id,
            name,
            value,
        } => {
            session.document_mut()?.set_parameter(object_id, &name, value, kb)?;
            Ok(Response::ObjectUpdated {
                object: object_summary(session, object_id, kb)?,
            })
        }

        Command::SetExpression {
            object_id,
            name,
            expression,
        } => {
            session
                .document_mut()?
                .set_expression(object_id, &name, &expression, kb)?;
            Ok(Response::ObjectUpdated {
                object: object_summary(session, object_id, kb)?,
            })
        }

        Command::DeleteObject { object_id } => {
            session.document_mut()?.remove_object(object_id)?;
            Ok(Response::ObjectDeleted { object_id })
        }

        Command::Recompute { object_id: Some(id) } => {
            session.document_mut()?.recompute(id, kb)?;
            Ok(Response::Recomputed {
                objects: vec![object_summary(session, id, kb)?],
            })
        }

        Command::Recompute { object_id: None } => {
            let failures = session.document_mut()?.recompute_all(kb);
            for (id, e) in &failures {
                debug!(object = %id, error = %e, "object failed to rebuild");
            }
            Ok(Response::Recomputed {
                objects: all_summaries(session, kb)?,
            })
        }

        Command::OpenDocument { name } => {
            session.open(name.clone());
            Ok(Response::DocumentOpened { name })
        }

        Command::CloseDocument => {
            session.close()?;
            Ok(Response::DocumentClosed)
        }

        Command::SaveDocument => {
            let (doc, meta) = session.for_save()?;
            let json_data = file_format::save_document(doc, meta)?;
            Ok(Response::SaveReady { json_data })
        }

        Command::LoadDocument { data } => {
            let (doc, meta) = file_format::load_document(&data)?;
            let name = doc.name.clone();
            let doc = session.install(doc, meta);
            let failures = doc.recompute_all(kb);
            if !failures.is_empty() {
                warn!(failed = failures.len(), "some loaded objects failed to rebuild");
            }
            Ok(Response::DocumentLoaded {
                name,
                objects: all_summaries(session, kb)?,
            })
        }

        create => create_object(session, &create, kb),
    }
}

/// Instantiate the object a creation command names and build it.
///
/// Objects are seeded from the active preferences. A failed build keeps the
/// object in the document and reports its id.
fn create_object(
    session: &mut Session,
    cmd: &Command,
    kb: &mut dyn KernelBundle,
) -> Result<Response, BridgeError> {
    let kind = cmd.creates().ok_or_else(|| BridgeError::Unsupported {
        command: format!("{cmd:?}"),
    })?;
    let prefs = preferences::current();
    let doc = session.document_mut()?;
    let id = doc.add_object(kind, &prefs)?;
    debug!(kind = ?kind, id = %id, "creating object");
    doc.recompute(id, kb)
        .map_err(|source| BridgeError::ObjectFailed { id, source })?;
    Ok(Response::ObjectCreated {
        object: object_summary(session, id, kb)?,
    })
}

fn object_summary(
    session: &Session,
    id: Uuid,
    kb: &dyn KernelBundle,
) -> Result<ObjectSummary, BridgeError> {
    let object = session
        .document()?
        .object(id)
        .ok_or(gridfinity_engine::EngineError::ObjectNotFound { id })?;
    Ok(summarize(object, kb))
}

fn all_summaries(session: &Session, kb: &dyn KernelBundle) -> Result<Vec<ObjectSummary>, BridgeError> {
    Ok(session
        .document()?
        .objects()
        .iter()
        .map(|o| summarize(o, kb))
        .collect())
}
