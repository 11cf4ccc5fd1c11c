//! DocumentBuilder: fluent API for scripting Gridfinity documents in tests.
//!
//! Wraps `command_bridge::dispatch()` to test the real command path, not a
//! simulation. All methods accept string names instead of UUIDs for
//! readability.

use std::collections::HashMap;

use brep_kernel::{BoundingBox, KernelIntrospect, MockKernel, ShapeHandle, TruckKernel};
use command_bridge::{dispatch, Command, ObjectSummary, Response, Session};
use gridfinity_engine::{GridfinityObject, ObjectKind};
use gridfinity_ops::KernelBundle;
use gridfinity_types::{Point3, ParamValue};
use uuid::Uuid;

use crate::assertions;
use crate::helpers::{create_command, HarnessError};
use crate::oracle::{self, OracleVerdict};
use crate::report::DocumentReport;
use crate::scenarios::ReferenceScenario;

/// A fluent builder for constructing and verifying documents in tests.
///
/// Wraps a command `Session` + `KernelBundle` and provides named-object
/// access and inline assertions.
pub struct DocumentBuilder {
    pub session: Session,
    pub(crate) kernel: Box<dyn KernelBundle>,
    named_objects: HashMap<String, Uuid>,
    history: Vec<(String, String)>,
}

impl DocumentBuilder {
    fn with_kernel(kernel: Box<dyn KernelBundle>) -> Self {
        let mut builder = Self {
            session: Session::new(),
            kernel,
            named_objects: HashMap::new(),
            history: Vec::new(),
        };
        builder.send(Command::OpenDocument {
            name: "harness".to_string(),
        });
        builder
    }

    /// Create a new DocumentBuilder with MockKernel (analytic, fast).
    pub fn mock() -> Self {
        Self::with_kernel(Box::new(MockKernel::new()))
    }

    /// Create a new DocumentBuilder with TruckKernel (real geometry).
    pub fn truck() -> Self {
        Self::with_kernel(Box::new(TruckKernel::new()))
    }

    /// Dispatch a command and record it in the history.
    pub fn send(&mut self, cmd: Command) -> Response {
        let label = format!("{cmd:?}");
        let response = dispatch(&mut self.session, cmd, self.kernel.as_mut());
        let outcome = match &response {
            Response::Error { message, .. } => format!("error: {message}"),
            _ => "ok".to_string(),
        };
        self.history.push((label, outcome));
        response
    }

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named_objects.contains_key(name) {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn id(&self, name: &str) -> Result<Uuid, HarnessError> {
        self.named_objects
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    fn expect_summary(response: Response, ctx: &str) -> Result<ObjectSummary, HarnessError> {
        match response {
            Response::ObjectCreated { object } | Response::ObjectUpdated { object } => Ok(object),
            Response::Error { message, .. } => Err(HarnessError::DispatchError {
                message: format!("{ctx}: {message}"),
            }),
            other => Err(HarnessError::DispatchError {
                message: format!("{ctx}: unexpected response {other:?}"),
            }),
        }
    }

    // ── Objects ─────────────────────────────────────────────────────────

    /// Create an object of `kind` under `name`.
    pub fn create(&mut self, name: &str, kind: ObjectKind) -> Result<Uuid, HarnessError> {
        self.check_name_available(name)?;
        let response = self.send(create_command(kind));
        let summary = Self::expect_summary(response, name)?;
        self.named_objects.insert(name.to_string(), summary.id);
        Ok(summary.id)
    }

    /// Set one parameter and rebuild.
    pub fn set(&mut self, name: &str, param: &str, value: ParamValue) -> Result<ObjectSummary, HarnessError> {
        let object_id = self.id(name)?;
        let response = self.send(Command::SetParameter {
            object_id,
            name: param.to_string(),
            value,
        });
        Self::expect_summary(response, &format!("{name}.{param}"))
    }

    /// Select an enumeration option by name and rebuild.
    pub fn select(&mut self, name: &str, param: &str, option: &str) -> Result<ObjectSummary, HarnessError> {
        self.set(name, param, ParamValue::enumeration(option, &[]))
    }

    /// Bind a parameter to an expression and rebuild.
    pub fn set_expression(
        &mut self,
        name: &str,
        param: &str,
        expression: &str,
    ) -> Result<ObjectSummary, HarnessError> {
        let object_id = self.id(name)?;
        let response = self.send(Command::SetExpression {
            object_id,
            name: param.to_string(),
            expression: expression.to_string(),
        });
        Self::expect_summary(response, &format!("{name}.{param}"))
    }

    pub fn delete(&mut self, name: &str) -> Result<(), HarnessError> {
        let object_id = self.id(name)?;
        match self.send(Command::DeleteObject { object_id }) {
            Response::ObjectDeleted { .. } => {
                self.named_objects.remove(name);
                Ok(())
            }
            other => Err(HarnessError::DispatchError {
                message: format!("delete {name}: {other:?}"),
            }),
        }
    }

    /// Rebuild every object, returning their summaries.
    pub fn recompute_all(&mut self) -> Result<Vec<ObjectSummary>, HarnessError> {
        match self.send(Command::Recompute { object_id: None }) {
            Response::Recomputed { objects } => Ok(objects),
            other => Err(HarnessError::DispatchError {
                message: format!("recompute: {other:?}"),
            }),
        }
    }

    /// Save the document and load it back, rebuilding every object.
    pub fn save_and_reload(&mut self) -> Result<Vec<ObjectSummary>, HarnessError> {
        let data = match self.send(Command::SaveDocument) {
            Response::SaveReady { json_data } => json_data,
            other => {
                return Err(HarnessError::DispatchError {
                    message: format!("save: {other:?}"),
                })
            }
        };
        match self.send(Command::LoadDocument { data }) {
            Response::DocumentLoaded { objects, .. } => Ok(objects),
            other => Err(HarnessError::DispatchError {
                message: format!("load: {other:?}"),
            }),
        }
    }

    /// Create a reference scenario's object and apply its tweaks.
    pub fn scenario(&mut self, s: &ReferenceScenario) -> Result<Uuid, HarnessError> {
        let id = self.create(s.name, s.kind)?;
        for tweak in s.tweaks {
            self.set(s.name, tweak.name(), tweak.value())?;
        }
        Ok(id)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn object(&self, name: &str) -> Result<&GridfinityObject, HarnessError> {
        let id = self.id(name)?;
        self.session
            .document()
            .ok()
            .and_then(|doc| doc.object(id))
            .ok_or_else(|| HarnessError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    pub fn solid(&self, name: &str) -> Result<ShapeHandle, HarnessError> {
        self.object(name)?.shape.ok_or_else(|| HarnessError::NoSolid {
            name: name.to_string(),
        })
    }

    pub fn kernel(&self) -> &dyn KernelIntrospect {
        self.kernel.as_introspect()
    }

    pub fn volume(&self, name: &str) -> Result<f64, HarnessError> {
        let solid = self.solid(name)?;
        Ok(self.kernel().volume(&solid)?)
    }

    pub fn bounding_box(&self, name: &str) -> Result<BoundingBox, HarnessError> {
        let solid = self.solid(name)?;
        Ok(self.kernel().bounding_box(&solid)?)
    }

    pub fn center_of_gravity(&self, name: &str) -> Result<Point3, HarnessError> {
        let solid = self.solid(name)?;
        Ok(self.kernel().center_of_gravity(&solid)?)
    }

    /// Commands sent so far with their outcome.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    pub fn report(&self) -> Result<DocumentReport, HarnessError> {
        let doc = self
            .session
            .document()
            .map_err(|e| HarnessError::DispatchError { message: e.to_string() })?;
        Ok(DocumentReport::build(doc, self.kernel()))
    }

    // ── Assertions ──────────────────────────────────────────────────────

    pub fn assert_has_solid(&self, name: &str) -> Result<(), HarnessError> {
        self.solid(name).map(|_| ())
    }

    pub fn assert_no_diagnostics(&self, name: &str) -> Result<(), HarnessError> {
        assertions::assert_no_diagnostics(self.object(name)?)
    }

    pub fn assert_volume(&self, name: &str, expected: f64, rel_tol: f64) -> Result<(), HarnessError> {
        let solid = self.solid(name)?;
        assertions::assert_volume_close(self.kernel(), &solid, expected, rel_tol, name)
    }

    pub fn assert_center_of_gravity(&self, name: &str, expected: [f64; 3], tol: f64) -> Result<(), HarnessError> {
        let solid = self.solid(name)?;
        assertions::assert_center_of_gravity(self.kernel(), &solid, expected, tol, name)
    }

    /// Run every oracle on the object and fail on the first failed verdict.
    pub fn check_oracles(&self, name: &str) -> Result<Vec<OracleVerdict>, HarnessError> {
        let verdicts = oracle::run_all(self.kernel(), self.object(name)?);
        if let Some(failed) = oracle::failures(&verdicts).first() {
            return Err(HarnessError::OracleFailure {
                oracle: failed.oracle_name.clone(),
                detail: format!("[{name}] {}", failed.detail),
            });
        }
        Ok(verdicts)
    }
}
