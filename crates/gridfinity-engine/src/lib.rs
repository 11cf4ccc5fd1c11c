pub mod expr;
pub mod layout;
pub mod migrate;
pub mod object;
pub mod params;
pub mod pipeline;
pub mod preferences;
pub mod schema;
pub mod types;

use brep_kernel::{Kernel, KernelIntrospect, ShapeHandle};
use gridfinity_ops::KernelBundle;
use gridfinity_types::ParamValue;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::expr::evaluate_expressions;
use crate::layout::{apply_layout, GridLayout};
use crate::migrate::migrate;
use crate::pipeline::{build, Built};

pub use crate::object::GridfinityObject;
pub use crate::params::{ParamError, ParamSet};
pub use crate::preferences::PreferenceStore;
pub use crate::types::{Diagnostic, EngineError, GenerationLocation, ObjectKind, Severity};

/// A document of Gridfinity objects.
///
/// Owns its objects and rebuilds an object's solid whenever one of its
/// parameters changes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub name: String,
    objects: Vec<GridfinityObject>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    pub fn objects(&self) -> &[GridfinityObject] {
        &self.objects
    }

    pub fn object(&self, id: Uuid) -> Option<&GridfinityObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: Uuid) -> Result<&mut GridfinityObject, EngineError> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(EngineError::ObjectNotFound { id })
    }

    /// Adds an existing object, e.g. one loaded from a file. Its solid is
    /// built on the next recompute.
    pub fn insert_object(&mut self, object: GridfinityObject) -> Uuid {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Adds a new object of `kind` with parameters seeded from `prefs`,
    /// without building it.
    pub fn add_object(&mut self, kind: ObjectKind, prefs: &PreferenceStore) -> Result<Uuid, EngineError> {
        let object = GridfinityObject::new(kind, prefs)?;
        debug!(kind = ?kind, id = %object.id, "object created");
        Ok(self.insert_object(object))
    }

    /// Adds a new object and builds it.
    ///
    /// A failed build leaves the object in the document, carrying its
    /// diagnostics, so the parameters can be corrected.
    pub fn create_object(
        &mut self,
        kind: ObjectKind,
        prefs: &PreferenceStore,
        kb: &mut dyn KernelBundle,
    ) -> Result<Uuid, EngineError> {
        let id = self.add_object(kind, prefs)?;
        self.recompute(id, kb)?;
        Ok(id)
    }

    pub fn remove_object(&mut self, id: Uuid) -> Result<GridfinityObject, EngineError> {
        let pos = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(EngineError::ObjectNotFound { id })?;
        Ok(self.objects.remove(pos))
    }

    /// Sets one parameter and rebuilds the object.
    pub fn set_parameter(
        &mut self,
        id: Uuid,
        name: &str,
        value: ParamValue,
        kb: &mut dyn KernelBundle,
    ) -> Result<ShapeHandle, EngineError> {
        self.object_mut(id)?.params.set(name, value)?;
        self.recompute(id, kb)
    }

    /// Binds a parameter to an expression and rebuilds the object.
    pub fn set_expression(
        &mut self,
        id: Uuid,
        name: &str,
        expr: &str,
        kb: &mut dyn KernelBundle,
    ) -> Result<ShapeHandle, EngineError> {
        self.object_mut(id)?.params.set_expression(name, expr)?;
        self.recompute(id, kb)
    }

    /// Rebuilds one object's solid from its parameters.
    ///
    /// Invalid geometry and unknown enumeration values are also recorded on
    /// the object. On any failure the object is left without a solid.
    #[instrument(skip(self, kb), fields(object = %id))]
    pub fn recompute(&mut self, id: Uuid, kb: &mut dyn KernelBundle) -> Result<ShapeHandle, EngineError> {
        let object = self.object_mut(id)?;
        object.diagnostics.clear();
        match rebuild(object, kb) {
            Ok(Built { shape, warnings }) => {
                for w in &warnings {
                    warn!(object = %id, "{}", w.message);
                }
                object.diagnostics.extend(warnings);
                object.shape = Some(shape);
                match kb.volume(&shape) {
                    Ok(volume) => info!(kind = ?object.kind, volume, "recompute finished"),
                    Err(e) => info!(kind = ?object.kind, error = %e, "recompute finished, volume unavailable"),
                }
                Ok(shape)
            }
            Err(e) => {
                object.shape = None;
                if e.is_diagnostic() {
                    object.diagnostics.push(Diagnostic::error(e.to_string()));
                }
                warn!(object = %id, error = %e, "recompute failed");
                Err(e)
            }
        }
    }

    /// Rebuilds every object, returning the ones that failed.
    pub fn recompute_all(&mut self, kb: &mut dyn KernelBundle) -> Vec<(Uuid, EngineError)> {
        let ids: Vec<Uuid> = self.objects.iter().map(|o| o.id).collect();
        ids.into_iter()
            .filter_map(|id| self.recompute(id, kb).err().map(|e| (id, e)))
            .collect()
    }
}

/// migrate → expressions → layout → expressions again for layout-derived
/// values → feature pipeline → placement.
fn rebuild(object: &mut GridfinityObject, kb: &mut dyn KernelBundle) -> Result<Built, EngineError> {
    migrate(object)?;
    evaluate_expressions(&mut object.params)?;
    let layout = apply_layout(object.kind, &mut object.params)?;
    evaluate_expressions(&mut object.params)?;

    let built = build(kb, object.kind, &object.params, &layout)?;
    let placed = place(kb, &object.params, &layout, built.shape)?;
    Ok(Built {
        shape: kb.remove_splitter(&placed)?,
        warnings: built.warnings,
    })
}

fn place(
    kb: &mut dyn KernelBundle,
    params: &ParamSet,
    layout: &GridLayout,
    shape: ShapeHandle,
) -> Result<ShapeHandle, EngineError> {
    let selected = params.selection("GenerationLocation")?;
    match GenerationLocation::from_name(selected) {
        Some(GenerationLocation::PositiveFromOrigin) => Ok(shape),
        Some(GenerationLocation::CenteredAtOrigin) => {
            let [ex, ey] = layout.extent();
            Ok(kb.translated(&shape, [-ex / 2.0, -ey / 2.0, 0.0])?)
        }
        None => Err(EngineError::UnknownEnumValue {
            name: "GenerationLocation".to_string(),
            value: selected.to_string(),
        }),
    }
}
