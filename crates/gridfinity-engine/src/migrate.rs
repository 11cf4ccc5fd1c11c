//! Upgrades parameter sets saved by older versions.
//!
//! Every step is keyed by the version that introduced it and only runs for
//! objects older than that. Steps check for the parameters they touch, so
//! running one twice changes nothing.

use gridfinity_types::{Category, Param, ParamType, ParamValue, SchemaVersion};
use tracing::warn;

use crate::object::GridfinityObject;
use crate::params::ParamSet;
use crate::schema::MAGNET_SHAPES;
use crate::types::{EngineError, GenerationLocation};

const CURRENT: [u32; 3] = [0, 12, 0];

pub fn current_version() -> SchemaVersion {
    SchemaVersion::new(&CURRENT)
}

type Step = fn(&mut ParamSet) -> Result<(), EngineError>;

const STEPS: [([u32; 3], Step); 3] = [
    ([0, 10, 0], add_generation_location),
    ([0, 11, 9], magnet_options),
    ([0, 12, 0], height_expression_and_real_units),
];

fn add_generation_location(params: &mut ParamSet) -> Result<(), EngineError> {
    params.add_property(
        "GenerationLocation",
        Param::new(
            ParamValue::enumeration(GenerationLocation::NAMES[0], &GenerationLocation::NAMES),
            Category::Gridfinity,
            "Where the object sits relative to the origin",
        ),
    );
    Ok(())
}

fn magnet_options(params: &mut ParamSet) -> Result<(), EngineError> {
    if params.has_property("MagnetRelief") && !params.has_property("MagnetRemoveChannel") {
        params.rename_property("MagnetRelief", "MagnetRemoveChannel")?;
    }
    if !params.has_property("MagnetHoles") {
        return Ok(());
    }
    params.add_property(
        "CrushRibsCount",
        Param::new(ParamValue::Integer(12), Category::Gridfinity, "Number of crush ribs")
            .with_constraint(3.0, 64.0, 1.0),
    );
    params.add_property(
        "CrushRibsWaviness",
        Param::new(
            ParamValue::Float(0.5),
            Category::Gridfinity,
            "0 for narrow ribs, 1 for wide ribs",
        )
        .with_constraint(0.0, 1.0, 0.05),
    );
    params.add_property(
        "MagnetHolesShape",
        Param::new(
            ParamValue::enumeration(MAGNET_SHAPES[0], &MAGNET_SHAPES),
            Category::Gridfinity,
            "Cross-section of the magnet pockets",
        ),
    );
    Ok(())
}

fn height_expression_and_real_units(params: &mut ParamSet) -> Result<(), EngineError> {
    if params.has_property("UsableHeight") {
        params.set_expression("UsableHeight", "TotalHeight - HeightUnitValue")?;
    }
    for name in ["xGridUnits", "yGridUnits"] {
        if params.property_type(name) == Some(ParamType::Integer) {
            let units = params.integer(name)?;
            params.overwrite(name, ParamValue::Float(units as f64))?;
        }
    }
    Ok(())
}

/// Applies every step newer than the object's version and stamps it
/// current. Returns the versions of the steps that ran.
pub fn migrate(object: &mut GridfinityObject) -> Result<Vec<SchemaVersion>, EngineError> {
    let current = current_version();
    if object.version > current {
        warn!(
            object = %object.id,
            version = %object.version,
            "object is newer than this library, leaving it as is"
        );
        return Ok(Vec::new());
    }

    let mut applied = Vec::new();
    for (target, step) in STEPS {
        let target = SchemaVersion::new(&target);
        if object.version < target {
            step(&mut object.params)?;
            applied.push(target);
        }
    }
    if !applied.is_empty() {
        warn!(
            object = %object.id,
            from = %object.version,
            to = %current,
            steps = applied.len(),
            "migrated object parameters"
        );
    }
    object.version = current;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;
    use crate::types::ObjectKind;

    /// A bin as saved by 0.9: no placement option, the old relief flag and
    /// integer grid units.
    fn legacy_bin() -> GridfinityObject {
        let mut obj = GridfinityObject::new(ObjectKind::BinBlank, &PreferenceStore::factory()).unwrap();
        obj.version = SchemaVersion::new(&[0, 9, 0]);
        let p = &mut obj.params;
        p.remove_property("GenerationLocation");
        p.rename_property("MagnetRemoveChannel", "MagnetRelief").unwrap();
        p.remove_property("CrushRibsCount");
        p.remove_property("CrushRibsWaviness");
        p.remove_property("MagnetHolesShape");
        p.clear_expression("UsableHeight");
        p.remove_property("xGridUnits");
        p.add_property(
            "xGridUnits",
            Param::new(ParamValue::Integer(3), Category::Gridfinity, ""),
        );
        obj
    }

    #[test]
    fn legacy_object_gains_current_parameters() {
        let mut obj = legacy_bin();
        let applied = migrate(&mut obj).unwrap();
        assert_eq!(applied.len(), 3);
        assert_eq!(obj.version, current_version());

        let p = &obj.params;
        assert!(p.has_property("GenerationLocation"));
        assert!(p.has_property("MagnetRemoveChannel"));
        assert!(!p.has_property("MagnetRelief"));
        assert_eq!(p.integer("CrushRibsCount").unwrap(), 12);
        assert_eq!(p.number("CrushRibsWaviness").unwrap(), 0.5);
        assert_eq!(p.selection("MagnetHolesShape").unwrap(), "Round");
        assert_eq!(p.expression("UsableHeight"), Some("TotalHeight - HeightUnitValue"));
        assert_eq!(p.property_type("xGridUnits"), Some(ParamType::Float));
        assert_eq!(p.number("xGridUnits").unwrap(), 3.0);
    }

    #[test]
    fn migration_is_idempotent() {
        let mut once = legacy_bin();
        migrate(&mut once).unwrap();

        let mut twice = once.clone();
        twice.version = SchemaVersion::legacy();
        migrate(&mut twice).unwrap();
        assert_eq!(once.params, twice.params);

        assert!(migrate(&mut twice).unwrap().is_empty());
    }

    #[test]
    fn partial_upgrade_runs_only_newer_steps() {
        let mut obj = legacy_bin();
        obj.version = SchemaVersion::new(&[0, 11, 9]);
        let applied = migrate(&mut obj).unwrap();
        assert_eq!(applied, vec![SchemaVersion::new(&[0, 12, 0])]);
        assert!(!obj.params.has_property("GenerationLocation"));
    }

    #[test]
    fn baseplates_do_not_gain_magnet_options() {
        let mut obj = GridfinityObject::new(ObjectKind::Baseplate, &PreferenceStore::factory()).unwrap();
        obj.version = SchemaVersion::legacy();
        migrate(&mut obj).unwrap();
        assert!(!obj.params.has_property("CrushRibsCount"));
    }
}
