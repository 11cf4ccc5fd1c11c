//! Parameter groups shared between object kinds.
//!
//! Each [`Capability`] installs its parameters, seeded from the preference
//! store, and binds its reference parameters to expressions. Installing
//! never overwrites a parameter that is already present, so the first
//! capability to add a name decides its default.

use gridfinity_ops::label_shelf::ShelfPlacement;
use gridfinity_types::{Category, LayoutMatrix, Param, ParamValue};

use crate::params::ParamSet;
use crate::preferences::{PreferenceKey as K, PreferenceStore};
use crate::types::{EngineError, GenerationLocation, ObjectKind};

pub const MAGNET_SHAPES: [&str; 3] = ["Round", "Hex", "Crush ribs"];
pub const SHELF_OFF: &str = "Off";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutShape {
    Rectangle,
    LShape,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Grid size and cell counts. Baseplates have no clearance.
    Layout { shape: LayoutShape, baseplate: bool },
    Height,
    BinBase,
    Holes,
    StackingLip,
    Recess,
    Compartments,
    LabelShelf,
    Scoop,
    Eco,
    Baseplate,
    MagnetBaseplate,
    ScrewTogether,
    Placement,
}

impl ObjectKind {
    /// Capabilities in installation order.
    pub fn capabilities(&self) -> Vec<Capability> {
        use Capability::*;
        let bin = |shape| Layout {
            shape,
            baseplate: false,
        };
        let plate = |shape| Layout {
            shape,
            baseplate: true,
        };
        match self {
            ObjectKind::BinBlank => vec![
                bin(LayoutShape::Rectangle),
                Height,
                BinBase,
                Holes,
                StackingLip,
                Recess,
                Placement,
            ],
            ObjectKind::BinBase => vec![bin(LayoutShape::Rectangle), Height, BinBase, Holes, Placement],
            ObjectKind::SimpleStorageBin => vec![
                bin(LayoutShape::Rectangle),
                Height,
                BinBase,
                Holes,
                StackingLip,
                Compartments,
                Placement,
            ],
            ObjectKind::PartsBin => vec![
                bin(LayoutShape::Rectangle),
                Height,
                BinBase,
                Holes,
                StackingLip,
                Compartments,
                LabelShelf,
                Scoop,
                Placement,
            ],
            // Eco installs before the lip so its thinner wall wins.
            ObjectKind::EcoBin => vec![
                bin(LayoutShape::Rectangle),
                Height,
                BinBase,
                Holes,
                Eco,
                StackingLip,
                Compartments,
                Placement,
            ],
            ObjectKind::Baseplate => vec![plate(LayoutShape::Rectangle), Baseplate, Placement],
            ObjectKind::MagnetBaseplate => vec![
                plate(LayoutShape::Rectangle),
                Baseplate,
                MagnetBaseplate,
                Placement,
            ],
            ObjectKind::ScrewTogetherBaseplate => vec![
                plate(LayoutShape::Rectangle),
                Baseplate,
                MagnetBaseplate,
                ScrewTogether,
                Placement,
            ],
            ObjectKind::LBinBlank => vec![
                bin(LayoutShape::LShape),
                Height,
                BinBase,
                Holes,
                StackingLip,
                Recess,
                Placement,
            ],
            ObjectKind::CustomBin => vec![
                bin(LayoutShape::Custom),
                Height,
                BinBase,
                Holes,
                StackingLip,
                Recess,
                Placement,
            ],
            ObjectKind::CustomBaseplate => vec![plate(LayoutShape::Custom), Baseplate, Placement],
        }
    }

    pub fn layout_shape(&self) -> LayoutShape {
        self.capabilities()
            .into_iter()
            .find_map(|c| match c {
                Capability::Layout { shape, .. } => Some(shape),
                _ => None,
            })
            .unwrap_or(LayoutShape::Rectangle)
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Materialise every parameter of `kind` with defaults from `prefs`.
pub fn install_all(
    kind: ObjectKind,
    params: &mut ParamSet,
    prefs: &PreferenceStore,
) -> Result<(), EngineError> {
    for capability in kind.capabilities() {
        capability.install(params, prefs)?;
    }
    if kind == ObjectKind::BinBase {
        params.overwrite("HeightUnits", ParamValue::Integer(1))?;
    }
    Ok(())
}

fn add(params: &mut ParamSet, name: &str, value: ParamValue, category: Category, tooltip: &str) {
    params.add_property(name, Param::new(value, category, tooltip));
}

fn add_length(params: &mut ParamSet, name: &str, mm: f64, category: Category, tooltip: &str) {
    add(params, name, ParamValue::Length(mm), category, tooltip);
}

fn add_count(params: &mut ParamSet, name: &str, n: i64, min: i64, max: i64, tooltip: &str) {
    params.add_property(
        name,
        Param::new(ParamValue::Integer(n), Category::Gridfinity, tooltip)
            .with_constraint(min as f64, max as f64, 1.0),
    );
}

fn add_flag(params: &mut ParamSet, name: &str, on: bool, category: Category, tooltip: &str) {
    add(params, name, ParamValue::Bool(on), category, tooltip);
}

/// Read-only parameter kept up to date by `expr`.
fn add_reference(
    params: &mut ParamSet,
    name: &str,
    value: ParamValue,
    expr: &str,
    tooltip: &str,
) -> Result<(), EngineError> {
    add(params, name, value, Category::ReferenceParameters, tooltip);
    params.set_expression(name, expr)?;
    Ok(())
}

use Category::{ExpertOnly as Expert, Gridfinity as Std, GridfinityNonStandard as NonStd};

impl Capability {
    pub fn install(&self, params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
        match *self {
            Capability::Layout { shape, baseplate } => install_layout(params, prefs, shape, baseplate),
            Capability::Height => install_height(params, prefs),
            Capability::BinBase => install_bin_base(params, prefs),
            Capability::Holes => install_holes(params, prefs),
            Capability::StackingLip => install_stacking_lip(params, prefs),
            Capability::Recess => {
                add_length(params, "RecessedTopDepth", 0.0, Std, "Depth of the pocket in the top face");
                Ok(())
            }
            Capability::Compartments => install_compartments(params, prefs),
            Capability::LabelShelf => install_label_shelf(params, prefs),
            Capability::Scoop => {
                add_flag(params, "Scoop", true, Std, "Scoop along the rear wall");
                add_length(params, "ScoopRadius", prefs.number(K::ScoopRadius)?, Std, "Scoop radius");
                Ok(())
            }
            Capability::Eco => install_eco(params, prefs),
            Capability::Baseplate => install_baseplate(params, prefs),
            Capability::MagnetBaseplate => install_magnet_baseplate(params, prefs),
            Capability::ScrewTogether => install_screw_together(params, prefs),
            Capability::Placement => {
                add(
                    params,
                    "GenerationLocation",
                    ParamValue::enumeration(GenerationLocation::NAMES[0], &GenerationLocation::NAMES),
                    Std,
                    "Where the object sits relative to the origin",
                );
                Ok(())
            }
        }
    }
}

fn install_layout(
    params: &mut ParamSet,
    prefs: &PreferenceStore,
    shape: LayoutShape,
    baseplate: bool,
) -> Result<(), EngineError> {
    let units_x = prefs.number(K::GridUnitsX)?;
    let units_y = prefs.number(K::GridUnitsY)?;
    add_length(params, "xGridSize", prefs.grid_size_x()?, NonStd, "Grid pitch along x");
    add_length(params, "yGridSize", prefs.grid_size_y()?, NonStd, "Grid pitch along y");
    let clearance = if baseplate {
        ""
    } else {
        add_length(
            params,
            "Clearance",
            prefs.number(K::Clearance)?,
            Expert,
            "Gap between a bin and its grid cell on each side",
        );
        " - 2 * Clearance"
    };

    let (x_units, y_units) = match shape {
        LayoutShape::Rectangle => {
            for (name, units) in [("xGridUnits", units_x), ("yGridUnits", units_y)] {
                params.add_property(
                    name,
                    Param::new(ParamValue::Float(units), Std, "Number of grid cells")
                        .with_constraint(1.0, 1000.0, 1.0),
                );
            }
            ("xGridUnits", "yGridUnits")
        }
        LayoutShape::LShape => {
            add_count(params, "x1GridUnits", 3, 2, 100, "Overall length along x in grid cells");
            add_count(params, "y1GridUnits", 2, 2, 100, "Overall length along y in grid cells");
            add_count(params, "x2GridUnits", 1, 1, 99, "Width of the arm along y, in grid cells");
            add_count(params, "y2GridUnits", 1, 1, 99, "Width of the arm along x, in grid cells");
            ("x1GridUnits", "y1GridUnits")
        }
        LayoutShape::Custom => {
            let layout = LayoutMatrix::filled(units_x.max(1.0) as usize, units_y.max(1.0) as usize);
            add(params, "Layout", ParamValue::Layout(layout), Std, "Occupied grid cells");
            ("xMaxGrids", "yMaxGrids")
        }
    };

    add(params, "xMaxGrids", ParamValue::Integer(0), Category::ReferenceParameters, "Layout extent along x");
    add(params, "yMaxGrids", ParamValue::Integer(0), Category::ReferenceParameters, "Layout extent along y");
    add_reference(
        params,
        "xTotalWidth",
        ParamValue::Length(0.0),
        &format!("{x_units} * xGridSize{clearance}"),
        "Overall width along x",
    )?;
    add_reference(
        params,
        "yTotalWidth",
        ParamValue::Length(0.0),
        &format!("{y_units} * yGridSize{clearance}"),
        "Overall width along y",
    )
}

fn install_height(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    let units = prefs.integer(K::HeightUnits)?;
    let unit = prefs.number(K::HeightUnitValue)?;
    add_count(params, "HeightUnits", units, 1, 1000, "Height in height units");
    add_length(params, "HeightUnitValue", unit, NonStd, "Size of one height unit");
    add_flag(params, "NonStandardHeight", false, NonStd, "Use CustomHeight instead of height units");
    add_length(params, "CustomHeight", units as f64 * unit, NonStd, "Total height when non-standard");
    add_reference(
        params,
        "TotalHeight",
        ParamValue::Length(0.0),
        "if(NonStandardHeight, CustomHeight, HeightUnits * HeightUnitValue)",
        "Height to the top of the walls, without the stacking lip",
    )?;
    add_reference(
        params,
        "UsableHeight",
        ParamValue::Length(0.0),
        "TotalHeight - HeightUnitValue",
        "Height available above the floor",
    )
}

fn install_bin_base(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    for (name, key) in [
        ("BaseProfileBottomChamfer", K::BinBaseBottomChamfer),
        ("BaseProfileVerticalSection", K::BinBaseVerticalSection),
        ("BaseProfileTopChamfer", K::BinBaseTopChamfer),
        ("BinBottomRadius", K::BinBottomRadius),
        ("BinVerticalRadius", K::BinVerticalRadius),
        ("BinOuterRadius", K::BinOuterRadius),
    ] {
        add_length(params, name, prefs.number(key)?, Expert, "Base profile dimension");
    }
    add_reference(
        params,
        "BaseProfileHeight",
        ParamValue::Length(0.0),
        "BaseProfileBottomChamfer + BaseProfileVerticalSection + BaseProfileTopChamfer",
        "Height of the base profile",
    )
}

fn install_holes(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    add_flag(params, "MagnetHoles", prefs.flag(K::MagnetHoles), Std, "Magnet pockets under each cell");
    add(
        params,
        "MagnetHolesShape",
        ParamValue::enumeration(MAGNET_SHAPES[0], &MAGNET_SHAPES),
        Std,
        "Cross-section of the magnet pockets",
    );
    add_length(params, "MagnetHoleDiameter", prefs.number(K::MagnetHoleDiameter)?, Std, "Magnet diameter");
    add_length(params, "MagnetHoleDepth", prefs.number(K::MagnetHoleDepth)?, Std, "Magnet thickness");
    add_length(
        params,
        "MagnetHoleDistanceFromEdge",
        prefs.number(K::MagnetHoleDistanceFromEdge)?,
        NonStd,
        "Distance from the cell edge to the hole centre",
    );
    add_flag(
        params,
        "MagnetRemoveChannel",
        prefs.flag(K::MagnetRemoveChannel),
        Std,
        "Slot for prying magnets out",
    );
    add_count(
        params,
        "CrushRibsCount",
        prefs.integer(K::CrushRibsCount)?,
        3,
        64,
        "Number of crush ribs",
    );
    params.add_property(
        "CrushRibsWaviness",
        Param::new(
            ParamValue::Float(prefs.number(K::CrushRibsWaviness)?),
            Std,
            "0 for narrow ribs, 1 for wide ribs",
        )
        .with_constraint(0.0, 1.0, 0.05),
    );
    add_flag(params, "ScrewHoles", prefs.flag(K::ScrewHoles), Std, "Screw holes under each magnet");
    add_length(params, "ScrewHoleDiameter", prefs.number(K::ScrewHoleDiameter)?, Std, "Screw hole diameter");
    add_length(params, "ScrewHoleDepth", prefs.number(K::ScrewHoleDepth)?, Std, "Screw hole depth");
    add_flag(
        params,
        "SequentialBridging",
        prefs.flag(K::SequentialBridging),
        Std,
        "Printable bridging between magnet and screw holes",
    );
    add_length(
        params,
        "SequentialBridgingLayerHeight",
        prefs.number(K::SequentialBridgingLayerHeight)?,
        Std,
        "Print layer height used for bridging",
    );
    Ok(())
}

fn install_stacking_lip(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    add_flag(params, "StackingLip", prefs.flag(K::StackingLip), Std, "Lip that the bin above sits in");
    for (name, key) in [
        ("StackingLipTopLedge", K::StackingLipTopLedge),
        ("StackingLipVerticalSection", K::StackingLipVerticalSection),
        ("StackingLipBottomChamfer", K::StackingLipBottomChamfer),
    ] {
        add_length(params, name, prefs.number(key)?, Expert, "Stacking lip dimension");
    }
    // A bin above seats its base top chamfer, less clearance, against this one.
    add_reference(
        params,
        "StackingLipTopChamfer",
        ParamValue::Length(0.0),
        "BaseProfileTopChamfer - Clearance - StackingLipTopLedge",
        "Stacking lip top chamfer",
    )?;
    add_length(params, "WallThickness", prefs.number(K::WallThickness)?, NonStd, "Outer wall thickness");
    Ok(())
}

fn install_compartments(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    add_length(params, "WallThickness", prefs.number(K::WallThickness)?, NonStd, "Outer wall thickness");
    add_count(params, "xDividers", 0, 0, 100, "Dividers splitting the bin along x");
    add_count(params, "yDividers", 0, 0, 100, "Dividers splitting the bin along y");
    add_length(params, "DividerThickness", prefs.number(K::DividerThickness)?, NonStd, "Divider thickness");
    add_length(
        params,
        "xDividerHeight",
        prefs.divider_custom_x_height()?,
        NonStd,
        "Height of x dividers above the floor, 0 for full height",
    );
    add_length(
        params,
        "yDividerHeight",
        prefs.divider_custom_y_height()?,
        NonStd,
        "Height of y dividers above the floor, 0 for full height",
    );
    add_length(
        params,
        "InsideFilletRadius",
        prefs.number(K::InsideFilletRadius)?,
        NonStd,
        "Fillet between floor and walls",
    );
    Ok(())
}

fn install_label_shelf(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    let mut styles = vec![SHELF_OFF];
    styles.extend(ShelfPlacement::NAMES);
    add(
        params,
        "LabelShelfStyle",
        ParamValue::enumeration(ShelfPlacement::NAMES[0], &styles),
        Std,
        "Label shelf placement",
    );
    add_length(params, "LabelShelfWidth", prefs.number(K::LabelShelfWidth)?, NonStd, "Shelf depth");
    add_length(params, "LabelShelfLength", prefs.number(K::LabelShelfLength)?, NonStd, "Shelf length");
    add(
        params,
        "LabelShelfAngle",
        ParamValue::Angle(prefs.number(K::LabelShelfAngle)?),
        NonStd,
        "Underside angle",
    );
    add_length(
        params,
        "LabelShelfStackingOffset",
        prefs.number(K::LabelShelfStackingOffset)?,
        NonStd,
        "Drop below the bin top so bins stack",
    );
    add_length(
        params,
        "LabelShelfVerticalThickness",
        prefs.number(K::LabelShelfVerticalThickness)?,
        NonStd,
        "Thickness at the front edge",
    );
    Ok(())
}

fn install_eco(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    add_length(params, "BaseThickness", prefs.number(K::EcoBaseThickness)?, Std, "Floor thickness");
    add_length(
        params,
        "BaseWallThickness",
        prefs.number(K::EcoBaseWallThickness)?,
        NonStd,
        "Wall thickness inside the base profile",
    );
    add_length(params, "WallThickness", prefs.number(K::EcoWallThickness)?, NonStd, "Outer wall thickness");
    add_length(
        params,
        "InsideFilletRadius",
        prefs.number(K::EcoInsideFilletRadius)?,
        NonStd,
        "Fillet between floor and walls",
    );
    Ok(())
}

fn install_baseplate(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    for (name, key) in [
        ("BaseplateProfileBottomChamfer", K::BaseplateBottomChamfer),
        ("BaseplateProfileVerticalSection", K::BaseplateVerticalSection),
        ("BaseplateProfileTopChamfer", K::BaseplateTopChamfer),
        ("BaseplateBottomRadius", K::BaseplateBottomRadius),
        ("BaseplateVerticalRadius", K::BaseplateVerticalRadius),
        ("BaseplateOuterRadius", K::BaseplateOuterRadius),
        ("BaseplateTopLedgeWidth", K::BaseplateTopLedgeWidth),
    ] {
        add_length(params, name, prefs.number(key)?, Expert, "Baseplate profile dimension");
    }
    add_reference(
        params,
        "BaseplateProfileHeight",
        ParamValue::Length(0.0),
        "BaseplateProfileBottomChamfer + BaseplateProfileVerticalSection + BaseplateProfileTopChamfer",
        "Height of the baseplate profile",
    )
}

fn install_magnet_baseplate(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    for (name, key, category) in [
        ("MagnetHoleDiameter", K::MagnetHoleDiameter, Std),
        ("MagnetHoleDepth", K::MagnetHoleDepth, Std),
        ("MagnetHoleDistanceFromEdge", K::MagnetHoleDistanceFromEdge, NonStd),
        ("MagnetBase", K::MagnetBase, NonStd),
        ("MagnetBaseHole", K::MagnetBaseHole, NonStd),
        ("MagnetChamfer", K::MagnetChamfer, NonStd),
        ("MagnetEdgeThickness", K::MagnetEdgeThickness, NonStd),
    ] {
        add_length(params, name, prefs.number(key)?, category, "Magnet layer dimension");
    }
    add_reference(
        params,
        "MagnetLayerHeight",
        ParamValue::Length(0.0),
        "MagnetHoleDepth + MagnetBase",
        "Height of the magnet layer under the profile",
    )
}

fn install_screw_together(params: &mut ParamSet, prefs: &PreferenceStore) -> Result<(), EngineError> {
    add_length(
        params,
        "BaseThickness",
        prefs.number(K::ScrewTogetherBaseThickness)?,
        Std,
        "Thickness of the layer under the profile",
    );
    add_length(params, "ScrewHoleDiameter", prefs.number(K::ScrewHoleDiameter)?, Std, "Screw hole diameter");
    add_length(
        params,
        "ScrewBottomChamfer",
        prefs.number(K::ScrewBottomChamfer)?,
        NonStd,
        "Countersink at the bottom of each screw hole",
    );
    add_length(
        params,
        "ConnectionHoleDiameter",
        prefs.number(K::ConnectionHoleDiameter)?,
        NonStd,
        "Horizontal holes joining neighbouring plates",
    );
    Ok(())
}
