//! Per-kind assembly of the final solid from feature builders.
//!
//! Parameters are read into the builders' typed inputs here; the builders
//! themselves know nothing about parameter names.

use brep_kernel::{Kernel, ShapeHandle, Vector3};
use gridfinity_ops::base::{make_bin_base, BaseProfile};
use gridfinity_ops::baseplate::{
    make_baseplate, make_center_cuts, make_magnet_holes, make_screw_together_holes,
    BaseplateProfile, MagnetLayer, ScrewTogether,
};
use gridfinity_ops::body::{make_recess, make_solid_center};
use gridfinity_ops::compartments::{make_compartments, Dividers, Interior};
use gridfinity_ops::eco::{make_eco_inner_cut, EcoShell};
use gridfinity_ops::holes::{make_bottom_holes, HoleSpec, MagnetHoles, MagnetShape, ScrewHoles};
use gridfinity_ops::label_shelf::{make_label_shelf, LabelShelf, ShelfPlacement};
use gridfinity_ops::lip::{make_stacking_lip, StackingLip};
use gridfinity_ops::scoop::make_scoop;
use gridfinity_ops::shape_ops::{cut_optional, fuse_optional};
use gridfinity_ops::{Footprint, GridSpec, KernelBundle};
use tracing::{debug, instrument};

use crate::layout::GridLayout;
use crate::params::ParamSet;
use crate::schema::SHELF_OFF;
use crate::types::{Diagnostic, EngineError, ObjectKind};

/// Result of one build: the solid plus any soft failures along the way.
#[derive(Debug)]
pub struct Built {
    pub shape: ShapeHandle,
    pub warnings: Vec<Diagnostic>,
}

// ── Parameter readers ──────────────────────────────────────────────────────

fn base_profile(p: &ParamSet) -> Result<BaseProfile, EngineError> {
    Ok(BaseProfile {
        bottom_chamfer: p.number("BaseProfileBottomChamfer")?,
        vertical_section: p.number("BaseProfileVerticalSection")?,
        top_chamfer: p.number("BaseProfileTopChamfer")?,
        bottom_radius: p.number("BinBottomRadius")?,
    })
}

fn magnet_shape(p: &ParamSet) -> Result<MagnetShape, EngineError> {
    let selected = p.selection("MagnetHolesShape")?;
    match selected {
        "Round" => Ok(MagnetShape::Round),
        "Hex" => Ok(MagnetShape::Hex),
        "Crush ribs" => {
            let count = p.integer("CrushRibsCount")?;
            Ok(MagnetShape::CrushRibs {
                count: u32::try_from(count).map_err(|_| {
                    EngineError::invalid(format!("CrushRibsCount must be positive, got {count}"))
                })?,
                waviness: p.number("CrushRibsWaviness")?,
            })
        }
        other => Err(EngineError::UnknownEnumValue {
            name: "MagnetHolesShape".to_string(),
            value: other.to_string(),
        }),
    }
}

fn hole_spec(p: &ParamSet) -> Result<HoleSpec, EngineError> {
    let magnet = if p.flag("MagnetHoles")? {
        Some(MagnetHoles {
            shape: magnet_shape(p)?,
            diameter: p.number("MagnetHoleDiameter")?,
            depth: p.number("MagnetHoleDepth")?,
        })
    } else {
        None
    };
    let screw = if p.flag("ScrewHoles")? {
        Some(ScrewHoles {
            diameter: p.number("ScrewHoleDiameter")?,
            depth: p.number("ScrewHoleDepth")?,
        })
    } else {
        None
    };
    let bridging = p.flag("SequentialBridging")? && magnet.is_some() && screw.is_some();
    Ok(HoleSpec {
        magnet,
        screw,
        distance_from_edge: p.number("MagnetHoleDistanceFromEdge")?,
        bridging_layer_height: if bridging {
            Some(p.number("SequentialBridgingLayerHeight")?)
        } else {
            None
        },
        remove_channel: p.flag("MagnetRemoveChannel")?,
    })
}

fn stacking_lip(p: &ParamSet) -> Result<Option<StackingLip>, EngineError> {
    if !p.flag("StackingLip")? {
        return Ok(None);
    }
    Ok(Some(StackingLip {
        top_ledge: p.number("StackingLipTopLedge")?,
        top_chamfer: p.number("StackingLipTopChamfer")?,
        vertical_section: p.number("StackingLipVerticalSection")?,
        bottom_chamfer: p.number("StackingLipBottomChamfer")?,
        wall_thickness: p.number("WallThickness")?,
    }))
}

fn dividers(p: &ParamSet) -> Result<Dividers, EngineError> {
    let count = |name: &str| -> Result<u32, EngineError> {
        let n = p.integer(name)?;
        u32::try_from(n).map_err(|_| EngineError::invalid(format!("{name} cannot be negative, got {n}")))
    };
    Ok(Dividers {
        x_count: count("xDividers")?,
        y_count: count("yDividers")?,
        thickness: p.number("DividerThickness")?,
        x_height: p.number("xDividerHeight")?,
        y_height: p.number("yDividerHeight")?,
    })
}

fn label_shelf(p: &ParamSet) -> Result<Option<LabelShelf>, EngineError> {
    let style = p.selection("LabelShelfStyle")?;
    if style == SHELF_OFF {
        return Ok(None);
    }
    let placement = ShelfPlacement::from_name(style).ok_or_else(|| EngineError::UnknownEnumValue {
        name: "LabelShelfStyle".to_string(),
        value: style.to_string(),
    })?;
    Ok(Some(LabelShelf {
        placement,
        width: p.number("LabelShelfWidth")?,
        length: p.number("LabelShelfLength")?,
        angle_deg: p.number("LabelShelfAngle")?,
        stacking_offset: p.number("LabelShelfStackingOffset")?,
        vertical_thickness: p.number("LabelShelfVerticalThickness")?,
    }))
}

fn baseplate_profile(p: &ParamSet) -> Result<BaseplateProfile, EngineError> {
    Ok(BaseplateProfile {
        pocket: BaseProfile {
            bottom_chamfer: p.number("BaseplateProfileBottomChamfer")?,
            vertical_section: p.number("BaseplateProfileVerticalSection")?,
            top_chamfer: p.number("BaseplateProfileTopChamfer")?,
            bottom_radius: p.number("BaseplateBottomRadius")?,
        },
        outer_radius: p.number("BaseplateOuterRadius")?,
        top_ledge_width: p.number("BaseplateTopLedgeWidth")?,
    })
}

fn magnet_layer(p: &ParamSet) -> Result<MagnetLayer, EngineError> {
    Ok(MagnetLayer {
        hole_diameter: p.number("MagnetHoleDiameter")?,
        hole_depth: p.number("MagnetHoleDepth")?,
        distance_from_edge: p.number("MagnetHoleDistanceFromEdge")?,
        base: p.number("MagnetBase")?,
        base_hole_diameter: p.number("MagnetBaseHole")?,
        chamfer: p.number("MagnetChamfer")?,
        edge_thickness: p.number("MagnetEdgeThickness")?,
        center_cut_radius: p.number("BaseplateOuterRadius")?,
    })
}

// ── Bins ───────────────────────────────────────────────────────────────────

/// Shared inputs of every bin pipeline.
struct BinFrame {
    footprint: Footprint,
    grid: GridSpec,
    cells: Vec<Vector3>,
    profile: BaseProfile,
    outer_radius: f64,
    total_height: f64,
}

impl BinFrame {
    fn new(p: &ParamSet, layout: &GridLayout) -> Result<Self, EngineError> {
        Ok(Self {
            footprint: layout.footprint(p)?,
            grid: layout.grid,
            cells: layout.cell_centers(),
            profile: base_profile(p)?,
            outer_radius: p.number("BinOuterRadius")?,
            total_height: p.number("TotalHeight")?,
        })
    }
}

/// Base and solid centre, fused.
fn solid_bin(kb: &mut dyn KernelBundle, frame: &BinFrame) -> Result<ShapeHandle, EngineError> {
    let base = make_bin_base(
        kb,
        &frame.profile,
        frame.grid.unit_x(),
        frame.grid.unit_y(),
        &frame.cells,
    )?;
    let center = make_solid_center(
        kb,
        &frame.footprint,
        frame.outer_radius,
        frame.profile.height(),
        frame.total_height,
    )?;
    let body = kb.fuse(&base, &center)?;
    debug!("bin base and centre fused");
    Ok(body)
}

/// Stacking lip fused onto `body`. The lip is returned separately so
/// hollowing tools can keep clear of it.
fn with_lip(
    kb: &mut dyn KernelBundle,
    frame: &BinFrame,
    body: ShapeHandle,
    lip: Option<&StackingLip>,
) -> Result<(ShapeHandle, Option<ShapeHandle>), EngineError> {
    let lip_shape = match lip {
        Some(l) => Some(make_stacking_lip(
            kb,
            l,
            &frame.footprint,
            frame.outer_radius,
            frame.total_height,
        )?),
        None => None,
    };
    let body = fuse_optional(kb, body, lip_shape)?;
    Ok((body, lip_shape))
}

fn cut_holes(
    kb: &mut dyn KernelBundle,
    p: &ParamSet,
    frame: &BinFrame,
    body: ShapeHandle,
) -> Result<ShapeHandle, EngineError> {
    let holes = make_bottom_holes(kb, &hole_spec(p)?, &frame.grid, &frame.cells)?;
    Ok(cut_optional(kb, body, holes)?)
}

fn blank_bin(
    kb: &mut dyn KernelBundle,
    p: &ParamSet,
    frame: &BinFrame,
) -> Result<ShapeHandle, EngineError> {
    let body = solid_bin(kb, frame)?;

    // The recess goes in before the lip so the lip's foot stays whole.
    let depth = p.number("RecessedTopDepth")?;
    let body = if depth > 0.0 {
        let recess = make_recess(
            kb,
            &frame.footprint,
            p.number("WallThickness")?,
            frame.outer_radius,
            frame.total_height,
            depth,
        )?;
        debug!(depth, "cutting top recess");
        kb.cut(&body, &recess)?
    } else {
        body
    };
    let (body, _) = with_lip(kb, frame, body, stacking_lip(p)?.as_ref())?;
    cut_holes(kb, p, frame, body)
}

fn interior(p: &ParamSet, frame: &BinFrame, floor_z: f64) -> Result<Interior, EngineError> {
    Ok(Interior::new(
        &frame.footprint,
        p.number("WallThickness")?,
        floor_z,
        frame.total_height,
        dividers(p)?,
    )?)
}

/// Storage bin body with its compartments cut, holes not yet cut.
fn storage_bin(
    kb: &mut dyn KernelBundle,
    p: &ParamSet,
    frame: &BinFrame,
) -> Result<(ShapeHandle, Interior, Option<StackingLip>), EngineError> {
    let lip = stacking_lip(p)?;
    let body = solid_bin(kb, frame)?;
    let (body, lip_shape) = with_lip(kb, frame, body, lip.as_ref())?;
    let floor_z = frame.total_height - p.number("UsableHeight")?;
    let inside = interior(p, frame, floor_z)?;
    let tool = make_compartments(
        kb,
        &frame.footprint,
        &inside,
        p.number("WallThickness")?,
        frame.outer_radius,
        p.number("InsideFilletRadius")?,
        lip_shape,
    )?;
    debug!("compartments cut");
    Ok((kb.cut(&body, &tool)?, inside, lip))
}

fn parts_bin(
    kb: &mut dyn KernelBundle,
    p: &ParamSet,
    frame: &BinFrame,
    warnings: &mut Vec<Diagnostic>,
) -> Result<ShapeHandle, EngineError> {
    let (mut body, inside, lip) = storage_bin(kb, p, frame)?;
    let wall = p.number("WallThickness")?;

    if let Some(shelf) = label_shelf(p)? {
        let s = make_label_shelf(
            kb,
            &shelf,
            &inside,
            frame.outer_radius - wall,
            p.number("InsideFilletRadius")?,
        )?;
        body = kb.fuse(&body, &s)?;
        debug!(placement = ?shelf.placement, "label shelf fused");
    }

    if p.flag("Scoop")? {
        let setback = lip.map(|l| l.inset() - wall).unwrap_or(0.0).max(0.0);
        match make_scoop(
            kb,
            p.number("ScoopRadius")?,
            &inside,
            p.number("HeightUnitValue")?,
            setback,
        )? {
            Some(scoop) => body = kb.fuse(&body, &scoop)?,
            None => warnings.push(Diagnostic::warning(
                "scoop skipped: the compartments leave no room for a positive radius",
            )),
        }
    }
    cut_holes(kb, p, frame, body)
}

fn eco_bin(
    kb: &mut dyn KernelBundle,
    p: &ParamSet,
    frame: &BinFrame,
) -> Result<ShapeHandle, EngineError> {
    let lip = stacking_lip(p)?;
    let body = solid_bin(kb, frame)?;
    let (body, lip_shape) = with_lip(kb, frame, body, lip.as_ref())?;
    let eco = EcoShell {
        base_thickness: p.number("BaseThickness")?,
        base_wall_thickness: p.number("BaseWallThickness")?,
        wall_thickness: p.number("WallThickness")?,
        fillet_radius: p.number("InsideFilletRadius")?,
    };
    let inside = interior(p, frame, frame.total_height - p.number("UsableHeight")?)?;
    let tool = make_eco_inner_cut(
        kb,
        &eco,
        &frame.profile,
        [frame.grid.unit_x(), frame.grid.unit_y()],
        &frame.footprint,
        &inside,
        frame.outer_radius,
        &frame.cells,
        lip_shape,
    )?;
    let body = kb.cut(&body, &tool)?;
    cut_holes(kb, p, frame, body)
}

// ── Baseplates ─────────────────────────────────────────────────────────────

fn baseplate(
    kb: &mut dyn KernelBundle,
    kind: ObjectKind,
    p: &ParamSet,
    layout: &GridLayout,
) -> Result<ShapeHandle, EngineError> {
    let footprint = layout.footprint(p)?;
    let grid = layout.grid;
    let cells = layout.cell_centers();
    let profile = baseplate_profile(p)?;

    match kind {
        ObjectKind::MagnetBaseplate => {
            let magnet = magnet_layer(p)?;
            let floor = magnet.height();
            let plate = make_baseplate(kb, &profile, &footprint, &grid, &cells, floor)?;
            let holes = make_magnet_holes(kb, &magnet, &grid, &cells, floor)?;
            let plate = kb.cut(&plate, &holes)?;
            let centre = make_center_cuts(kb, &magnet, &grid, &cells, floor)?;
            Ok(kb.cut(&plate, &centre)?)
        }
        ObjectKind::ScrewTogetherBaseplate => {
            let magnet = magnet_layer(p)?;
            let screw = ScrewTogether {
                base_thickness: p.number("BaseThickness")?,
                screw_hole_diameter: p.number("ScrewHoleDiameter")?,
                bottom_chamfer: p.number("ScrewBottomChamfer")?,
                connection_hole_diameter: p.number("ConnectionHoleDiameter")?,
            };
            if screw.base_thickness <= magnet.hole_depth {
                return Err(EngineError::invalid(format!(
                    "base thickness {} must exceed the magnet depth {}",
                    screw.base_thickness, magnet.hole_depth
                )));
            }
            let floor = screw.base_thickness;
            let plate = make_baseplate(kb, &profile, &footprint, &grid, &cells, floor)?;
            let holes = make_magnet_holes(kb, &magnet, &grid, &cells, floor)?;
            let plate = kb.cut(&plate, &holes)?;
            let centre = make_center_cuts(kb, &magnet, &grid, &cells, floor)?;
            let plate = kb.cut(&plate, &centre)?;
            let screws = make_screw_together_holes(kb, &screw, &magnet, &grid, &cells)?;
            Ok(kb.cut(&plate, &screws)?)
        }
        _ => Ok(make_baseplate(kb, &profile, &footprint, &grid, &cells, 0.0)?),
    }
}

/// Builds the unplaced solid for `kind`.
#[instrument(skip(kb, params, layout), fields(cells = layout.matrix.count()))]
pub fn build(
    kb: &mut dyn KernelBundle,
    kind: ObjectKind,
    params: &ParamSet,
    layout: &GridLayout,
) -> Result<Built, EngineError> {
    let mut warnings = Vec::new();
    let shape = if kind.is_baseplate() {
        baseplate(kb, kind, params, layout)?
    } else {
        let frame = BinFrame::new(params, layout)?;
        match kind {
            ObjectKind::SimpleStorageBin => {
                let (body, _, _) = storage_bin(kb, params, &frame)?;
                cut_holes(kb, params, &frame, body)?
            }
            ObjectKind::PartsBin => parts_bin(kb, params, &frame, &mut warnings)?,
            ObjectKind::EcoBin => eco_bin(kb, params, &frame)?,
            // BinBase has no lip or recess parameters; its one-unit height
            // comes from the installed HeightUnits.
            ObjectKind::BinBase => {
                let body = solid_bin(kb, &frame)?;
                cut_holes(kb, params, &frame, body)?
            }
            _ => blank_bin(kb, params, &frame)?,
        }
    };
    Ok(Built { shape, warnings })
}
