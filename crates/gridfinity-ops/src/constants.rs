//! Canonical Gridfinity dimensions in millimetres.
//!
//! These seed the factory preference store; objects read their values from
//! parameters, never from here directly.

pub const GRID_SIZE: f64 = 42.0;
pub const HEIGHT_UNIT: f64 = 7.0;
pub const CLEARANCE: f64 = 0.25;
pub const GRID_UNITS: i64 = 2;
pub const HEIGHT_UNITS: i64 = 6;

// Bin base profile, bottom to top.
pub const BIN_BASE_BOTTOM_CHAMFER: f64 = 0.8;
pub const BIN_BASE_VERTICAL_SECTION: f64 = 1.8;
pub const BIN_BASE_TOP_CHAMFER: f64 = 2.15;
pub const BIN_BOTTOM_RADIUS: f64 = 0.8;
pub const BIN_VERTICAL_RADIUS: f64 = 1.6;
pub const BIN_OUTER_RADIUS: f64 = 3.75;

// Baseplate cavity profile.
pub const BASEPLATE_BOTTOM_CHAMFER: f64 = 0.7;
pub const BASEPLATE_VERTICAL_SECTION: f64 = 1.8;
pub const BASEPLATE_TOP_CHAMFER: f64 = 2.15;
pub const BASEPLATE_OUTER_RADIUS: f64 = 4.0;
pub const BASEPLATE_VERTICAL_RADIUS: f64 = 1.85;
pub const BASEPLATE_BOTTOM_RADIUS: f64 = 1.15;
pub const BASEPLATE_TOP_LEDGE_WIDTH: f64 = 0.0;

// Holes.
pub const MAGNET_HOLE_DIAMETER: f64 = 6.5;
pub const MAGNET_HOLE_DEPTH: f64 = 2.4;
pub const MAGNET_HOLE_DISTANCE_FROM_EDGE: f64 = 8.0;
pub const SCREW_HOLE_DIAMETER: f64 = 3.0;
pub const SCREW_HOLE_DEPTH: f64 = 6.0;
pub const SEQUENTIAL_BRIDGING_LAYER_HEIGHT: f64 = 0.2;
pub const CRUSH_RIBS_COUNT: i64 = 12;
pub const CRUSH_RIBS_WAVINESS: f64 = 0.5;
/// Radial depth of the relief between two crush ribs.
pub const CRUSH_RIB_DEPTH: f64 = 0.5;

// Stacking lip.
pub const STACKING_LIP_TOP_LEDGE: f64 = 0.4;
pub const STACKING_LIP_VERTICAL_SECTION: f64 = 1.8;
pub const STACKING_LIP_BOTTOM_CHAMFER: f64 = 0.7;

// Walls and interior.
pub const WALL_THICKNESS: f64 = 1.0;
pub const INSIDE_FILLET_RADIUS: f64 = 1.85;
pub const DIVIDER_THICKNESS: f64 = 1.2;

pub const LABEL_SHELF_WIDTH: f64 = 12.0;
pub const LABEL_SHELF_LENGTH: f64 = 42.0;
pub const LABEL_SHELF_ANGLE: f64 = 45.0;
pub const LABEL_SHELF_STACKING_OFFSET: f64 = 0.4;
pub const LABEL_SHELF_VERTICAL_THICKNESS: f64 = 2.0;

pub const SCOOP_RADIUS: f64 = 21.0;

// Eco bins.
pub const ECO_BASE_THICKNESS: f64 = 1.2;
pub const ECO_BASE_WALL_THICKNESS: f64 = 1.0;
pub const ECO_WALL_THICKNESS: f64 = 0.8;
pub const ECO_INSIDE_FILLET_RADIUS: f64 = 0.5;

// Magnet and screw-together baseplates.
pub const MAGNET_BASE: f64 = 0.4;
pub const MAGNET_BASE_HOLE: f64 = 3.0;
pub const MAGNET_CHAMFER: f64 = 0.4;
pub const MAGNET_EDGE_THICKNESS: f64 = 1.2;
pub const SCREW_TOGETHER_BASE_THICKNESS: f64 = 6.4;
pub const SCREW_BOTTOM_CHAMFER: f64 = 3.0;
pub const CONNECTION_HOLE_DIAMETER: f64 = 3.2;
