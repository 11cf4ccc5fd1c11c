//! User preferences that seed the parameters of new objects.
//!
//! A store is a flat JSON map from key name to number or boolean. One store
//! is active per process; the engine only reads it, and [`reload`] swaps in a
//! new one wholesale.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

use gridfinity_ops::constants::*;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const NAMESPACE: &str = "User parameter:BaseApp/Preferences/Mod/Gridfinity";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreferenceError {
    #[error("preference {key} is not set")]
    Missing { key: String },

    #[error("preference {key} holds a {found}, expected a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown preference key {key}")]
    UnknownKey { key: String },

    #[error("cannot parse preferences: {0}")]
    Parse(String),

    #[error("cannot serialize preferences: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceKey {
    GridSizeX,
    GridSizeY,
    IndependentGridSize,
    HeightUnitValue,
    Clearance,
    GridUnitsX,
    GridUnitsY,
    HeightUnits,
    BinBaseBottomChamfer,
    BinBaseVerticalSection,
    BinBaseTopChamfer,
    BinBottomRadius,
    BinVerticalRadius,
    BinOuterRadius,
    MagnetHoles,
    MagnetHoleDiameter,
    MagnetHoleDepth,
    MagnetHoleDistanceFromEdge,
    MagnetRemoveChannel,
    CrushRibsCount,
    CrushRibsWaviness,
    ScrewHoles,
    ScrewHoleDiameter,
    ScrewHoleDepth,
    SequentialBridging,
    SequentialBridgingLayerHeight,
    StackingLip,
    StackingLipTopLedge,
    StackingLipVerticalSection,
    StackingLipBottomChamfer,
    WallThickness,
    InsideFilletRadius,
    DividerThickness,
    DividerCustomX,
    DividerCustomY,
    DividerCustomXHeight,
    DividerCustomYHeight,
    LabelShelfWidth,
    LabelShelfLength,
    LabelShelfAngle,
    LabelShelfStackingOffset,
    LabelShelfVerticalThickness,
    ScoopRadius,
    EcoBaseThickness,
    EcoBaseWallThickness,
    EcoWallThickness,
    EcoInsideFilletRadius,
    BaseplateBottomChamfer,
    BaseplateVerticalSection,
    BaseplateTopChamfer,
    BaseplateBottomRadius,
    BaseplateVerticalRadius,
    BaseplateOuterRadius,
    BaseplateTopLedgeWidth,
    MagnetBase,
    MagnetBaseHole,
    MagnetChamfer,
    MagnetEdgeThickness,
    ScrewTogetherBaseThickness,
    ScrewBottomChamfer,
    ConnectionHoleDiameter,
}

use PreferenceKey::*;

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 61] = [
        GridSizeX,
        GridSizeY,
        IndependentGridSize,
        HeightUnitValue,
        Clearance,
        GridUnitsX,
        GridUnitsY,
        HeightUnits,
        BinBaseBottomChamfer,
        BinBaseVerticalSection,
        BinBaseTopChamfer,
        BinBottomRadius,
        BinVerticalRadius,
        BinOuterRadius,
        MagnetHoles,
        MagnetHoleDiameter,
        MagnetHoleDepth,
        MagnetHoleDistanceFromEdge,
        MagnetRemoveChannel,
        CrushRibsCount,
        CrushRibsWaviness,
        ScrewHoles,
        ScrewHoleDiameter,
        ScrewHoleDepth,
        SequentialBridging,
        SequentialBridgingLayerHeight,
        StackingLip,
        StackingLipTopLedge,
            StackingLipVerticalSection,
        StackingLipBottomChamfer,
        WallThickness,
        InsideFilletRadius,
        DividerThickness,
        DividerCustomX,
        DividerCustomY,
        DividerCustomXHeight,
        DividerCustomYHeight,
        LabelShelfWidth,
        LabelShelfLength,
        LabelShelfAngle,
        LabelShelfStackingOffset,
        LabelShelfVerticalThickness,
        ScoopRadius,
        EcoBaseThickness,
        EcoBaseWallThickness,
        EcoWallThickness,
        EcoInsideFilletRadius,
        BaseplateBottomChamfer,
        BaseplateVerticalSection,
        BaseplateTopChamfer,
        BaseplateBottomRadius,
        BaseplateVerticalRadius,
        BaseplateOuterRadius,
        BaseplateTopLedgeWidth,
        MagnetBase,
        MagnetBaseHole,
        MagnetChamfer,
        MagnetEdgeThickness,
        ScrewTogetherBaseThickness,
        ScrewBottomChamfer,
        ConnectionHoleDiameter,
    ];

    /// Key as stored in the JSON map.
    pub fn name(&self) -> &'static str {
        match self {
            GridSizeX => "GridSizeX",
            GridSizeY => "GridSizeY",
            IndependentGridSize => "IndependentGridSize",
            HeightUnitValue => "HeightUnitValue",
            Clearance => "Clearance",
            GridUnitsX => "GridUnitsX",
            GridUnitsY => "GridUnitsY",
            HeightUnits => "HeightUnits",
            BinBaseBottomChamfer => "BinBaseBottomChamfer",
            BinBaseVerticalSection => "BinBaseVerticalSection",
            BinBaseTopChamfer => "BinBaseTopChamfer",
            BinBottomRadius => "BinBottomRadius",
            BinVerticalRadius => "BinVerticalRadius",
            BinOuterRadius => "BinOuterRadius",
            MagnetHoles => "MagnetHoles",
            MagnetHoleDiameter => "MagnetHoleDiameter",
            MagnetHoleDepth => "MagnetHoleDepth",
            MagnetHoleDistanceFromEdge => "MagnetHoleDistanceFromEdge",
            MagnetRemoveChannel => "MagnetRemoveChannel",
            CrushRibsCount => "CrushRibsCount",
            CrushRibsWaviness => "CrushRibsWaviness",
            ScrewHoles => "ScrewHoles",
            ScrewHoleDiameter => "ScrewHoleDiameter",
            ScrewHoleDepth => "ScrewHoleDepth",
            SequentialBridging => "SequentialBridging",
            SequentialBridgingLayerHeight => "SequentialBridgingLayerHeight",
            StackingLip => "StackingLip",
            StackingLipTopLedge => "StackingLipTopLedge",
            StackingLipVerticalSection => "StackingLipVerticalSection",
            StackingLipBottomChamfer => "StackingLipBottomChamfer",
            WallThickness => "WallThickness",
            InsideFilletRadius => "InsideFilletRadius",
            DividerThickness => "DividerThickness",
            DividerCustomX => "DividerCustomX",
            DividerCustomY => "DividerCustomY",
            DividerCustomXHeight => "DividerCustomXHeight",
            DividerCustomYHeight => "DividerCustomYHeight",
            LabelShelfWidth => "LabelShelfWidth",
            LabelShelfLength => "LabelShelfLength",
            LabelShelfAngle => "LabelShelfAngle",
            LabelShelfStackingOffset => "LabelShelfStackingOffset",
            LabelShelfVerticalThickness => "LabelShelfVerticalThickness",
            ScoopRadius => "ScoopRadius",
            EcoBaseThickness => "EcoBaseThickness",
            EcoBaseWallThickness => "EcoBaseWallThickness",
            EcoWallThickness => "EcoWallThickness",
            EcoInsideFilletRadius => "EcoInsideFilletRadius",
            BaseplateBottomChamfer => "BaseplateBottomChamfer",
            BaseplateVerticalSection => "BaseplateVerticalSection",
            BaseplateTopChamfer => "BaseplateTopChamfer",
            BaseplateBottomRadius => "BaseplateBottomRadius",
            BaseplateVerticalRadius => "BaseplateVerticalRadius",
            BaseplateOuterRadius => "BaseplateOuterRadius",
            BaseplateTopLedgeWidth => "BaseplateTopLedgeWidth",
            MagnetBase => "MagnetBase",
            MagnetBaseHole => "MagnetBaseHole",
            MagnetChamfer => "MagnetChamfer",
            MagnetEdgeThickness => "MagnetEdgeThickness",
            ScrewTogetherBaseThickness => "ScrewTogetherBaseThickness",
            ScrewBottomChamfer => "ScrewBottomChamfer",
            ConnectionHoleDiameter => "ConnectionHoleDiameter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            IndependentGridSize
                | MagnetHoles
                | MagnetRemoveChannel
                | ScrewHoles
                | SequentialBridging
                | StackingLip
                | DividerCustomX
                | DividerCustomY
        )
    }

    fn factory_value(&self) -> PreferenceValue {
        use PreferenceValue::{Flag, Number};
        match self {
            GridSizeX | GridSizeY => Number(GRID_SIZE),
            IndependentGridSize => Flag(false),
            HeightUnitValue => Number(HEIGHT_UNIT),
            Clearance => Number(CLEARANCE),
            GridUnitsX | GridUnitsY => Number(GRID_UNITS as f64),
            HeightUnits => Number(HEIGHT_UNITS as f64),
            BinBaseBottomChamfer => Number(BIN_BASE_BOTTOM_CHAMFER),
            BinBaseVerticalSection => Number(BIN_BASE_VERTICAL_SECTION),
            BinBaseTopChamfer => Number(BIN_BASE_TOP_CHAMFER),
            BinBottomRadius => Number(BIN_BOTTOM_RADIUS),
            BinVerticalRadius => Number(BIN_VERTICAL_RADIUS),
            BinOuterRadius => Number(BIN_OUTER_RADIUS),
            MagnetHoles => Flag(false),
            MagnetHoleDiameter => Number(MAGNET_HOLE_DIAMETER),
            MagnetHoleDepth => Number(MAGNET_HOLE_DEPTH),
            MagnetHoleDistanceFromEdge => Number(MAGNET_HOLE_DISTANCE_FROM_EDGE),
            MagnetRemoveChannel => Flag(false),
            CrushRibsCount => Number(CRUSH_RIBS_COUNT as f64),
            CrushRibsWaviness => Number(CRUSH_RIBS_WAVINESS),
            ScrewHoles => Flag(false),
            ScrewHoleDiameter => Number(SCREW_HOLE_DIAMETER),
            ScrewHoleDepth => Number(SCREW_HOLE_DEPTH),
            SequentialBridging => Flag(false),
            SequentialBridgingLayerHeight => Number(SEQUENTIAL_BRIDGING_LAYER_HEIGHT),
            StackingLip => Flag(true),
            StackingLipTopLedge => Number(STACKING_LIP_TOP_LEDGE),
            StackingLipVerticalSection => Number(STACKING_LIP_VERTICAL_SECTION),
            StackingLipBottomChamfer => Number(STACKING_LIP_BOTTOM_CHAMFER),
            WallThickness => Number(WALL_THICKNESS),
            InsideFilletRadius => Number(INSIDE_FILLET_RADIUS),
            DividerThickness => Number(DIVIDER_THICKNESS),
            DividerCustomX | DividerCustomY => Flag(false),
            DividerCustomXHeight | DividerCustomYHeight => Number(0.0),
            LabelShelfWidth => Number(LABEL_SHELF_WIDTH),
            LabelShelfLength => Number(LABEL_SHELF_LENGTH),
            LabelShelfAngle => Number(LABEL_SHELF_ANGLE),
            LabelShelfStackingOffset => Number(LABEL_SHELF_STACKING_OFFSET),
            LabelShelfVerticalThickness => Number(LABEL_SHELF_VERTICAL_THICKNESS),
            ScoopRadius => Number(SCOOP_RADIUS),
            EcoBaseThickness => Number(ECO_BASE_THICKNESS),
            EcoBaseWallThickness => Number(ECO_BASE_WALL_THICKNESS),
            EcoWallThickness => Number(ECO_WALL_THICKNESS),
            EcoInsideFilletRadius => Number(ECO_INSIDE_FILLET_RADIUS),
            BaseplateBottomChamfer => Number(BASEPLATE_BOTTOM_CHAMFER),
            BaseplateVerticalSection => Number(BASEPLATE_VERTICAL_SECTION),
            BaseplateTopChamfer => Number(BASEPLATE_TOP_CHAMFER),
            BaseplateBottomRadius => Number(BASEPLATE_BOTTOM_RADIUS),
            BaseplateVerticalRadius => Number(BASEPLATE_VERTICAL_RADIUS),
            BaseplateOuterRadius => Number(BASEPLATE_OUTER_RADIUS),
            BaseplateTopLedgeWidth => Number(BASEPLATE_TOP_LEDGE_WIDTH),
            MagnetBase => Number(MAGNET_BASE),
            MagnetBaseHole => Number(MAGNET_BASE_HOLE),
            MagnetChamfer => Number(MAGNET_CHAMFER),
            MagnetEdgeThickness => Number(MAGNET_EDGE_THICKNESS),
            ScrewTogetherBaseThickness => Number(SCREW_TOGETHER_BASE_THICKNESS),
            ScrewBottomChamfer => Number(SCREW_BOTTOM_CHAMFER),
            ConnectionHoleDiameter => Number(CONNECTION_HOLE_DIAMETER),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Flag(bool),
    Number(f64),
}

impl PreferenceValue {
    fn kind(&self) -> &'static str {
        match self {
            PreferenceValue::Flag(_) => "boolean",
            PreferenceValue::Number(_) => "number",
        }
    }
}

/// A set of preference values, keyed by [`PreferenceKey::name`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceStore {
    values: BTreeMap<String, PreferenceValue>,
}

impl PreferenceStore {
    /// A store with no values. Every numeric lookup fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Canonical Gridfinity dimensions for every key.
    pub fn factory() -> Self {
        let values = PreferenceKey::ALL
            .iter()
            .map(|k| (k.name().to_string(), k.factory_value()))
            .collect();
        Self { values }
    }

    /// Parses a store. Unknown keys are rejected so typos do not silently
    /// fall back to a default.
    pub fn from_json(json: &str) -> Result<Self, PreferenceError> {
        let store: PreferenceStore =
            serde_json::from_str(json).map_err(|e| PreferenceError::Parse(e.to_string()))?;
        if let Some(key) = store
            .values
            .keys()
            .find(|k| PreferenceKey::from_name(k).is_none())
        {
            return Err(PreferenceError::UnknownKey { key: key.clone() });
        }
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, PreferenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PreferenceError::Serialize(e.to_string()))
    }

    /// Factory values overlaid with whatever `json` sets.
    pub fn factory_with_overrides(json: &str) -> Result<Self, PreferenceError> {
        let overrides = Self::from_json(json)?;
        let mut store = Self::factory();
        store.values.extend(overrides.values);
        Ok(store)
    }

    pub fn set(&mut self, key: PreferenceKey, value: PreferenceValue) {
        self.values.insert(key.name().to_string(), value);
    }

    pub fn unset(&mut self, key: PreferenceKey) {
        self.values.remove(key.name());
    }

    pub fn number(&self, key: PreferenceKey) -> Result<f64, PreferenceError> {
        match self.values.get(key.name()) {
            Some(PreferenceValue::Number(v)) => Ok(*v),
            Some(other) => Err(PreferenceError::WrongType {
                key: key.name().to_string(),
                expected: "number",
                found: other.kind(),
            }),
            None => Err(PreferenceError::Missing {
                key: key.name().to_string(),
            }),
        }
    }

    /// Boolean preferences read as `false` when absent or not boolean.
    pub fn flag(&self, key: PreferenceKey) -> bool {
        matches!(self.values.get(key.name()), Some(PreferenceValue::Flag(true)))
    }

    pub fn integer(&self, key: PreferenceKey) -> Result<i64, PreferenceError> {
        self.number(key).map(|v| v.round() as i64)
    }

    pub fn grid_size_x(&self) -> Result<f64, PreferenceError> {
        self.number(GridSizeX)
    }

    /// Y pitch, equal to the x pitch unless independent sizes are enabled.
    pub fn grid_size_y(&self) -> Result<f64, PreferenceError> {
        if self.flag(IndependentGridSize) {
            self.number(GridSizeY)
        } else {
            self.number(GridSizeX)
        }
    }

    /// Custom x divider height, or 0 (full height) unless enabled.
    pub fn divider_custom_x_height(&self) -> Result<f64, PreferenceError> {
        if self.flag(DividerCustomX) {
            self.number(DividerCustomXHeight)
        } else {
            Ok(0.0)
        }
    }

    pub fn divider_custom_y_height(&self) -> Result<f64, PreferenceError> {
        if self.flag(DividerCustomY) {
            self.number(DividerCustomYHeight)
        } else {
            Ok(0.0)
        }
    }
}

static ACTIVE: OnceLock<RwLock<Arc<PreferenceStore>>> = OnceLock::new();

fn active() -> &'static RwLock<Arc<PreferenceStore>> {
    ACTIVE.get_or_init(|| RwLock::new(Arc::new(PreferenceStore::factory())))
}

/// The active store, factory defaults until the first [`reload`].
pub fn current() -> Arc<PreferenceStore> {
    match active().read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Replaces the active store.
pub fn reload(store: PreferenceStore) {
    let mut guard = match active().write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Arc::new(store);
    info!(namespace = NAMESPACE, "preferences reloaded");
}
