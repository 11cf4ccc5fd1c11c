//! Reference volumes of default objects, measured with an exact B-rep kernel.

use gridfinity_engine::ObjectKind;
use gridfinity_types::ParamValue;

/// Relative tolerance every reference volume is checked against.
pub const REFERENCE_REL_TOL: f64 = 1e-3;

/// A parameter change applied after creation.
#[derive(Debug, Clone, Copy)]
pub enum Tweak {
    Flag(&'static str, bool),
    Length(&'static str, f64),
}

impl Tweak {
    pub fn name(&self) -> &'static str {
        match self {
            Tweak::Flag(name, _) | Tweak::Length(name, _) => name,
        }
    }

    pub fn value(&self) -> ParamValue {
        match *self {
            Tweak::Flag(_, b) => ParamValue::Bool(b),
            Tweak::Length(_, v) => ParamValue::Length(v),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceScenario {
    pub name: &'static str,
    pub kind: ObjectKind,
    pub tweaks: &'static [Tweak],
    /// Expected volume in mm³.
    pub volume: f64,
}

const NO_MAGNETS: Tweak = Tweak::Flag("MagnetHoles", false);

pub static REFERENCE_SCENARIOS: [ReferenceScenario; 8] = [
    ReferenceScenario {
        name: "bin_blank",
        kind: ObjectKind::BinBlank,
        tweaks: &[NO_MAGNETS, Tweak::Flag("StackingLip", true), Tweak::Length("RecessedTopDepth", 0.0)],
        volume: 288887.41,
    },
    ReferenceScenario {
        name: "bin_blank_recessed",
        kind: ObjectKind::BinBlank,
        tweaks: &[NO_MAGNETS, Tweak::Length("RecessedTopDepth", 3.0)],
        volume: 270272.26,
    },
    ReferenceScenario {
        name: "bin_blank_no_lip",
        kind: ObjectKind::BinBlank,
        tweaks: &[NO_MAGNETS, Tweak::Flag("StackingLip", false)],
        volume: 286724.95,
    },
    ReferenceScenario {
        name: "simple_storage_bin",
        kind: ObjectKind::SimpleStorageBin,
        tweaks: &[NO_MAGNETS],
        volume: 58187.69,
    },
    ReferenceScenario {
        name: "eco_bin",
        kind: ObjectKind::EcoBin,
        tweaks: &[NO_MAGNETS],
        volume: 24728.98,
    },
    ReferenceScenario {
        name: "baseplate",
        kind: ObjectKind::Baseplate,
        tweaks: &[],
        volume: 5034.23,
    },
    ReferenceScenario {
        name: "magnet_baseplate",
        kind: ObjectKind::MagnetBaseplate,
        tweaks: &[],
        volume: 12606.10,
    },
    ReferenceScenario {
        name: "screw_together_baseplate",
        kind: ObjectKind::ScrewTogetherBaseplate,
        tweaks: &[],
        volume: 22897.35,
    },
];

/// Look up a scenario by name.
pub fn scenario(name: &str) -> Option<&'static ReferenceScenario> {
    REFERENCE_SCENARIOS.iter().find(|s| s.name == name)
}
