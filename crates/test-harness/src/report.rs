//! Structured text document reports.
//!
//! Reports are plain text so a failing test prints something a person can
//! read at a glance.

use std::fmt;

use brep_kernel::KernelIntrospect;
use gridfinity_engine::{Document, ObjectKind};

use crate::oracle::{self, OracleVerdict};

/// A complete document report.
pub struct DocumentReport {
    pub name: String,
    pub entries: Vec<ObjectEntry>,
}

/// A single object's report entry.
pub struct ObjectEntry {
    pub index: usize,
    pub name: String,
    pub kind: ObjectKind,
    pub volume: Option<f64>,
    pub bounding_box: Option<([f64; 3], [f64; 3])>,
    pub diagnostics: Vec<String>,
    pub oracle_results: Vec<OracleVerdict>,
}

impl DocumentReport {
    /// Measure every object in `doc` and run its oracles.
    pub fn build(doc: &Document, kernel: &dyn KernelIntrospect) -> Self {
        let entries = doc
            .objects()
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let solid = object.shape;
                ObjectEntry {
                    index,
                    name: object.name.clone(),
                    kind: object.kind,
                    volume: solid.and_then(|s| kernel.volume(&s).ok()),
                    bounding_box: solid
                        .and_then(|s| kernel.bounding_box(&s).ok())
                        .map(|bb| (bb.min, bb.max)),
                    diagnostics: object
                        .diagnostics
                        .iter()
                        .map(|d| format!("{:?}: {}", d.severity, d.message))
                        .collect(),
                    oracle_results: oracle::run_all(kernel, object),
                }
            })
            .collect();
        Self {
            name: doc.name.clone(),
            entries,
        }
    }

    pub fn failed_oracles(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.oracle_results.iter().filter(|v| !v.passed).count())
            .sum()
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Gridfinity Document Report: {} ===\n\n", self.name));

        let with_solid = self.entries.iter().filter(|e| e.volume.is_some()).count();
        out.push_str(&format!(
            "Objects ({} total, {} built, {} oracle failures):\n",
            self.entries.len(),
            with_solid,
            self.failed_oracles(),
        ));

        for entry in &self.entries {
            out.push_str(&format!("  [{}] {} ({:?})\n", entry.index, entry.name, entry.kind));
            match entry.volume {
                Some(v) => out.push_str(&format!("      volume: {v:.2} mm³\n")),
                None => out.push_str("      volume: (no solid)\n"),
            }
            if let Some((min, max)) = entry.bounding_box {
                out.push_str(&format!(
                    "      bbox: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})\n",
                    min[0], min[1], min[2], max[0], max[1], max[2],
                ));
            }
            for d in &entry.diagnostics {
                out.push_str(&format!("      ! {d}\n"));
            }
            for v in &entry.oracle_results {
                let mark = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("      {mark} {}: {}\n", v.oracle_name, v.detail));
            }
        }
        out
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
