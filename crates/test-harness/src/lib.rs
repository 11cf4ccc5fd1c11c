//! Test harness for Gridfinity documents.
//!
//! Provides programmatic tools for scripting multi-object documents through
//! the command surface, verifying every solid, and generating diagnostic
//! output.
//!
//! # Key Components
//!
//! - [`DocumentBuilder`]: Fluent API for building and verifying documents
//! - [`oracle`]: Verification functions returning pass/fail verdicts
//! - [`report`]: Structured text document descriptions
//! - [`scenarios`]: Reference volumes for default objects
//! - [`helpers`]: Error type, command mapping, float comparison
//! - [`assertions`]: Rich assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod scenarios;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::DocumentReport;
pub use workflow::DocumentBuilder;
