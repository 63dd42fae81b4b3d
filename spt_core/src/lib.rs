//! # spt_core - SPT Sounding Engine
//!
//! `spt_core` validates, calculates and reports Standard Penetration Test
//! soundings per NBR 6484:2020. Records are plain serde types, so a sounding
//! travels as a single JSON bundle between the CLI, storage and any caller.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: calculators and validators are pure functions
//! - **JSON-First**: all records implement Serialize/Deserialize
//! - **Findings are data**: noncompliance is reported, not raised
//! - **Rich Errors**: structured error types for the failures that remain
//!
//! ## Quick Start
//!
//! ```rust
//! use spt_core::sounding::{Sample, Sounding};
//! use spt_core::validation::validate_sounding;
//!
//! let sounding = Sounding::new("SP-01");
//! let compliance = validate_sounding(&sounding);
//! println!("score {}", compliance.score);
//!
//! let sample = Sample::new(1, 1.0, Some(2), 3, 4);
//! assert_eq!(sample.nspt_2a_3a(), 7);
//! ```
//!
//! ## Modules
//!
//! - [`sounding`] - Sounding, sample, layer, photo and party records
//! - [`calculations`] - NBR 6484 calculators and sample statistics
//! - [`validation`] - Compliance scoring and per-item checks
//! - [`soil`] - Soil classification catalog and NSPT-based suggestions
//! - [`report`] - Report document assembly
//! - [`pdf`] - Typst PDF rendering of an assembled report
//! - [`bundle`] - The sounding bundle file model
//! - [`file_io`] - Atomic bundle saves and versioned loads
//! - [`config`] - Layered settings (defaults, TOML, environment)
//! - [`errors`] - Structured error types

pub mod bundle;
pub mod calculations;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod pdf;
pub mod report;
pub mod soil;
pub mod sounding;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use bundle::SoundingBundle;
pub use config::SptConfig;
pub use errors::{SptError, SptResult};
pub use file_io::{load_bundle, save_bundle};
pub use pdf::render_report_pdf;
pub use report::{assemble_report, ReportDocument};
pub use validation::{review_sounding, validate_sounding, ComplianceResult};
