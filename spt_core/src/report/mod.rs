//! # Report Assembly
//!
//! Turns a [`SoundingBundle`](crate::bundle::SoundingBundle) into the flat
//! [`ReportDocument`] a renderer consumes. The renderer does no domain math:
//! every number it prints is formatted here.
//!
//! ## Example
//!
//! ```rust
//! use spt_core::bundle::SoundingBundle;
//! use spt_core::config::SptConfig;
//! use spt_core::report::assemble_report;
//! use spt_core::sounding::{ResponsibleTechnician, Sample, Sounding};
//!
//! let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
//! bundle.set_responsible(ResponsibleTechnician::new("Ana Souza", "SP-123456", "Engenheira Civil"));
//! bundle.samples.push(Sample::new(1, 1.0, Some(2), 3, 4));
//!
//! let doc = assemble_report(&bundle, &SptConfig::default()).unwrap();
//! assert_eq!(doc.samples[0].depth_range, "1.00 - 1.30");
//! ```

mod assembler;
pub mod document;

pub use assembler::{assemble_report, assemble_report_at, NORMATIVE_REFERENCES};
pub use document::ReportDocument;

use chrono::{NaiveDate, NaiveDateTime};

/// dd/mm/YYYY
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// dd/mm/YYYY HH:MM
pub fn format_date_time(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

/// `Sondagem_<code>_<YYYYmmdd_HHMMSS>.pdf`
pub fn report_file_name(code: &str, at: NaiveDateTime) -> String {
    format!("Sondagem_{}_{}.pdf", code, at.format("%Y%m%d_%H%M%S"))
}
