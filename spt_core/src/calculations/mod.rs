//! # SPT Calculations
//!
//! Numeric side of the engine. Everything here is a pure function over
//! [`Sample`](crate::sounding::Sample) slices or plain numbers:
//!
//! - [`nbr`] - NSPT, water-table correction, bearing capacity, strength
//!   parameters, sampler and energy checks
//! - [`statistics`] - Sounding-level aggregations: summary, histogram, refusal,
//!   soft layers, foundation depth, admissible stress, liquefaction screening
//!
//! Inputs and outputs are JSON-serializable so the report and the CLI can pass
//! them through untouched.

pub mod nbr;
pub mod statistics;

pub use nbr::{RefusalCheck, DEFAULT_BLOW_LIMIT};
pub use statistics::{
    AdmissibleStress, DepthRun, ImpenetrableLayer, LiquefactionRisk, NsptChart, ResistanceProfile,
    RiskLevel, SampleRefusal, SoundingAnalysis, SummaryStatistics,
};
