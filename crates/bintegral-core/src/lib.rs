//! # bintegral Core
//!
//! The numerical backbone of bintegral. This crate estimates the nonlinear
//! phase (B-integral) a laser pulse accumulates while propagating through a
//! cascade of fibre segments, each of which may amplify or attenuate it.
//!
//! ## Architecture
//!
//! Two pure components, with no shared state beyond the caller-owned
//! segment list:
//!
//! - [`linked::SegmentFieldSolver`] keeps a segment's input power, gain and
//!   output power consistent whenever one of them is edited.
//! - [`cascade::CascadeEvaluator`] validates an ordered list of segments and
//!   sums their B-integral contributions.
//!
//! ## Modules
//!
//! - [`types`] — Segment records, the tagged gain value and result containers.
//! - [`units`] — Conversions from lab units (nm, ps, MHz, µm) to SI.
//! - [`linked`] — The input/gain/output power solver.
//! - [`cascade`] — Validation and B-integral evaluation over a cascade.

pub mod cascade;
pub mod linked;
pub mod types;
pub mod units;

pub use cascade::{CascadeEvaluator, InputFault, SegmentField, ValidationError};
pub use linked::SegmentFieldSolver;
pub use types::{
    CascadeResult, DriveMode, GainValue, LinkedField, LinkedPowers, Segment, SegmentContribution,
};
