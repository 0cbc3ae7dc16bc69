//! Linked power fields: input power, gain and output power.
//!
//! The three fields obey
//!
//! $$ P_{\text{out}} = P_{\text{in}} \cdot G $$
//!
//! and the user may edit any of them in any order. The solver recomputes
//! the dependent field after each edit:
//!
//! | Edited field | Derived field | Mode |
//! |--------------|---------------|------|
//! | input power  | output power  | [`DriveMode::InputDriven`] |
//! | gain         | output power  | [`DriveMode::InputDriven`] |
//! | output power | gain          | [`DriveMode::OutputDriven`] |
//!
//! Input power is never derived. Missing or non-numeric fields are not an
//! error here; they leave the derived field unset. Range checks happen in
//! [`crate::cascade`] at evaluation time.

use crate::types::{DriveMode, GainValue, LinkedField, LinkedPowers, Segment};

/// Recomputes a segment's dependent power field after an edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentFieldSolver;

impl SegmentFieldSolver {
    pub fn new() -> Self {
        Self
    }

    /// Return `powers` with the derived field recomputed for an edit to `edited`.
    ///
    /// The edited field and input power are passed through untouched. The
    /// returned [`LinkedPowers::mode`] tells the caller which field is now
    /// derived.
    pub fn solve(&self, powers: LinkedPowers, edited: LinkedField) -> LinkedPowers {
        let mode = DriveMode::after_edit(edited);
        let mut solved = LinkedPowers { mode, ..powers };

        match mode {
            DriveMode::InputDriven => {
                solved.output_power_w = forward_output(powers.input_power_w, powers.gain);
            }
            DriveMode::OutputDriven => {
                solved.gain = inverse_gain(powers.input_power_w, powers.output_power_w);
            }
        }
        solved
    }

    /// Apply [`solve`](Self::solve) to the power fields of a whole segment.
    pub fn solve_segment(&self, segment: &Segment, edited: LinkedField) -> Segment {
        Segment {
            powers: self.solve(segment.powers, edited),
            ..segment.clone()
        }
    }
}

/// `P_in · G` when both are computable.
fn forward_output(input_power_w: Option<f64>, gain: Option<GainValue>) -> Option<f64> {
    let p_in = numeric(input_power_w)?;
    let g = gain.and_then(GainValue::linear).filter(|g| g.is_finite())?;
    Some(p_in * g)
}

/// `P_out / P_in`, or the infinite sentinel for output from zero input.
fn inverse_gain(input_power_w: Option<f64>, output_power_w: Option<f64>) -> Option<GainValue> {
    let p_in = numeric(input_power_w)?;
    let p_out = numeric(output_power_w)?;

    if p_in > 0.0 {
        Some(GainValue::Linear(p_out / p_in))
    } else if p_in == 0.0 && p_out > 0.0 {
        Some(GainValue::Infinite)
    } else {
        None
    }
}

fn numeric(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Read a numeric field from free text.
///
/// Blank, non-numeric and `NaN` input are unset.
pub fn parse_field(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Read a gain from free text, accepting `inf` / `Infinity` as the sentinel.
pub fn parse_gain(text: &str) -> Option<GainValue> {
    parse_field(text).and_then(GainValue::from_f64)
}
