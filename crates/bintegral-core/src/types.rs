//! Core types shared across bintegral.
//!
//! A [`Segment`] is one fibre span as the user entered it. Every field is
//! optional because the presentation layer may hand over half-filled rows;
//! the evaluator decides what is missing. Results come back as a
//! [`CascadeResult`], which owns no reference to the segments it was built
//! from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Linear power gain of a segment.
///
/// A segment whose input power is zero but whose output power is positive
/// has mathematically infinite gain. That case is carried as a distinct tag
/// rather than as `f64::INFINITY`, so it cannot leak into arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainValue {
    /// A numeric, linear (not dB) gain factor. Values below 1 are net loss.
    Linear(f64),
    /// Output power with zero input power.
    Infinite,
}

impl GainValue {
    /// Map a raw float onto a gain value.
    ///
    /// `NaN` is not a gain at all and maps to `None`; `+∞` maps to the
    /// [`GainValue::Infinite`] sentinel.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else if value == f64::INFINITY {
            Some(Self::Infinite)
        } else {
            Some(Self::Linear(value))
        }
    }

    /// The numeric gain, if it is not the infinite sentinel.
    pub fn linear(self) -> Option<f64> {
        match self {
            Self::Linear(g) => Some(g),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl fmt::Display for GainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear(g) => write!(f, "{g}"),
            Self::Infinite => f.write_str("Infinity"),
        }
    }
}

/// One of the three power fields tied together by `P_out = P_in · G`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedField {
    InputPower,
    Gain,
    OutputPower,
}

impl fmt::Display for LinkedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InputPower => "input power",
            Self::Gain => "gain",
            Self::OutputPower => "output power",
        };
        f.write_str(name)
    }
}

/// Which side of the power relation the user is currently driving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Input power and gain are edited; output power is derived and read-only.
    #[default]
    InputDriven,
    /// Output power is edited; gain is derived.
    OutputDriven,
}

impl DriveMode {
    /// Mode entered after the user edits `field`.
    pub fn after_edit(field: LinkedField) -> Self {
        match field {
            LinkedField::OutputPower => Self::OutputDriven,
            LinkedField::InputPower | LinkedField::Gain => Self::InputDriven,
        }
    }

    /// The field the solver recomputes in this mode.
    pub fn derived_field(self) -> LinkedField {
        match self {
            Self::InputDriven => LinkedField::OutputPower,
            Self::OutputDriven => LinkedField::Gain,
        }
    }

    /// Whether a UI should lock `field` against direct edits.
    ///
    /// Only output power is ever locked; gain stays editable in
    /// output-driven mode, and editing it flips back to input-driven.
    pub fn is_read_only(self, field: LinkedField) -> bool {
        self == Self::InputDriven && field == LinkedField::OutputPower
    }
}

/// The three linked power fields of a segment plus its drive mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedPowers {
    /// Average power entering the segment (W).
    pub input_power_w: Option<f64>,
    /// Linear power gain.
    pub gain: Option<GainValue>,
    /// Average power leaving the segment (W).
    pub output_power_w: Option<f64>,
    #[serde(default)]
    pub mode: DriveMode,
}

/// A single fibre span in the cascade.
///
/// Units follow the lab convention: powers in W, wavelength in nm, pulse
/// duration in ps, repetition rate in MHz, length in m and mode field
/// diameter in µm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(flatten)]
    pub powers: LinkedPowers,
    /// Vacuum wavelength (nm).
    pub wavelength_nm: Option<f64>,
    /// Pulse width (ps).
    pub pulse_duration_ps: Option<f64>,
    /// Pulse repetition rate (MHz).
    pub repetition_rate_mhz: Option<f64>,
    /// Physical fibre length (m).
    pub length_m: Option<f64>,
    /// Mode field diameter (µm).
    pub mode_field_diameter_um: Option<f64>,
}

impl Segment {
    /// Build a fully specified, input-driven segment.
    ///
    /// Output power is set to `input_power_w * gain`.
    pub fn new(
        input_power_w: f64,
        gain: f64,
        wavelength_nm: f64,
        pulse_duration_ps: f64,
        repetition_rate_mhz: f64,
        length_m: f64,
        mode_field_diameter_um: f64,
    ) -> Self {
        Self {
            powers: LinkedPowers {
                input_power_w: Some(input_power_w),
                gain: Some(GainValue::Linear(gain)),
                output_power_w: Some(input_power_w * gain),
                mode: DriveMode::InputDriven,
            },
            wavelength_nm: Some(wavelength_nm),
            pulse_duration_ps: Some(pulse_duration_ps),
            repetition_rate_mhz: Some(repetition_rate_mhz),
            length_m: Some(length_m),
            mode_field_diameter_um: Some(mode_field_diameter_um),
        }
    }
}

/// The nonlinear phase picked up in one segment, with the intermediate
/// quantities it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentContribution {
    /// 1-based position of the segment in the cascade.
    pub index: usize,
    /// Nonlinear phase contribution (rad).
    pub b_integral_rad: f64,
    /// Peak input power (W).
    pub peak_power_w: f64,
    /// Effective mode area (m²).
    pub effective_area_m2: f64,
    /// Gain-weighted effective length (m).
    pub effective_length_m: f64,
}

impl fmt::Display for SegmentContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B-Integral (Fiber #{}): {:.3} rad", self.index, self.b_integral_rad)
    }
}

/// Output of one cascade evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Per-segment contributions, in propagation order.
    pub contributions: Vec<SegmentContribution>,
    /// Sum of all contributions (rad).
    pub total_rad: f64,
}

impl CascadeResult {
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Whether the accumulated phase is above a design budget (rad).
    pub fn exceeds(&self, threshold_rad: f64) -> bool {
        self.total_rad > threshold_rad
    }

    /// The segment contributing the most nonlinear phase.
    pub fn max_contribution(&self) -> Option<&SegmentContribution> {
        self.contributions
            .iter()
            .max_by(|a, b| a.b_integral_rad.total_cmp(&b.b_integral_rad))
    }
}

impl fmt::Display for CascadeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.contributions {
            writeln!(f, "{c}")?;
        }
        write!(f, "Total B-Integral: {:.3} rad", self.total_rad)
    }
}
