//! Cascade B-integral evaluation.
//!
//! [`CascadeEvaluator::evaluate`] walks the segments in propagation order,
//! validates each one and sums their nonlinear phase. Evaluation is
//! all-or-nothing: the first invalid segment aborts the run and no partial
//! result is returned.
//!
//! Each segment's input power is taken at face value. Chaining one
//! segment's output into the next segment's input is the caller's job.

pub mod physics;

use std::fmt;

use thiserror::Error;

use crate::types::{CascadeResult, GainValue, Segment, SegmentContribution};
use crate::units;

use self::physics::UNITY_GAIN_TOLERANCE;

/// A physical field of a [`Segment`] that takes part in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentField {
    InputPower,
    Wavelength,
    PulseDuration,
    RepetitionRate,
    Gain,
    Length,
    ModeFieldDiameter,
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InputPower => "input power",
            Self::Wavelength => "wavelength",
            Self::PulseDuration => "pulse duration",
            Self::RepetitionRate => "repetition rate",
            Self::Gain => "gain",
            Self::Length => "length",
            Self::ModeFieldDiameter => "mode field diameter",
        };
        f.write_str(name)
    }
}

/// Why a segment field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFault {
    /// The field is unset.
    Missing,
    /// The field is infinite, or the gain is the infinite sentinel.
    NotFinite,
    /// The field is below zero.
    Negative,
    /// The gain is below zero.
    NegativeGain,
    /// Wavelength or effective area is zero in SI units, which would divide by zero.
    Zero,
}

impl fmt::Display for InputFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Missing => "is missing",
            Self::NotFinite => "is not a finite number",
            Self::Negative => "must be non-negative",
            Self::NegativeGain => "must be non-negative (numerical gain cannot be below zero)",
            Self::Zero => "must be greater than zero",
        };
        f.write_str(text)
    }
}

/// Rejection of an evaluation input. All variants are recoverable by
/// correcting the input and evaluating again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Nonlinear index n2 must be a finite number (got {value})")]
    InvalidNonlinearIndex { value: f64 },

    #[error("Fiber #{index}: {field} {fault}")]
    InvalidSegmentInput {
        index: usize,
        field: SegmentField,
        fault: InputFault,
    },

    #[error("Pulse duration and repetition rate for Fiber #{index} must be greater than zero")]
    DegenerateTiming { index: usize },

    #[error("Fiber #{index}: gain {gain} has no defined effective length (ln G requires G > 0)")]
    InvalidGainForEffectiveLength { index: usize, gain: f64 },

    /// Inputs are individually valid but push a computed quantity out of
    /// the range of `f64` (overflow to infinity or `0 · ∞`).
    #[error("Fiber #{index}: {quantity} is not a finite number for these inputs")]
    NonFiniteResult { index: usize, quantity: &'static str },
}

impl ValidationError {
    /// 1-based index of the offending segment, if the error is segment-level.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::InvalidNonlinearIndex { .. } => None,
            Self::InvalidSegmentInput { index, .. }
            | Self::DegenerateTiming { index }
            | Self::InvalidGainForEffectiveLength { index, .. }
            | Self::NonFiniteResult { index, .. } => Some(*index),
        }
    }
}

/// Validated segment parameters in lab units.
#[derive(Debug, Clone, Copy)]
struct CheckedSegment {
    input_power_w: f64,
    wavelength_nm: f64,
    pulse_duration_ps: f64,
    repetition_rate_mhz: f64,
    gain: f64,
    length_m: f64,
    mode_field_diameter_um: f64,
}

/// Evaluates the total B-integral of a fibre cascade.
#[derive(Debug, Clone)]
pub struct CascadeEvaluator {
    /// Half-width of the band around `G = 1` treated as flat gain.
    pub unity_gain_tolerance: f64,
}

impl Default for CascadeEvaluator {
    fn default() -> Self {
        Self {
            unity_gain_tolerance: UNITY_GAIN_TOLERANCE,
        }
    }
}

impl CascadeEvaluator {
    /// Validate `segments` and compute their B-integral with nonlinear
    /// index `n2` (m²/W).
    ///
    /// `n2` is checked before any segment. Segments are reported by their
    /// 1-based position.
    pub fn evaluate(&self, segments: &[Segment], n2: f64) -> Result<CascadeResult, ValidationError> {
        if !n2.is_finite() {
            return Err(ValidationError::InvalidNonlinearIndex { value: n2 });
        }

        let mut contributions = Vec::with_capacity(segments.len());
        let mut total_rad = 0.0;

        for (i, segment) in segments.iter().enumerate() {
            let contribution = self.evaluate_segment(i + 1, segment, n2)?;
            total_rad = finite(i + 1, "total B-integral", total_rad + contribution.b_integral_rad)?;
            contributions.push(contribution);
        }

        Ok(CascadeResult {
            contributions,
            total_rad,
        })
    }

    /// Contribution of a single segment at 1-based position `index`.
    pub fn evaluate_segment(
        &self,
        index: usize,
        segment: &Segment,
        n2: f64,
    ) -> Result<SegmentContribution, ValidationError> {
        let s = check_segment(index, segment)?;

        let wavelength_m = units::wavelength_m(s.wavelength_nm);
        let pulse_duration_s = units::pulse_duration_s(s.pulse_duration_ps);
        let repetition_rate_hz = units::repetition_rate_hz(s.repetition_rate_mhz);
        let mfd_m = units::mode_field_diameter_m(s.mode_field_diameter_um);

        let duty = physics::duty_cycle(pulse_duration_s, repetition_rate_hz);
        if duty <= 0.0 {
            return Err(ValidationError::DegenerateTiming { index });
        }

        // Timing is checked first so that zero pulse width or rate is always
        // reported as degenerate timing. The zero guards act on the SI values,
        // which can underflow even when the lab-unit input is positive.
        if wavelength_m <= 0.0 {
            return Err(zero_field(index, SegmentField::Wavelength));
        }
        let effective_area_m2 = physics::effective_area(mfd_m);
        if effective_area_m2 <= 0.0 {
            return Err(zero_field(index, SegmentField::ModeFieldDiameter));
        }

        let peak_power_w = finite(index, "peak power", physics::peak_power(s.input_power_w, duty))?;
        let effective_length_m =
            physics::effective_length(s.length_m, s.gain, self.unity_gain_tolerance).ok_or(
                ValidationError::InvalidGainForEffectiveLength {
                    index,
                    gain: s.gain,
                },
            )?;
        let effective_length_m = finite(index, "effective length", effective_length_m)?;

        let b_integral_rad = finite(
            index,
            "B-integral",
            physics::b_integral(
                wavelength_m,
                n2,
                peak_power_w,
                effective_area_m2,
                effective_length_m,
            ),
        )?;

        Ok(SegmentContribution {
            index,
            b_integral_rad,
            peak_power_w,
            effective_area_m2,
            effective_length_m,
        })
    }
}

fn finite(index: usize, quantity: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFiniteResult { index, quantity })
    }
}

fn zero_field(index: usize, field: SegmentField) -> ValidationError {
    ValidationError::InvalidSegmentInput {
        index,
        field,
        fault: InputFault::Zero,
    }
}

/// Require every physical field to be set, finite and non-negative.
///
/// Fields are checked in propagation-table order (input power, wavelength,
/// pulse duration, repetition rate, gain, length, MFD) and the first failure
/// is reported. A negative gain gets its own fault.
fn check_segment(index: usize, segment: &Segment) -> Result<CheckedSegment, ValidationError> {
    let require = |field: SegmentField, value: Option<f64>| -> Result<f64, ValidationError> {
        let fault = match value {
            None => InputFault::Missing,
            Some(v) if !v.is_finite() => InputFault::NotFinite,
            Some(v) if v < 0.0 && field == SegmentField::Gain => InputFault::NegativeGain,
            Some(v) if v < 0.0 => InputFault::Negative,
            Some(v) => return Ok(v),
        };
        Err(ValidationError::InvalidSegmentInput { index, field, fault })
    };

    let gain = segment.powers.gain.map(|g| match g {
        GainValue::Linear(g) => g,
        GainValue::Infinite => f64::INFINITY,
    });

    Ok(CheckedSegment {
        input_power_w: require(SegmentField::InputPower, segment.powers.input_power_w)?,
        wavelength_nm: require(SegmentField::Wavelength, segment.wavelength_nm)?,
        pulse_duration_ps: require(SegmentField::PulseDuration, segment.pulse_duration_ps)?,
        repetition_rate_mhz: require(SegmentField::RepetitionRate, segment.repetition_rate_mhz)?,
        gain: require(SegmentField::Gain, gain)?,
        length_m: require(SegmentField::Length, segment.length_m)?,
        mode_field_diameter_um: require(SegmentField::ModeFieldDiameter, segment.mode_field_diameter_um)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_segment() -> Segment {
        Segment::new(1.0, 1.0, 1030.0, 0.5, 40.0, 1.0, 6.0)
    }

    #[test]
    fn test_reference_segment_contribution() {
        let result = CascadeEvaluator::default()
            .evaluate(&[reference_segment()], 2.7e-20)
            .unwrap();
        let c = &result.contributions[0];
        assert_eq!(c.index, 1);
        assert_relative_eq!(c.peak_power_w, 50_000.0, max_relative = 1e-12);
        assert_relative_eq!(c.effective_length_m, 1.0);
        assert_relative_eq!(c.b_integral_rad, 291.262_135_922_33, max_relative = 1e-10);
        assert_relative_eq!(result.total_rad, c.b_integral_rad);
    }

    #[test]
    fn test_n2_checked_before_segments() {
        let mut bad = reference_segment();
        bad.length_m = Some(-1.0);
        let err = CascadeEvaluator::default().evaluate(&[bad], f64::NAN).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNonlinearIndex { .. }));
        assert_eq!(err.segment_index(), None);
    }

    #[test]
    fn test_negative_gain_has_dedicated_fault() {
        let mut seg = reference_segment();
        seg.powers.gain = Some(GainValue::Linear(-0.5));
        let err = CascadeEvaluator::default().evaluate(&[seg], 2.7e-20).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidSegmentInput {
                index: 1,
                field: SegmentField::Gain,
                fault: InputFault::NegativeGain,
            }
        );
    }

    #[test]
    fn test_infinite_gain_is_rejected() {
        let mut seg = reference_segment();
        seg.powers.gain = Some(GainValue::Infinite);
        let err = CascadeEvaluator::default().evaluate(&[seg], 2.7e-20).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidSegmentInput {
                index: 1,
                field: SegmentField::Gain,
                fault: InputFault::NotFinite,
            }
        );
    }

    #[test]
    fn test_zero_gain_has_no_effective_length() {
        let mut seg = reference_segment();
        seg.powers.gain = Some(GainValue::Linear(0.0));
        let err = CascadeEvaluator::default().evaluate(&[seg], 2.7e-20).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidGainForEffectiveLength { index: 1, .. }
        ));
    }

    #[test]
    fn test_zero_mode_field_diameter_is_rejected() {
        let mut seg = reference_segment();
        seg.mode_field_diameter_um = Some(0.0);
        let err = CascadeEvaluator::default().evaluate(&[seg], 2.7e-20).unwrap_err();
        assert_eq!(err, zero_field(1, SegmentField::ModeFieldDiameter));
    }

    #[test]
    fn test_error_message_names_fiber() {
        let mut seg = reference_segment();
        seg.wavelength_nm = None;
        let err = CascadeEvaluator::default()
            .evaluate(&[reference_segment(), seg], 2.7e-20)
            .unwrap_err();
        assert_eq!(err.to_string(), "Fiber #2: wavelength is missing");
        assert_eq!(err.segment_index(), Some(2));
    }

    #[test]
    fn test_empty_cascade_has_zero_total() {
        let result = CascadeEvaluator::default().evaluate(&[], 2.7e-20).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_rad, 0.0);
    }
}
