//! Closed-form quantities behind a segment's B-integral.
//!
//! All inputs and outputs are SI. The contribution of a single segment is
//!
//! $$
//! B = \frac{2\pi}{\lambda} \, n_2 \, \frac{P_{\text{peak}}}{A_{\text{eff}}} \, L_{\text{eff}}
//! $$
//!
//! with $P_{\text{peak}} = P_{\text{avg}} / (\tau f_{\text{rep}})$,
//! $A_{\text{eff}} = \tfrac{\pi}{4} \text{MFD}^2$ and the gain-weighted
//! effective length
//!
//! $$ L_{\text{eff}} = L \, \frac{G - 1}{\ln G}. $$

use std::f64::consts::PI;

/// Gains closer to 1 than this use the flat-gain limit `L_eff = L`.
pub const UNITY_GAIN_TOLERANCE: f64 = 1e-9;

/// Pulse duration × repetition rate (dimensionless).
pub fn duty_cycle(pulse_duration_s: f64, repetition_rate_hz: f64) -> f64 {
    pulse_duration_s * repetition_rate_hz
}

/// Peak power of a pulse train from its average power (W).
pub fn peak_power(average_power_w: f64, duty_cycle: f64) -> f64 {
    average_power_w / duty_cycle
}

/// Effective area of a circular mode (m²).
pub fn effective_area(mode_field_diameter_m: f64) -> f64 {
    (PI / 4.0) * mode_field_diameter_m.powi(2)
}

/// Gain-weighted effective length (m).
///
/// `(G - 1) / ln G` has a removable singularity at `G = 1`; within
/// `tolerance` of unity the limit `L` is returned. Returns `None` when the
/// logarithm is undefined (`G <= 0`).
pub fn effective_length(length_m: f64, gain: f64, tolerance: f64) -> Option<f64> {
    if (gain - 1.0).abs() < tolerance {
        Some(length_m)
    } else if gain <= 0.0 {
        None
    } else {
        Some(length_m * (gain - 1.0) / gain.ln())
    }
}

/// Nonlinear phase of one segment (rad).
pub fn b_integral(
    wavelength_m: f64,
    n2: f64,
    peak_power_w: f64,
    effective_area_m2: f64,
    effective_length_m: f64,
) -> f64 {
    (2.0 * PI / wavelength_m) * n2 * (peak_power_w / effective_area_m2) * effective_length_m
}
