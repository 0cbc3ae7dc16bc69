//! Unit conversions.
//!
//! Segment parameters are entered in the units a laser engineer reads off a
//! datasheet. The evaluator works in SI throughout, so every field passes
//! through one of these helpers first.

/// Nanometres to metres.
pub const NM_TO_M: f64 = 1e-9;
/// Picoseconds to seconds.
pub const PS_TO_S: f64 = 1e-12;
/// Megahertz to hertz.
pub const MHZ_TO_HZ: f64 = 1e6;
/// Micrometres to metres.
pub const UM_TO_M: f64 = 1e-6;

/// Wavelength (nm) to metres.
pub fn wavelength_m(wavelength_nm: f64) -> f64 {
    wavelength_nm * NM_TO_M
}

/// Pulse duration (ps) to seconds.
pub fn pulse_duration_s(pulse_duration_ps: f64) -> f64 {
    pulse_duration_ps * PS_TO_S
}

/// Repetition rate (MHz) to hertz.
pub fn repetition_rate_hz(repetition_rate_mhz: f64) -> f64 {
    repetition_rate_mhz * MHZ_TO_HZ
}

/// Mode field diameter (µm) to metres.
pub fn mode_field_diameter_m(mfd_um: f64) -> f64 {
    mfd_um * UM_TO_M
}
