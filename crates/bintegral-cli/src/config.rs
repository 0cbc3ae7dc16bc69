//! TOML configuration deserialisation for B-integral jobs.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use bintegral_core::{GainValue, LinkedField, LinkedPowers, Segment, SegmentFieldSolver};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Fibre segments in propagation order.
    #[serde(default)]
    pub segment: Vec<SegmentConfig>,
}

/// Cascade-wide parameters.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Nonlinear refractive index n₂ (m²/W), shared by every segment.
    pub n2: f64,
    /// Optional B-integral budget (rad). The run reports whether it is exceeded.
    #[serde(default)]
    pub threshold_rad: Option<f64>,
}

/// One fibre segment as written in the job file.
///
/// Every field is optional. From the second segment on, omitted fields are
/// taken from the segment before it (see [`resolve_segments`]).
#[derive(Debug, Default, Deserialize)]
pub struct SegmentConfig {
    pub name: Option<String>,
    /// Average input power (W).
    pub input_power: Option<f64>,
    /// Linear gain. `inf` is accepted and tagged as infinite gain.
    pub gain: Option<f64>,
    /// Average output power (W). Given instead of `gain`, it derives the gain.
    pub output_power: Option<f64>,
    /// Wavelength (nm).
    pub wavelength: Option<f64>,
    /// Pulse duration (ps).
    pub pulse_duration: Option<f64>,
    /// Repetition rate (MHz).
    pub repetition_rate: Option<f64>,
    /// Fibre length (m).
    pub length: Option<f64>,
    /// Mode field diameter (µm).
    pub mode_field_diameter: Option<f64>,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save per-segment results as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save results as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// A segment ready for evaluation, with its display label.
#[derive(Debug, Clone)]
pub struct NamedSegment {
    pub name: String,
    pub segment: Segment,
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid job file {}", path.display()))
}

/// Parse a TOML job configuration from a string.
pub fn parse_config(content: &str) -> Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    if config.segment.is_empty() {
        bail!("Job defines no [[segment]] entries");
    }
    Ok(config)
}

/// Turn the configured segments into evaluator input.
///
/// A segment inherits every omitted physical field from the one before it,
/// takes the previous output power as its input power and defaults to unity
/// gain. The first segment has nothing to inherit from. Power fields are
/// then made consistent with [`SegmentFieldSolver`]: a given `output_power`
/// derives the gain, otherwise the gain derives the output power.
pub fn resolve_segments(job: &JobConfig) -> Result<Vec<NamedSegment>> {
    let solver = SegmentFieldSolver::new();
    let mut resolved: Vec<NamedSegment> = Vec::with_capacity(job.segment.len());

    for (i, cfg) in job.segment.iter().enumerate() {
        let index = i + 1;
        if cfg.gain.is_some() && cfg.output_power.is_some() {
            bail!("Fiber #{index}: specify either 'gain' or 'output_power', not both");
        }

        let template = resolved.last().map(|prev| &prev.segment);
        let inherit = |own: Option<f64>, pick: fn(&Segment) -> Option<f64>| {
            own.or_else(|| template.and_then(pick))
        };

        let gain = match cfg.gain {
            Some(g) => GainValue::from_f64(g),
            None if cfg.output_power.is_none() && template.is_some() => Some(GainValue::Linear(1.0)),
            None => None,
        };
        let powers = LinkedPowers {
            input_power_w: inherit(cfg.input_power, |t| t.powers.output_power_w),
            gain,
            output_power_w: cfg.output_power,
            ..Default::default()
        };
        let edited = if cfg.output_power.is_some() {
            LinkedField::OutputPower
        } else {
            LinkedField::Gain
        };

        let segment = Segment {
            powers: solver.solve(powers, edited),
            wavelength_nm: inherit(cfg.wavelength, |t| t.wavelength_nm),
            pulse_duration_ps: inherit(cfg.pulse_duration, |t| t.pulse_duration_ps),
            repetition_rate_mhz: inherit(cfg.repetition_rate, |t| t.repetition_rate_mhz),
            length_m: inherit(cfg.length, |t| t.length_m),
            mode_field_diameter_um: inherit(cfg.mode_field_diameter, |t| t.mode_field_diameter_um),
        };

        let name = cfg.name.clone().unwrap_or_else(|| format!("Fiber #{index}"));
        log::debug!(
            "Resolved '{}': P_in={:?} W, G={:?}, P_out={:?} W ({:?})",
            name,
            segment.powers.input_power_w,
            segment.powers.gain,
            segment.powers.output_power_w,
            segment.powers.mode,
        );
        resolved.push(NamedSegment { name, segment });
    }

    Ok(resolved)
}
