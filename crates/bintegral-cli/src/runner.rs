//! Job runner: ties together configuration, segment resolution and the evaluator.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use bintegral_core::{CascadeEvaluator, CascadeResult};

use crate::config::{resolve_segments, JobConfig, NamedSegment};

/// Results from a job run.
pub struct JobOutput {
    pub segments: Vec<NamedSegment>,
    pub result: CascadeResult,
}

/// Resolve and evaluate a parsed job configuration.
pub fn run_job(job: &JobConfig) -> Result<JobOutput> {
    let segments = resolve_segments(job)?;
    let inputs: Vec<_> = segments.iter().map(|s| s.segment.clone()).collect();

    log::info!(
        "Evaluating {} segment(s) with n2 = {:e} m^2/W",
        inputs.len(),
        job.simulation.n2
    );
    let result = CascadeEvaluator::default().evaluate(&inputs, job.simulation.n2)?;

    Ok(JobOutput { segments, result })
}

/// Print per-segment contributions, the total and the budget check.
pub fn print_summary(output: &JobOutput, threshold_rad: Option<f64>) {
    for (named, c) in output.segments.iter().zip(&output.result.contributions) {
        println!(
            "  {:<16} B = {:.3} rad  (P_peak={:.3e} W, A_eff={:.3e} m², L_eff={:.3} m)",
            named.name, c.b_integral_rad, c.peak_power_w, c.effective_area_m2, c.effective_length_m
        );
    }
    println!("Total B-Integral: {:.3} rad", output.result.total_rad);

    if let Some(threshold) = threshold_rad {
        if output.result.exceeds(threshold) {
            let worst = output
                .result
                .max_contribution()
                .and_then(|c| output.segments.get(c.index - 1))
                .map(|s| s.name.as_str())
                .unwrap_or("?");
            log::warn!("B-integral budget of {threshold:.3} rad exceeded");
            println!(
                "WARNING: total exceeds the {threshold:.3} rad budget (largest contributor: {worst})"
            );
        } else {
            println!("Within the {threshold:.3} rad budget.");
        }
    }
}

/// Write per-segment results to a CSV file with a metadata header.
pub fn write_results_csv(output: &JobOutput, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# bintegral — Cascade B-Integral")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# n2_m2_per_w: {:e}", job.simulation.n2)?;
    if let Some(threshold) = job.simulation.threshold_rad {
        writeln!(file, "# threshold_rad: {threshold}")?;
    }
    writeln!(file, "# total_rad: {:.6}", output.result.total_rad)?;
    writeln!(file, "#")?;
    writeln!(
        file,
        "fiber,name,input_power_w,gain,output_power_w,peak_power_w,effective_area_m2,effective_length_m,b_integral_rad"
    )?;

    for (named, c) in output.segments.iter().zip(&output.result.contributions) {
        let powers = &named.segment.powers;
        writeln!(
            file,
            "{},{},{},{},{},{:.6e},{:.6e},{:.6},{:.6}",
            c.index,
            named.name,
            fmt_opt(powers.input_power_w),
            powers.gain.map(|g| g.to_string()).unwrap_or_default(),
            fmt_opt(powers.output_power_w),
            c.peak_power_w,
            c.effective_area_m2,
            c.effective_length_m,
            c.b_integral_rad,
        )?;
    }

    println!("Results written to: {}", path.display());
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    n2: f64,
    threshold_rad: Option<f64>,
    names: Vec<&'a str>,
    result: &'a CascadeResult,
}

/// Write results to a JSON file.
pub fn write_results_json(output: &JobOutput, path: &Path, job: &JobConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let report = JsonReport {
        n2: job.simulation.n2,
        threshold_rad: job.simulation.threshold_rad,
        names: output.segments.iter().map(|s| s.name.as_str()).collect(),
        result: &output.result,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Results (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_run_job_sums_chained_segments() {
        let job = parse_config(
            r#"
            [simulation]
            n2 = 2.7e-20

            [[segment]]
            input_power = 1.0
            gain = 1.0
            wavelength = 1030.0
            pulse_duration = 0.5
            repetition_rate = 40.0
            length = 1.0
            mode_field_diameter = 6.0

            [[segment]]
            "#,
        )
        .unwrap();

        let out = run_job(&job).unwrap();
        assert_eq!(out.result.len(), 2);
        // The second segment clones the first, so it contributes the same phase.
        let first = out.result.contributions[0].b_integral_rad;
        assert!((out.result.total_rad - 2.0 * first).abs() < 1e-9);
        assert_eq!(format!("{first:.3}"), "291.262");
    }

    #[test]
    fn test_run_job_surfaces_validation_error() {
        let job = parse_config(
            r#"
            [simulation]
            n2 = 2.7e-20

            [[segment]]
            input_power = 1.0
            gain = 1.0
            wavelength = 1030.0
            pulse_duration = 0.0
            repetition_rate = 40.0
            length = 1.0
            mode_field_diameter = 6.0
            "#,
        )
        .unwrap();

        let err = run_job(&job).err().unwrap();
        assert!(err.to_string().contains("Fiber #1 must be greater than zero"));
    }
}
