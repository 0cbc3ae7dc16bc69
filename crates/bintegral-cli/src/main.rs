//! bintegral command-line interface.
//!
//! Evaluate fibre cascades from TOML job files, or solve one segment's
//! linked power fields:
//! ```sh
//! bintegral run job.toml
//! bintegral validate job.toml
//! bintegral solve --input-power 0.2 --output-power 3 --edited output
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use bintegral_core::linked::{parse_field, parse_gain};
use bintegral_core::{LinkedField, LinkedPowers, SegmentFieldSolver};

#[derive(Parser)]
#[command(name = "bintegral")]
#[command(about = "bintegral: nonlinear phase (B-integral) of fibre amplifier cascades")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a cascade from a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a job file and its segments without writing results.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Recompute one segment's input power / gain / output power after an edit.
    Solve {
        /// Average input power (W). Omit to leave unset.
        #[arg(long)]
        input_power: Option<String>,
        /// Linear gain; `inf` is accepted.
        #[arg(long)]
        gain: Option<String>,
        /// Average output power (W).
        #[arg(long)]
        output_power: Option<String>,
        /// The field that was just edited.
        #[arg(long, value_enum)]
        edited: EditedField,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EditedField {
    Input,
    Gain,
    Output,
}

impl From<EditedField> for LinkedField {
    fn from(field: EditedField) -> Self {
        match field {
            EditedField::Input => LinkedField::InputPower,
            EditedField::Gain => LinkedField::Gain,
            EditedField::Output => LinkedField::OutputPower,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("bintegral Cascade Evaluator");
            println!("===========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out = runner::run_job(&job)?;
            runner::print_summary(&out, job.simulation.threshold_rad);

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_results_csv(&out, &out_dir.join("b_integral.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_results_json(&out, &out_dir.join("b_integral.json"), &job)?;
            }

            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let out = runner::run_job(&job)?;
            println!(
                "Configuration is valid: {} ({} segments, total {:.3} rad)",
                config.display(),
                out.result.len(),
                out.result.total_rad
            );
            Ok(())
        }
        Commands::Solve {
            input_power,
            gain,
            output_power,
            edited,
        } => {
            let powers = LinkedPowers {
                input_power_w: input_power.as_deref().and_then(parse_field),
                gain: gain.as_deref().and_then(parse_gain),
                output_power_w: output_power.as_deref().and_then(parse_field),
                ..Default::default()
            };
            let solved = SegmentFieldSolver::new().solve(powers, edited.into());
            log::debug!("Solved {:?} -> {:?}", powers, solved);

            let show = |v: Option<String>| v.unwrap_or_else(|| "unset".into());
            println!("input power:  {}", show(solved.input_power_w.map(|p| format!("{p:.4} W"))));
            println!("gain:         {}", show(solved.gain.map(|g| match g.linear() {
                Some(g) => format!("{g:.4}"),
                None => g.to_string(),
            })));
            println!("output power: {}", show(solved.output_power_w.map(|p| format!("{p:.4} W"))));
            println!(
                "mode:         {:?} ({} is derived)",
                solved.mode,
                solved.mode.derived_field()
            );
            Ok(())
        }
    }
}
