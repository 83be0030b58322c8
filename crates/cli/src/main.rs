//! RISC-V compliance harness CLI.
//!
//! This binary wires the library together for one run. It performs:
//! 1. **Loading:** Reads the program and optional bootloader hex images and the bus script.
//! 2. **Configuration:** Starts from defaults or a JSON file, then applies flag overrides.
//! 3. **Running:** Clocks the replay DUT until end of test, fault, or timeout, writes the
//!    signature file, prints statistics, and exits 0 on completion or 1 on failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rvbench_core::config::{Config, DelayPolicyKind};
use rvbench_core::sim::loader;
use rvbench_core::sim::replay::{self, TraceDut};
use rvbench_core::sim::{SignatureLog, Simulator, StepOutcome};
use rvbench_core::SimError;

const DEFAULT_SIGNATURE_PATH: &str = "DUT-rvbench.signature";

#[derive(Parser, Debug)]
#[command(
    name = "rvbench",
    author,
    version,
    about = "Memory and bus harness for RISC-V compliance tests",
    long_about = "Clock a device under test through its instruction and data ports, serve its \
                  memory traffic, and record the compliance signature.\n\nExamples:\n  \
                  rvbench run --program test.hex --trace bus.trace\n  \
                  rvbench run --program test.hex --bootloader boot.hex --trace bus.trace --fixed-latency"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one compliance test.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Program image (one 64-bit hex word per line), mapped at the text offset.
    #[arg(short, long)]
    program: PathBuf,

    /// Bootloader image, mapped at address zero.
    #[arg(short, long)]
    bootloader: Option<PathBuf>,

    /// Bus script replayed as the device under test.
    #[arg(short, long)]
    trace: PathBuf,

    /// Signature output file.
    #[arg(short, long, default_value = DEFAULT_SIGNATURE_PATH)]
    signature: PathBuf,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the randomized latency policy.
    #[arg(long)]
    seed: Option<u64>,

    /// Grant and valid every request without delay.
    #[arg(long)]
    fixed_latency: bool,

    /// Clock periods before the run is declared hung.
    #[arg(long)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_config(args: &RunArgs) -> Result<Config, SimError> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.timing.seed = seed;
    }
    if args.fixed_latency {
        config.timing.policy = DelayPolicyKind::Fixed;
        config.timing.fixed_delay = 0;
    }
    if let Some(timeout) = args.timeout {
        config.general.timeout_cycles = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(args: &RunArgs) -> Result<bool, SimError> {
    let config = build_config(args)?;
    info!(
        program = %args.program.display(),
        trace = %args.trace.display(),
        policy = ?config.timing.policy,
        seed = config.timing.seed,
        "loading test"
    );
    let main = loader::load_hex_image(&args.program)?;
    let boot = match &args.bootloader {
        Some(path) => loader::load_hex_image(path)?,
        None => Vec::new(),
    };
    let dut = TraceDut::new(replay::load_trace(&args.trace)?);
    let signature = SignatureLog::create(&args.signature)?;

    let mut sim = Simulator::new(dut, main, boot, &config, signature)?;
    let report = sim.run()?;
    report.stats.print();

    match &report.outcome {
        StepOutcome::Completed => {
            println!(
                "\n[*] PASS: end of test after {} cycles, {} signature line(s) in {}",
                report.stats.cycles,
                sim.signature().lines().len(),
                args.signature.display()
            );
            Ok(true)
        }
        StepOutcome::Failed(err) => {
            eprintln!("\n[!] FAIL: {err}");
            Ok(false)
        }
        StepOutcome::Continue => Ok(false),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            match cmd_run(&args) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(err) => {
                    eprintln!("\n[!] FATAL: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
