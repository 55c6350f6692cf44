//! # crid CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crid_cli::agreement::{
    run_cancel, run_deploy, run_enroll, run_status, CancelArgs, DeployArgs, EnrollArgs, StatusArgs,
};
use crid_cli::config::CliConfig;
use crid_cli::keys::{run_keygen, KeygenArgs};
use crid_cli::signing::{run_hash, run_sign, HashArgs, SignArgs};
use crid_cli::{describe, CliContext};
use crid_state::AgreementError;

/// CRID enrollment agreements.
///
/// A coordinator deploys an agreement naming one student, signs the
/// student's ordered course list, and the student redeems the signature
/// before the deadline. After the deadline an unredeemed agreement can be
/// cancelled by the coordinator.
#[derive(Parser, Debug)]
#[command(name = "crid", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the clock with a Unix timestamp in seconds.
    #[arg(long, global = true, allow_hyphen_values = true)]
    now: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair.
    Keygen(KeygenArgs),

    /// Create an agreement; the acting key becomes the coordinator.
    Deploy(DeployArgs),

    /// Print the message hash of an ordered course list.
    Hash(HashArgs),

    /// Sign an ordered course list as the coordinator.
    Sign(SignArgs),

    /// Redeem a coordinator signature as the student.
    Enroll(EnrollArgs),

    /// Cancel an unredeemed agreement after its deadline.
    Cancel(CancelArgs),

    /// Show an agreement.
    Status(StatusArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("crid CLI starting");

    let ctx = match CliConfig::load_or_default(cli.config.as_deref())
        .and_then(|config| CliContext::new(config, cli.now))
    {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Deploy(args) => run_deploy(&args, &ctx),
        Commands::Hash(args) => run_hash(&args),
        Commands::Sign(args) => run_sign(&args),
        Commands::Enroll(args) => run_enroll(&args, &ctx),
        Commands::Cancel(args) => run_cancel(&args, &ctx),
        Commands::Status(args) => run_status(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            match e.downcast_ref::<AgreementError>() {
                Some(protocol) => eprintln!("error [{}]: {}", protocol.code(), describe(protocol)),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::from(1)
        }
    }
}
