use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use claims_engine::error::AppError;

use crate::server;
use crate::sim::{run_load_test, run_scrub, run_simulate, run_validate};

#[derive(Parser, Debug)]
#[command(
    name = "Claims Rule Engine",
    about = "Scrub claims, calculate No Surprises Act liability, and run load simulations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Scrub one claim from JSON and print the result
    Scrub(ScrubArgs),
    /// Run a seeded synthetic-claim simulation
    Simulate(SimulateArgs),
    /// Run a concurrent load test against one payer profile
    LoadTest(LoadTestArgs),
    /// Validate every payer profile in a directory
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScrubArgs {
    /// Claim as a JSON object
    #[arg(long)]
    pub(crate) claim_json: String,
    /// Payer profile to scrub against
    #[arg(long)]
    pub(crate) profile_id: String,
    /// Directory of payer-profile YAML files (falls back to APP_PROFILE_DIR)
    #[arg(long)]
    pub(crate) profile_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Number of synthetic claims to generate
    #[arg(long, default_value_t = 100)]
    pub(crate) claims: usize,
    /// Seed for the claim generator
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
    /// Payer profile to simulate against
    #[arg(long)]
    pub(crate) profile_id: String,
    /// Directory of payer-profile YAML files (falls back to APP_PROFILE_DIR)
    #[arg(long)]
    pub(crate) profile_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct LoadTestArgs {
    /// Number of concurrent user streams
    #[arg(long, default_value_t = 10)]
    pub(crate) users: usize,
    /// Claims each user stream submits
    #[arg(long, default_value_t = 50)]
    pub(crate) claims_per_user: usize,
    /// Window over which user streams start, in seconds
    #[arg(long, default_value_t = 5)]
    pub(crate) ramp_up_secs: u64,
    /// Seed for the claim generators
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
    /// Hard stop after this many seconds; partial results are reported
    #[arg(long)]
    pub(crate) deadline_secs: Option<u64>,
    /// Payer profile to test against
    #[arg(long)]
    pub(crate) profile_id: String,
    /// Directory of payer-profile YAML files (falls back to APP_PROFILE_DIR)
    #[arg(long)]
    pub(crate) profile_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Directory of payer-profile YAML files to validate
    #[arg(long)]
    pub(crate) profile_dir: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scrub(args) => run_scrub(args),
        Command::Simulate(args) => run_simulate(args),
        Command::LoadTest(args) => run_load_test(args).await,
        Command::Validate(args) => run_validate(args),
    }
}
