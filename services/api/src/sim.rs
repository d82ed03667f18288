use std::fs;
use std::time::Duration;

use chrono::Local;
use claims_engine::config::AppConfig;
use claims_engine::error::AppError;
use claims_engine::profiles::{load_profile_file, ProfileError, ProfileValidator};
use claims_engine::scrub::{Claim, ScrubPipeline};
use claims_engine::simulation::{ClaimSimulator, LoadTestConfig, LoadTester};

use crate::cli::{LoadTestArgs, ScrubArgs, SimulateArgs, ValidateArgs};
use crate::infra::registry_from;

pub(crate) fn run_scrub(args: ScrubArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let registry = registry_from(args.profile_dir.as_deref(), &config)?;
    let profile = registry.require(&args.profile_id)?;

    let claim: Claim = serde_json::from_str(&args.claim_json)?;
    let result = ScrubPipeline::new(profile).scrub(&claim)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let registry = registry_from(args.profile_dir.as_deref(), &config)?;
    let profile = registry.require(&args.profile_id)?;

    let simulator = ClaimSimulator::new(profile);
    let result = simulator.run(args.claims, args.seed, Local::now().date_naive());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) async fn run_load_test(args: LoadTestArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let registry = registry_from(args.profile_dir.as_deref(), &config)?;
    let profile = registry.require(&args.profile_id)?;

    let tester = LoadTester::new(profile);
    let report = tester
        .run(&LoadTestConfig {
            concurrent_users: args.users,
            claims_per_user: args.claims_per_user,
            ramp_up: Duration::from_secs(args.ramp_up_secs),
            seed: args.seed,
            today: Local::now().date_naive(),
            deadline: args.deadline_secs.map(Duration::from_secs),
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let mut paths: Vec<_> = fs::read_dir(&args.profile_dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml" | "yml")
            )
        })
        .collect();
    paths.sort();

    let validator = ProfileValidator::new();
    let mut invalid = 0usize;

    for path in &paths {
        let name = path.display();
        match load_profile_file(path) {
            Ok(profile) => {
                let report = validator.validate(&profile);
                if report.valid {
                    println!("OK      {name} ({})", profile.payer_info.id);
                } else {
                    invalid += 1;
                    println!("INVALID {name} ({})", profile.payer_info.id);
                }
                for finding in &report.errors {
                    println!("  error:   {}: {}", finding.field, finding.message);
                }
                for finding in &report.warnings {
                    println!("  warning: {}: {}", finding.field, finding.message);
                }
            }
            Err(error) => {
                invalid += 1;
                println!("INVALID {name}");
                println!("  error:   {error}");
            }
        }
    }

    println!(
        "{} profile(s) checked, {} invalid",
        paths.len(),
        invalid
    );

    if invalid > 0 {
        return Err(AppError::Profile(ProfileError::Invalid {
            id: args.profile_dir.display().to_string(),
            detail: format!("{invalid} profile(s) failed validation"),
        }));
    }
    Ok(())
}
