use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, OnFailure};

/// Bare-metal target the driver core must keep building for.
const EMBEDDED_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking LTC2607 driver builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    cargo(
        "Checking driver core (no_std, defmt)",
        &["check", "-p", "ltc2607", "--target", EMBEDDED_TARGET, "--features", "defmt"],
        OnFailure::Abort,
    )?;
    cargo(
        "Checking driver core (no_std, no features)",
        &["check", "-p", "ltc2607", "--target", EMBEDDED_TARGET, "--no-default-features"],
        OnFailure::Abort,
    )?;
    cargo(
        "Checking host workspace",
        &["check", "--workspace", "--all-targets"],
        OnFailure::Abort,
    )?;
    cargo(
        "Running clippy lints",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    if cargo("Checking code formatting", &["fmt", "--all", "--check"], OnFailure::Warn)?.is_none() {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
