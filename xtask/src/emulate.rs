use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

pub fn run(log: &str) -> Result<()> {
    println!();
    println!("{}", "🔌 Running dual-DAC demo on the simulated bus...".cyan().bold());
    println!();

    let status = Command::new("cargo")
        .args(["run", "-p", "ltc2607-emulator", "--example", "dual_device"])
        .env("RUST_LOG", log)
        .status()
        .context("Failed to launch the emulator demo")?;

    if !status.success() {
        anyhow::bail!("Emulator demo exited with {status}");
    }
    Ok(())
}
