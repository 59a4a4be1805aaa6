use nbparticles::{Particles, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file; relative names are looked up under `scenarios/`
    #[arg(short, default_value = "two_body.yaml")]
    file_name: String,
}

// resolve here to keep main clean
fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.is_file() {
        return given;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn print_summary(particles: &Particles) {
    println!(
        "{:>3}  {:<10} {:<9} {:>12}  {:>38}  {:>38}",
        "idx", "name", "type", "mass", "position", "velocity"
    );
    for (i, p) in particles.iter().enumerate() {
        let x = p.position();
        let v = p.velocity();
        println!(
            "{:>3}  {:<10} {:<9} {:>12.5e}  [{:>10.4e} {:>10.4e} {:>10.4e}]  [{:>10.4e} {:>10.4e} {:>10.4e}]",
            i,
            p.name().unwrap_or("-"),
            p.particle_type().to_string(),
            p.mass(),
            x.x,
            x.y,
            x.z,
            v.x,
            v.y,
            v.z,
        );
    }
    println!("total mass: {:.6e}", particles.total_mass());
    match particles.center_of_mass() {
        Some(com) => println!("center of mass: [{:.4e} {:.4e} {:.4e}]", com.x, com.y, com.z),
        None => println!("center of mass: undefined (no mass)"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let path = scenario_path(&args.file_name);
    info!(path = %path.display(), "loading scenario");

    let scenario_cfg = ScenarioConfig::from_path(&path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let particles = Scenario::build(scenario_cfg).context("failed to build scenario")?;

    print_summary(&particles);

    Ok(())
}
