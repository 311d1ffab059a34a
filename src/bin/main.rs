use clap::Parser;
use impedance_match::{
    match_query, HugoniotCurve, ImpactCondition, ImpedanceMatch, LayeredImpact, MatchQuery,
    MatchResult, MaterialRecord, RunConfig, WaveRegime,
};
use std::path;

#[derive(Parser)]
pub struct Cli {
    /// The path to the run file to read
    #[clap(parse(from_os_str))]
    pub config: path::PathBuf,

    /// Verbosity level (-v for info, -vv for debug)
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

fn describe_query(query: &MatchQuery) -> String {
    let condition = match query.impact {
        ImpactCondition::ImpactVelocity(v) => format!("impact at {v} km/s"),
        ImpactCondition::ParticleVelocity(u) => format!("shocked to Up = {u} km/s"),
        ImpactCondition::ShockVelocity(us) => format!("shocked by Us = {us} km/s"),
    };
    format!("{} -> {}, {condition}", query.driver, query.target)
}

fn describe_material(record: &MaterialRecord) -> String {
    let mut hugoniots = vec![];
    if record.fit().is_some() {
        hugoniots.push(match record.fit_range() {
            Some((lo, hi)) => format!("fit on Up in [{lo}, {hi}] km/s"),
            None => "fit".to_string(),
        });
    }
    if record.has_points() {
        hugoniots.push(format!("{} measured points", record.points().len()));
    }
    let mut line = format!(
        "  {}: R0 = {} g/cm^3, m = {}, {}",
        record.name(),
        record.reference_density(),
        record.porosity(),
        hugoniots.join(", ")
    );
    if let Some(note) = record.note() {
        line.push_str(&format!(" ({note})"));
    }
    line
}

fn describe_curve(role: &str, curve: &HugoniotCurve) -> String {
    let (up_lo, up_hi) = curve.up_range();
    let (p_lo, p_hi) = curve.pressure_range();
    format!(
        "    {role} curve: Up in [{up_lo:.4}, {up_hi:.4}] km/s, P in [{p_lo:.4}, {p_hi:.4}] GPa"
    )
}

fn print_match(matched: &ImpedanceMatch) {
    let state = &matched.primary;
    let regime = match matched.regime {
        WaveRegime::Impact => "impact",
        WaveRegime::Release => "driver released",
        WaveRegime::Reshock => "driver reshocked",
    };
    println!(
        "    Up = {:.4} km/s, P = {:.4} GPa ({regime})",
        state.particle_velocity, state.pressure
    );
    println!(
        "    driver: R/R00 = {:.4}, R = {:.4} g/cm^3, E-E0 = {:.4} kJ/g",
        state.driver.compression, state.driver.density, state.driver.energy
    );
    println!(
        "    target: R/R00 = {:.4}, R = {:.4} g/cm^3, E-E0 = {:.4} kJ/g",
        state.target.compression, state.target.density, state.target.energy
    );
    for other in matched.secondary.iter() {
        println!(
            "    also crosses at Up = {:.4} km/s, P = {:.4} GPa",
            other.particle_velocity, other.pressure
        );
    }
}

fn print_result(result: &MatchResult) {
    if let Some(curve) = &result.driver_curve {
        println!("{}", describe_curve("driver", curve));
    }
    if let Some(curve) = &result.target_curve {
        println!("{}", describe_curve("target", curve));
    }
    match &result.outcome {
        Ok(matched) => print_match(matched),
        Err(failure) => println!("    failed (code {}): {failure}", failure.reason.code()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse command line parameters
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // read configuration
    let config = RunConfig::read(args.config)?;
    let release = config.release.as_ref();
    println!(
        "Loaded {} materials, {} release model",
        config.materials.len(),
        release.name()
    );
    for record in config.materials.iter() {
        println!("{}", describe_material(record));
    }

    for query in config.queries.iter() {
        println!("{}", describe_query(query));
        let result = match_query(&config.materials, query, &config.settings, release);
        print_result(&result);
    }

    for impact in config.layered.iter() {
        println!(
            "{} -> {} at {} km/s",
            impact.impactor,
            impact.layers.join(" -> "),
            impact.impact_velocity
        );
        let interfaces = impact.solve(&config.materials, &config.settings, release);
        for interface in interfaces.iter() {
            println!("  {} -> {}", interface.driver, interface.target);
            print_result(&interface.result);
        }
        if let Err(failure) = LayeredImpact::final_state(&interfaces) {
            println!("  chain stopped: {}", failure.message);
        }
    }

    for sweep in config.sweeps.iter() {
        println!("{} -> {} sweep", sweep.driver, sweep.target);
        println!("    {:>10} {:>12} {:>12}", "v [km/s]", "Up [km/s]", "P [GPa]");
        for point in sweep.solve(&config.materials, &config.settings, release) {
            match point.outcome {
                Ok(state) => println!(
                    "    {:>10.4} {:>12.4} {:>12.4}",
                    point.impact_velocity, state.particle_velocity, state.pressure
                ),
                Err(failure) => println!("    {:>10.4} {failure}", point.impact_velocity),
            }
        }
    }

    println!("Done!");
    Ok(())
}
