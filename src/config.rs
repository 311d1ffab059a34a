//! YAML run configuration.
//!
//! ```yaml
//! solver:
//!   root_tolerance: 1.0e-4
//! release_model: mirrored
//! materials:
//!   - name: Basalt
//!     density: 2.86
//!     fit: {form: linear, c0: 2.6, s: 1.6}
//! queries:
//!   - {driver: Basalt, target: Basalt, impact_velocity: 5.0}
//! ```

use std::{error::Error, fs, path::Path};

use log::info;
use yaml_rust::{Yaml, YamlLoader};

use crate::{
    constants::SolverSettings,
    construct::{HugoniotSource, ImpactCondition, MatchQuery},
    errors::{ConfigError, HugoniotError},
    hugoniot::{least_squares_fit, FitForm, InitialState, ShockVelocityFit},
    layered::LayeredImpact,
    material::{Gruneisen, HugoniotPoint, MaterialRecord, MaterialSet},
    release::{MieGruneisen, MirroredHugoniot, ReleaseModel},
    sweep::VelocitySweep,
};

/// Reals and integers both read as `f64`.
fn as_f64(yaml: &Yaml) -> Option<f64> {
    match yaml {
        Yaml::Real(_) => yaml.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn required_f64(yaml: &Yaml, key: &str, path: &str) -> Result<f64, ConfigError> {
    as_f64(&yaml[key]).ok_or(ConfigError::MissingParameter(format!("{path}:{key}")))
}

fn required_str<'a>(yaml: &'a Yaml, key: &str, path: &str) -> Result<&'a str, ConfigError> {
    yaml[key]
        .as_str()
        .ok_or(ConfigError::MissingParameter(format!("{path}:{key}")))
}

fn parse_f64_vec(yaml: &Yaml) -> Result<Vec<f64>, ConfigError> {
    yaml.as_vec()
        .ok_or(ConfigError::InvalidArrayFormat(yaml.clone()))?
        .iter()
        .map(|y| as_f64(y).ok_or(ConfigError::InvalidArrayFormat(yaml.clone())))
        .collect()
}

fn parse_range(yaml: &Yaml) -> Result<Option<(f64, f64)>, ConfigError> {
    if yaml.is_badvalue() {
        return Ok(None);
    }
    match parse_f64_vec(yaml)?.as_slice() {
        &[lo, hi] => Ok(Some((lo, hi))),
        values => Err(ConfigError::InvalidArrayLength(2, values.len())),
    }
}

fn parse_list<T>(
    yaml: &Yaml,
    section: &str,
    parse: impl Fn(&Yaml, &str) -> Result<T, ConfigError>,
) -> Result<Vec<T>, ConfigError> {
    if yaml.is_badvalue() {
        return Ok(vec![]);
    }
    yaml.as_vec()
        .ok_or(ConfigError::InvalidArrayFormat(yaml.clone()))?
        .iter()
        .enumerate()
        .map(|(i, entry)| parse(entry, &format!("{section}:{i}")))
        .collect()
}

fn parse_settings(yaml: &Yaml) -> Result<SolverSettings, ConfigError> {
    let defaults = SolverSettings::default();
    let count = |key: &str, default: usize| -> Result<usize, ConfigError> {
        match &yaml[key] {
            Yaml::BadValue => Ok(default),
            value => value
                .as_i64()
                .filter(|&n| n > 0)
                .map(|n| n as usize)
                .ok_or(ConfigError::MissingParameter(format!("solver:{key}"))),
        }
    };
    // Step sizes must be positive, thresholds may be zero
    let real = |key: &str, default: f64, positive: bool| -> Result<f64, ConfigError> {
        match &yaml[key] {
            Yaml::BadValue => Ok(default),
            value => as_f64(value)
                .filter(|x| x.is_finite() && (*x > 0. || (!positive && *x == 0.)))
                .ok_or(ConfigError::MissingParameter(format!("solver:{key}"))),
        }
    };
    Ok(SolverSettings {
        bracket_samples: count("bracket_samples", defaults.bracket_samples)?,
        root_tolerance: real("root_tolerance", defaults.root_tolerance, true)?,
        max_bisection_iterations: count(
            "max_bisection_iterations",
            defaults.max_bisection_iterations,
        )?,
        segment_epsilon: real("segment_epsilon", defaults.segment_epsilon, false)?,
        coincidence_tolerance: real(
            "coincidence_tolerance",
            defaults.coincidence_tolerance,
            false,
        )?,
        grid_points: count("grid_points", defaults.grid_points)?,
        grid_extent_factor: real("grid_extent_factor", defaults.grid_extent_factor, true)?,
        porosity_tolerance: real("porosity_tolerance", defaults.porosity_tolerance, false)?,
    })
}

fn parse_release_model(yaml: &Yaml) -> Result<Box<dyn ReleaseModel>, ConfigError> {
    let kind = match yaml {
        Yaml::BadValue => return Ok(Box::<dyn ReleaseModel>::default()),
        Yaml::String(kind) => kind.as_str(),
        _ => required_str(yaml, "kind", "release_model")?,
    };
    Ok(match kind {
        "mirrored" => Box::new(MirroredHugoniot),
        "mie_gruneisen" => Box::new(MieGruneisen),
        _ => return Err(ConfigError::UnknownReleaseModel(kind.to_string())),
    })
}

fn parse_fit(
    yaml: &Yaml,
    path: &str,
) -> Result<(ShockVelocityFit, Option<(f64, f64)>), ConfigError> {
    let form = required_str(yaml, "form", path)?;
    let fit = match form {
        "linear" => ShockVelocityFit::Linear {
            c0: required_f64(yaml, "c0", path)?,
            s: required_f64(yaml, "s", path)?,
        },
        "quadratic" => ShockVelocityFit::Quadratic {
            c0: required_f64(yaml, "c0", path)?,
            s1: required_f64(yaml, "s1", path)?,
            s2: required_f64(yaml, "s2", path)?,
        },
        "universal_liquid" => ShockVelocityFit::UniversalLiquid {
            a: required_f64(yaml, "a", path)?,
            b: required_f64(yaml, "b", path)?,
            c: required_f64(yaml, "c", path)?,
            d: required_f64(yaml, "d", path)?,
        },
        _ => return Err(ConfigError::UnknownFitForm(form.to_string())),
    };
    Ok((fit, parse_range(&yaml["up_range"])?))
}

/// `[m, U, D, P, R/R0, R, E-E0]`, optionally followed by a reference.
fn parse_point(yaml: &Yaml) -> Result<HugoniotPoint, ConfigError> {
    let row = yaml.as_vec().ok_or(ConfigError::InvalidArrayFormat(yaml.clone()))?;
    if row.len() != 7 && row.len() != 8 {
        return Err(ConfigError::InvalidArrayLength(7, row.len()));
    }
    let value = |i: usize| as_f64(&row[i]).ok_or(ConfigError::InvalidArrayFormat(yaml.clone()));
    let point = HugoniotPoint {
        porosity: value(0)?,
        particle_velocity: value(1)?,
        shock_velocity: value(2)?,
        pressure: value(3)?,
        compression: value(4)?,
        density: value(5)?,
        energy: value(6)?,
        reference: None,
    };
    Ok(match row.get(7).and_then(|r| r.as_str()) {
        Some(reference) => point.with_reference(reference),
        None => point,
    })
}

fn parse_material(
    yaml: &Yaml,
    path: &str,
    porosity_tolerance: f64,
) -> Result<MaterialRecord, ConfigError> {
    let name = required_str(yaml, "name", path)?;
    let density = required_f64(yaml, "density", path)?;
    let invalid = |e: HugoniotError| ConfigError::InvalidMaterial(name.to_string(), e);

    let mut record = MaterialRecord::new(name, density)
        .and_then(|r| r.with_porosity(as_f64(&yaml["porosity"]).unwrap_or(1.)))
        .and_then(|r| r.with_initial_pressure(as_f64(&yaml["initial_pressure"]).unwrap_or(0.)))
        .map_err(invalid)?;

    let gruneisen = &yaml["gruneisen"];
    if !gruneisen.is_badvalue() {
        let path = format!("{path}:gruneisen");
        record = record.with_gruneisen(Gruneisen::new(
            required_f64(gruneisen, "gamma0", &path)?,
            required_f64(gruneisen, "q", &path)?,
        ));
    }
    if let Some(note) = yaml["note"].as_str() {
        record = record.with_note(note);
    }

    let points = parse_list(&yaml["points"], &format!("{path}:points"), |row, _| parse_point(row))?;
    if !points.is_empty() {
        record = record.with_points(points).map_err(invalid)?;
    }

    let fit = &yaml["fit"];
    let least_squares = &yaml["least_squares"];
    match (fit.is_badvalue(), least_squares.is_badvalue()) {
        (false, false) => {
            return Err(invalid(HugoniotError::InvalidParameter(
                "give either a fit or a least_squares section, not both".to_string(),
            )))
        }
        (false, true) => {
            let (fit, up_range) = parse_fit(fit, &format!("{path}:fit"))?;
            record = record.with_fit(fit, up_range).map_err(invalid)?;
        }
        (true, false) => {
            let path = format!("{path}:least_squares");
            let form = match least_squares["form"].as_str().unwrap_or("linear") {
                "linear" => FitForm::Linear,
                "quadratic" => FitForm::Quadratic,
                form => return Err(ConfigError::UnknownFitForm(form.to_string())),
            };
            let up_range = parse_range(&least_squares["up_range"])?;
            let (fit, quality) =
                least_squares_fit(&record, form, up_range, porosity_tolerance).map_err(invalid)?;
            info!(
                "{name}: {} fit from {} points, residual stdev {:.4} km/s ({path})",
                fit.form_name(),
                quality.points,
                quality.residual_stdev
            );
            record = record.with_fit(fit, up_range).map_err(invalid)?;
        }
        (true, true) => (),
    }
    Ok(record)
}

fn parse_source(yaml: &Yaml) -> Result<HugoniotSource, ConfigError> {
    match yaml.as_str().unwrap_or("auto") {
        "auto" => Ok(HugoniotSource::Auto),
        "fitted" => Ok(HugoniotSource::Fitted),
        "tabulated" => Ok(HugoniotSource::Tabulated),
        source => Err(ConfigError::UnknownHugoniotSource(source.to_string())),
    }
}

fn parse_query(yaml: &Yaml, path: &str) -> Result<MatchQuery, ConfigError> {
    let impact = if let Some(v) = as_f64(&yaml["impact_velocity"]) {
        ImpactCondition::ImpactVelocity(v)
    } else if let Some(u) = as_f64(&yaml["particle_velocity"]) {
        ImpactCondition::ParticleVelocity(u)
    } else if let Some(us) = as_f64(&yaml["shock_velocity"]) {
        ImpactCondition::ShockVelocity(us)
    } else {
        return Err(ConfigError::MissingParameter(format!(
            "{path}:impact_velocity|particle_velocity|shock_velocity"
        )));
    };
    let mut query = MatchQuery::new(
        required_str(yaml, "driver", path)?,
        required_str(yaml, "target", path)?,
        impact,
    )
    .with_source(parse_source(&yaml["source"])?)
    .with_extrapolation(yaml["extrapolate"].as_bool().unwrap_or(false));

    let initial = &yaml["driver_initial"];
    if !initial.is_badvalue() {
        let path = format!("{path}:driver_initial");
        query = query.with_driver_initial(InitialState::new(
            required_f64(initial, "density", &path)?,
            as_f64(&initial["pressure"]).unwrap_or(0.),
        ));
    }
    Ok(query)
}

fn parse_layered(yaml: &Yaml, path: &str) -> Result<LayeredImpact, ConfigError> {
    let layers = yaml["layers"]
        .as_vec()
        .ok_or(ConfigError::MissingParameter(format!("{path}:layers")))?
        .iter()
        .map(|layer| {
            layer
                .as_str()
                .map(str::to_string)
                .ok_or(ConfigError::InvalidArrayFormat(yaml["layers"].clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LayeredImpact::new(
        required_str(yaml, "impactor", path)?,
        layers,
        required_f64(yaml, "impact_velocity", path)?,
    )
    .with_source(parse_source(&yaml["source"])?)
    .with_extrapolation(yaml["extrapolate"].as_bool().unwrap_or(false)))
}

fn parse_sweep(yaml: &Yaml, path: &str) -> Result<VelocitySweep, ConfigError> {
    let driver = required_str(yaml, "driver", path)?;
    let target = required_str(yaml, "target", path)?;
    let sweep = if !yaml["velocities"].is_badvalue() {
        VelocitySweep::new(driver, target, parse_f64_vec(&yaml["velocities"])?)
    } else {
        let range = &yaml["range"];
        let path = format!("{path}:range");
        let steps = range["steps"]
            .as_i64()
            .filter(|&n| n > 0)
            .ok_or(ConfigError::MissingParameter(format!("{path}:steps")))?;
        VelocitySweep::linear(
            driver,
            target,
            required_f64(range, "start", &path)?,
            required_f64(range, "stop", &path)?,
            steps as usize,
        )
        .map_err(|e| ConfigError::InvalidSweep(format!("{driver} -> {target}"), e))?
    };
    Ok(sweep
        .with_source(parse_source(&yaml["source"])?)
        .with_extrapolation(yaml["extrapolate"].as_bool().unwrap_or(false)))
}

/// Everything an `impedance-match` run needs.
#[derive(Debug)]
pub struct RunConfig {
    pub settings: SolverSettings,
    pub release: Box<dyn ReleaseModel>,
    pub materials: MaterialSet,
    pub queries: Vec<MatchQuery>,
    pub layered: Vec<LayeredImpact>,
    pub sweeps: Vec<VelocitySweep>,
}

impl RunConfig {
    pub fn parse(yaml: &Yaml) -> Result<Self, ConfigError> {
        let settings = parse_settings(&yaml["solver"])?;
        let records = parse_list(&yaml["materials"], "materials", |entry, path| {
            parse_material(entry, path, settings.porosity_tolerance)
        })?;
        let mut materials = MaterialSet::new();
        for record in records {
            let name = record.name().to_string();
            materials
                .insert(record)
                .map_err(|e| ConfigError::InvalidMaterial(name, e))?;
        }

        Ok(Self {
            settings,
            release: parse_release_model(&yaml["release_model"])?,
            materials,
            queries: parse_list(&yaml["queries"], "queries", parse_query)?,
            layered: parse_list(&yaml["layered"], "layered", parse_layered)?,
            sweeps: parse_list(&yaml["sweeps"], "sweeps", parse_sweep)?,
        })
    }

    pub fn load_from_str(source: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(source)?;
        let config_yml = docs
            .first()
            .ok_or(ConfigError::MissingParameter("materials".to_string()))?;
        Self::parse(config_yml)
    }

    pub fn read(file: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        Ok(Self::load_from_str(&fs::read_to_string(file)?)?)
    }
}
