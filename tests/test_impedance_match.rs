use common::{get_config, get_config_with_materials};
use float_cmp::assert_approx_eq;
use impedance_match::{
    match_query, CurveKind, FailureReason, HugoniotSource, ImpactCondition, MatchQuery, RunConfig,
    WaveRegime,
};

mod common;

/// Pressure on the Iron Hugoniot reflected about v / 2.
fn reflected_iron_pressure(up: f64, v: f64) -> f64 {
    let u = v - up;
    7.85 * (3.57 + 1.92 * u) * u
}

fn solve(config: &RunConfig, query: &MatchQuery) -> impedance_match::MatchResult {
    match_query(&config.materials, query, &config.settings, config.release.as_ref())
}

#[test]
fn test_symmetric_impact() {
    let config = get_config_with_materials("");
    let query = MatchQuery::new("Iron", "iron", ImpactCondition::ImpactVelocity(4.));
    let matched = solve(&config, &query).outcome.expect("Symmetric impact failed!");

    assert_eq!(matched.regime, WaveRegime::Impact);
    assert!(!matched.is_ambiguous());
    let state = matched.primary;
    assert_approx_eq!(f64, state.particle_velocity, 2., epsilon = 1e-3);
    assert_approx_eq!(f64, state.pressure, 7.85 * (3.57 + 1.92 * 2.) * 2., epsilon = 1e-1);
    assert_approx_eq!(f64, state.driver.compression, state.target.compression, epsilon = 1e-3);
    assert_approx_eq!(f64, state.driver.energy, state.target.energy, epsilon = 1e-3);
    let energy = 0.5 * state.particle_velocity.powi(2);
    assert_approx_eq!(f64, state.target.energy, energy, epsilon = 1e-6);
}

#[test]
fn test_impact_on_measured_points() {
    let config = get_config_with_materials("");
    let query = MatchQuery::new("Iron", "Basalt", ImpactCondition::ImpactVelocity(3.));
    let result = solve(&config, &query);
    assert_eq!(result.target_curve.as_ref().map(|c| c.kind()), Some(CurveKind::Principal));
    assert_eq!(result.driver_curve.as_ref().map(|c| c.kind()), Some(CurveKind::Reflected));

    let state = result.outcome.expect("Impact on Basalt failed!").primary;
    assert!(state.particle_velocity > 1.53 && state.particle_velocity < 2.45);

    // The target curve is the straight segment between the bracketing rows
    let slope = (40.120 - 21.463) / (2.450 - 1.530);
    let on_segment = 21.463 + slope * (state.particle_velocity - 1.530);
    assert_approx_eq!(f64, state.pressure, on_segment, epsilon = 1e-9);
    assert_approx_eq!(
        f64,
        state.pressure,
        reflected_iron_pressure(state.particle_velocity, 3.),
        epsilon = 1e-3
    );
    assert!(state.target.compression > 1.453 && state.target.compression < 1.748);
}

#[test]
fn test_extrapolation_recovers_non_overlapping_curves() {
    let config = get_config_with_materials("");
    // The reflected driver spans Up in [-v, v], short of the first measured row
    let query = MatchQuery::new("Iron", "Basalt", ImpactCondition::ImpactVelocity(0.5));
    let failure = solve(&config, &query).outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::NonOverlappingDomains);
    assert_eq!(failure.reason.code(), 3);
    assert_eq!(failure.driver_range, Some((-0.5, 0.5)));
    assert_eq!(failure.target_range, Some((0.79, 2.45)));

    let query = query.with_extrapolation(true);
    let state = solve(&config, &query)
        .outcome
        .expect("Extrapolated impact failed!")
        .primary;
    assert!(state.particle_velocity > 0. && state.particle_velocity < 0.5);
    assert_approx_eq!(
        f64,
        state.pressure,
        reflected_iron_pressure(state.particle_velocity, 0.5),
        epsilon = 1e-3
    );
}

#[test]
fn test_release_and_reshock_regimes() {
    let config = get_config_with_materials("");
    let up1 = 1.5;

    // Iron shocked first, then meeting a softer and a stiffer material
    let soft = MatchQuery::new("Iron", "PMMA", ImpactCondition::ParticleVelocity(up1));
    let matched = solve(&config, &soft).outcome.expect("Release into PMMA failed!");
    assert_eq!(matched.regime, WaveRegime::Release);
    assert!(matched.primary.particle_velocity > up1);

    let stiff = MatchQuery::new("PMMA", "Iron", ImpactCondition::ParticleVelocity(up1));
    let matched = solve(&config, &stiff).outcome.expect("Reshock into Iron failed!");
    assert_eq!(matched.regime, WaveRegime::Reshock);
    assert!(matched.primary.particle_velocity < up1);
}

#[test]
fn test_failures_are_reported() {
    let config = get_config_with_materials("");

    let query = MatchQuery::new("Iron", "Granite", ImpactCondition::ImpactVelocity(3.));
    let result = solve(&config, &query);
    let failure = result.outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::UnknownMaterial);
    assert_eq!(failure.reason.code(), 6);
    assert!(result.driver_curve.is_none());

    let query = MatchQuery::new("Iron", "Aluminium", ImpactCondition::ImpactVelocity(3.))
        .with_source(HugoniotSource::Tabulated);
    let failure = solve(&config, &query).outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::MissingHugoniot);
    assert_eq!(failure.reason.code(), 7);

    let query = MatchQuery::new("Iron", "Aluminium", ImpactCondition::ImpactVelocity(-1.));
    let failure = solve(&config, &query).outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::InvalidQuery);
}

#[test]
fn test_mie_gruneisen_release_and_reshock() {
    let mirrored = get_config_with_materials("");
    let config = get_config_with_materials("release_model: mie_gruneisen\n");
    let up1 = 1.5;

    let stiff = MatchQuery::new("Aluminium", "Iron", ImpactCondition::ParticleVelocity(up1));
    let result = solve(&config, &stiff);
    assert_eq!(result.driver_curve.as_ref().map(|c| c.kind()), Some(CurveKind::Release));
    let matched = result.outcome.expect("Mie-Grüneisen reshock into Iron failed!");
    assert_eq!(matched.regime, WaveRegime::Reshock);
    let state = matched.primary;
    assert!(state.particle_velocity > 0.9 && state.particle_velocity < up1);
    let on_iron = 7.85 * (3.57 + 1.92 * state.particle_velocity) * state.particle_velocity;
    assert_approx_eq!(f64, state.pressure, on_iron, epsilon = 1e-2);

    // Close to the mirror-image estimate for a weak reshock
    let reference = solve(&mirrored, &stiff).outcome.expect("Mirrored reshock failed!");
    assert_approx_eq!(
        f64,
        state.particle_velocity,
        reference.primary.particle_velocity,
        epsilon = 5e-2
    );

    let soft = MatchQuery::new("Iron", "Aluminium", ImpactCondition::ParticleVelocity(up1));
    let matched = solve(&config, &soft).outcome.expect("Mie-Grüneisen release failed!");
    assert_eq!(matched.regime, WaveRegime::Release);
    assert!(matched.primary.particle_velocity > up1);
    assert!(matched.primary.pressure < 7.85 * (3.57 + 1.92 * up1) * up1);
}

#[test]
fn test_shock_velocity_outside_measured_rows() {
    let config = get_config_with_materials("");
    let query = MatchQuery::new("Basalt", "Iron", ImpactCondition::ShockVelocity(9.));
    let result = solve(&config, &query.clone().with_source(HugoniotSource::Tabulated));
    let failure = result.outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::OutOfRange);
    assert_eq!(failure.reason.code(), 1);
    assert!(failure.message.contains("Shock velocity 9"));
    assert!(result.driver_curve.is_none());

    let state = solve(&config, &query.with_extrapolation(true))
        .outcome
        .expect("Extrapolated shock velocity query failed!")
        .primary;
    assert!(state.particle_velocity > 0.);
}

#[test]
fn test_driver_state_on_singular_fit() {
    // Us = 1 + Up / 2 meets Us = Up at Up = 2
    let config = get_config(
        r##"
materials:
  - name: Glass
    density: 2.2
    fit: {form: linear, c0: 1, s: 0.5}
  - name: PMMA
    density: 1.19
    fit: {form: linear, c0: 2.6, s: 1.52}
"##,
    );
    let query = MatchQuery::new("Glass", "PMMA", ImpactCondition::ParticleVelocity(2.));
    let failure = solve(&config, &query).outcome.unwrap_err();
    assert_eq!(failure.reason, FailureReason::DivisionSingularity);
    assert_eq!(failure.reason.code(), 2);

    let query = MatchQuery::new("Glass", "PMMA", ImpactCondition::ParticleVelocity(1.));
    assert!(solve(&config, &query).outcome.is_ok());
}
