use common::{get_config_with_materials, LAYERED_CONFIG};
use float_cmp::assert_approx_eq;
use impedance_match::{match_query, ImpactCondition, LayeredImpact, MatchQuery, WaveRegime};

mod common;

#[test]
fn test_layered_impact_from_config() {
    let config = get_config_with_materials(LAYERED_CONFIG);
    let impact = &config.layered[0];
    let interfaces = impact.solve(&config.materials, &config.settings, config.release.as_ref());
    assert_eq!(interfaces.len(), 3);

    let regimes: Vec<WaveRegime> = interfaces
        .iter()
        .map(|i| i.result.outcome.as_ref().expect("Interface failed!").regime)
        .collect();
    assert_eq!(regimes, vec![WaveRegime::Impact, WaveRegime::Release, WaveRegime::Reshock]);

    // Each interface is driven by the state found at the previous one
    for pair in interfaces.windows(2) {
        let up = pair[0].result.primary().unwrap().particle_velocity;
        assert_eq!(pair[1].driver, pair[0].target);
        assert_eq!(pair[1].query.impact, ImpactCondition::ParticleVelocity(up));
    }

    let last = LayeredImpact::final_state(&interfaces).unwrap();
    let single = match_query(
        &config.materials,
        &last.query,
        &config.settings,
        config.release.as_ref(),
    );
    assert_approx_eq!(
        f64,
        single.primary().unwrap().pressure,
        last.result.primary().unwrap().pressure
    );
}

#[test]
fn test_sweep_from_config() {
    let config = get_config_with_materials(LAYERED_CONFIG);
    let sweep = &config.sweeps[0];
    let points = sweep.solve(&config.materials, &config.settings, config.release.as_ref());
    assert_eq!(points.len(), 8);

    let mut previous = 0.;
    for (i, point) in points.iter().enumerate() {
        assert_approx_eq!(f64, point.impact_velocity, 1. + i as f64);
        let state = point.outcome.as_ref().expect("Sweep point failed!");
        assert!(state.pressure > previous);
        assert!(state.particle_velocity < point.impact_velocity);
        previous = state.pressure;

        let impact = ImpactCondition::ImpactVelocity(point.impact_velocity);
        let query = MatchQuery::new("Iron", "Aluminium", impact);
        let single = match_query(
            &config.materials,
            &query,
            &config.settings,
            config.release.as_ref(),
        );
        assert_approx_eq!(f64, single.primary().unwrap().pressure, state.pressure);
    }
}
