use impedance_match::RunConfig;

pub const MATERIALS_CONFIG: &'static str = r##"
materials:
  - name: Iron
    density: 7.85
    gruneisen: {gamma0: 1.8, q: 1}
    fit: {form: linear, c0: 3.57, s: 1.92}
  - name: Aluminium
    density: 2.7
    fit: {form: linear, c0: 5.35, s: 1.34}
  - name: PMMA
    density: 1.19
    fit: {form: linear, c0: 2.6, s: 1.52}
  - name: Basalt
    density: 2.86
    note: "Tabulated only"
    points:
      - [1, 0.790, 4.550, 10.280, 1.210, 3.461, 0.312]
      - [1, 1.530, 4.905, 21.463, 1.453, 4.156, 1.170]
      - [1, 2.450, 5.726, 40.120, 1.748, 5.000, 3.001]
"##;

pub const LAYERED_CONFIG: &'static str = r##"
layered:
  - {impactor: Iron, layers: [Aluminium, PMMA, Iron], impact_velocity: 5}
sweeps:
  - driver: Iron
    target: Aluminium
    range: {start: 1, stop: 8, steps: 8}
"##;

pub fn get_config(cfg: &str) -> RunConfig {
    RunConfig::load_from_str(cfg).expect("Error loading run config!")
}

pub fn get_config_with_materials(cfg: &str) -> RunConfig {
    get_config(&format!("{MATERIALS_CONFIG}{cfg}"))
}
