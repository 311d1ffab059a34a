//! Crossings of two curves in the (Up, P) plane.

use log::debug;

use crate::{
    constants::SolverSettings,
    curve::CurvePoint,
    errors::{FailureReason, MatchFailure},
};

/// Intersection of two line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCrossing {
    pub particle_velocity: f64,
    pub pressure: f64,
    /// Position along the first segment, in [0, 1].
    pub t: f64,
    /// Position along the second segment, in [0, 1].
    pub u: f64,
}

/// A crossing of a driver and a target polyline, with both materials' states
/// interpolated at the crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub particle_velocity: f64,
    pub pressure: f64,
    pub driver: CurvePoint,
    pub target: CurvePoint,
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

fn dot(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

fn norm(a: (f64, f64)) -> f64 {
    dot(a, a).sqrt()
}

/// Orientation (cross product) test between segments a0-a1 and b0-b1 given as
/// (Up, P) pairs.
///
/// Segments are parallel when |r x s| <= epsilon |r| |s|. Collinear overlapping
/// segments report the overlap end with the lowest Up.
pub fn segment_intersection(
    a0: (f64, f64),
    a1: (f64, f64),
    b0: (f64, f64),
    b1: (f64, f64),
    epsilon: f64,
) -> Option<SegmentCrossing> {
    let r = (a1.0 - a0.0, a1.1 - a0.1);
    let s = (b1.0 - b0.0, b1.1 - b0.1);
    let qp = (b0.0 - a0.0, b0.1 - a0.1);
    let denominator = cross(r, s);

    if denominator.abs() <= epsilon * norm(r) * norm(s) {
        // Parallel. Only collinear segments can still touch.
        let rr = dot(r, r);
        if rr == 0. || cross(qp, r).abs() > epsilon * norm(qp) * norm(r) {
            return None;
        }
        let t0 = dot(qp, r) / rr;
        let t1 = t0 + dot(s, r) / rr;
        let lo = t0.min(t1).max(0.);
        let hi = t0.max(t1).min(1.);
        if lo > hi + epsilon {
            return None;
        }
        // Lower Up end of the overlap
        let t = if r.0 >= 0. { lo } else { hi };
        let point = (a0.0 + t * r.0, a0.1 + t * r.1);
        let ss = dot(s, s);
        let u = if ss == 0. {
            0.
        } else {
            dot((point.0 - b0.0, point.1 - b0.1), s) / ss
        };
        return Some(SegmentCrossing {
            particle_velocity: point.0,
            pressure: point.1,
            t,
            u: u.clamp(0., 1.),
        });
    }

    let t = cross(qp, s) / denominator;
    let u = cross(qp, r) / denominator;
    let inside = |x: f64| x >= -epsilon && x <= 1. + epsilon;
    if !(inside(t) && inside(u)) {
        return None;
    }
    let t = t.clamp(0., 1.);
    Some(SegmentCrossing {
        particle_velocity: a0.0 + t * r.0,
        pressure: a0.1 + t * r.1,
        t,
        u: u.clamp(0., 1.),
    })
}

fn as_pair(point: &CurvePoint) -> (f64, f64) {
    (point.particle_velocity, point.pressure)
}

fn lerp(a: &CurvePoint, b: &CurvePoint, t: f64) -> CurvePoint {
    let lerp = |x: f64, y: f64| x + t * (y - x);
    CurvePoint {
        particle_velocity: lerp(a.particle_velocity, b.particle_velocity),
        pressure: lerp(a.pressure, b.pressure),
        compression: lerp(a.compression, b.compression),
        energy: lerp(a.energy, b.energy),
    }
}

/// All crossings of two polylines sorted ascending in Up. Both polylines must
/// be ascending in Up. Crossings closer than the coincidence tolerance (a
/// crossing through a shared vertex shows up once per adjacent segment) are
/// merged.
pub fn polyline_intersections(
    driver: &[CurvePoint],
    target: &[CurvePoint],
    settings: &SolverSettings,
) -> Vec<Crossing> {
    let mut crossings = vec![];
    for a in driver.windows(2) {
        let (a_lo, a_hi) = (a[0].particle_velocity, a[1].particle_velocity);
        // First target segment whose end reaches this driver segment
        let start = target.partition_point(|p| p.particle_velocity < a_lo).saturating_sub(1);
        for b in target[start..].windows(2) {
            if b[0].particle_velocity > a_hi {
                break;
            }
            if b[1].particle_velocity < a_lo {
                continue;
            }
            if let Some(hit) = segment_intersection(
                as_pair(&a[0]),
                as_pair(&a[1]),
                as_pair(&b[0]),
                as_pair(&b[1]),
                settings.segment_epsilon,
            ) {
                crossings.push(Crossing {
                    particle_velocity: hit.particle_velocity,
                    pressure: hit.pressure,
                    driver: CurvePoint {
                        particle_velocity: hit.particle_velocity,
                        ..lerp(&a[0], &a[1], hit.t)
                    },
                    target: CurvePoint {
                        particle_velocity: hit.particle_velocity,
                        ..lerp(&b[0], &b[1], hit.u)
                    },
                });
            }
        }
    }
    crossings.sort_by(|a, b| a.particle_velocity.total_cmp(&b.particle_velocity));
    crossings.dedup_by(|later, earlier| {
        let gap = later.particle_velocity - earlier.particle_velocity;
        gap.abs() <= settings.coincidence_tolerance
    });
    crossings
}

/// Bisection on a bracket [lo, hi] whose end points have residuals of opposite
/// sign, stopping once the bracket is narrower than the root tolerance.
pub fn bisect<F>(
    residual: F,
    mut lo: f64,
    mut hi: f64,
    settings: &SolverSettings,
) -> Result<f64, MatchFailure>
where
    F: Fn(f64) -> Option<f64>,
{
    let undefined = |up: f64| {
        MatchFailure::new(
            FailureReason::NonConvergence,
            format!("residual is undefined at Up = {up} km/s during bisection"),
        )
    };
    let mut f_lo = residual(lo).ok_or_else(|| undefined(lo))?;
    let f_hi = residual(hi).ok_or_else(|| undefined(hi))?;
    if f_lo == 0. {
        return Ok(lo);
    }
    if f_hi == 0. {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(MatchFailure::new(
            FailureReason::NonConvergence,
            format!("[{lo}, {hi}] km/s does not bracket a crossing"),
        ));
    }

    for _ in 0..settings.max_bisection_iterations {
        let mid = 0.5 * (lo + hi);
        if hi - lo <= settings.root_tolerance {
            return Ok(mid);
        }
        let f_mid = residual(mid).ok_or_else(|| undefined(mid))?;
        if f_mid == 0. {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(MatchFailure::new(
        FailureReason::NonConvergence,
        format!(
            "bisection did not reach {} km/s within {} iterations (bracket [{lo}, {hi}] km/s)",
            settings.root_tolerance, settings.max_bisection_iterations
        ),
    ))
}

/// Every root of `residual` on [lo, hi]: sign changes between uniform samples
/// are bracketed and then refined by bisection. Samples where the residual is
/// undefined are skipped.
pub fn bracketed_roots<F>(
    residual: F,
    lo: f64,
    hi: f64,
    settings: &SolverSettings,
) -> Result<Vec<f64>, MatchFailure>
where
    F: Fn(f64) -> Option<f64>,
{
    let n = settings.bracket_samples.max(1);
    let samples: Vec<(f64, f64)> = (0..=n)
        .map(|i| lo + (hi - lo) * i as f64 / n as f64)
        .filter_map(|up| residual(up).map(|r| (up, r)))
        .collect();

    let mut roots = vec![];
    for (i, &(up, r)) in samples.iter().enumerate() {
        if r == 0. {
            roots.push(up);
            continue;
        }
        if let Some(&(next_up, next_r)) = samples.get(i + 1) {
            if next_r != 0. && r.signum() != next_r.signum() {
                debug!("Sign change of residual in [{up:.6}, {next_up:.6}] km/s");
                roots.push(bisect(&residual, up, next_up, settings)?);
            }
        }
    }
    roots.dedup_by(|later, earlier| (*later - *earlier).abs() <= settings.coincidence_tolerance);
    Ok(roots)
}
