// ─────────────────────────────────────────────────────────────────────
// Nuray — Analytic Ray Tracer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic ray tracing through an exponential firn profile.
//!
//! With n(z) = n_ice - delta_n exp(z / z_0) and the conserved ray parameter
//! beta = n sin(theta), substitute gamma = delta_n exp(z / z_0). Then
//! n^2 - beta^2 = gamma^2 - b gamma + c with b = 2 n_ice, c = n_ice^2 - beta^2,
//! and the horizontal distance, travel time and path length along a
//! monotonic leg have closed-form antiderivatives in gamma.
//!
//! A path is a sequence of monotonic legs between the endpoints, the apex
//! (turning point, or the surface if the ray reaches it first) and an
//! optional reflecting bottom. For every leg topology the boundary-value
//! problem y(beta) = d is solved by bracketing sign changes on a grid in
//! beta and refining with Brent's method.

use crate::attenuation::AttenuationLengthTable;
use crate::fresnel::reflection_coefficients;
use crate::ice::IceModel;
use num_complex::Complex64;
use nuray_math::quadrature::GaussLegendre;
use nuray_math::roots::{brent, sign_change_brackets};
use nuray_math::vector::Vec3;
use nuray_types::constants::{C_LIGHT, N_AIR};
use nuray_types::state::{AttenuationSpectrum, RaySolution, SolutionType};
use std::f64::consts::FRAC_PI_2;

/// Grid points in beta used to bracket solutions.
const N_BETA_GRID: usize = 240;

const ROOT_TOL: f64 = 1e-15;
const ROOT_MAX_ITER: usize = 200;

/// Largest accepted mismatch between traced and requested distance [m].
const MAX_DISTANCE_RESIDUAL: f64 = 1e-2;

/// Relative step in beta for the focusing derivative.
const FOCUSING_STEP: f64 = 1e-6;

/// Quadrature order per leg for attenuation integrals.
const ATTENUATION_ORDER: usize = 16;

/// Sequence of apex turns and bottom bounces between vertex and antenna.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topology {
    /// Initial direction at the vertex is upwards.
    pub start_up: bool,
    pub apex_turns: u32,
    pub bottom_bounces: u32,
}

impl Topology {
    pub const DIRECT: Topology = Topology {
        start_up: true,
        apex_turns: 0,
        bottom_bounces: 0,
    };

    /// Every topology with at most `max_bottom` bottom bounces.
    pub fn enumerate(max_bottom: u32) -> Vec<Topology> {
        let mut all = vec![
            Topology::DIRECT,
            Topology {
                start_up: true,
                apex_turns: 1,
                bottom_bounces: 0,
            },
        ];
        for k in 1..=max_bottom {
            for (start_up, apex_turns) in [(true, k), (true, k + 1), (false, k - 1), (false, k)] {
                all.push(Topology {
                    start_up,
                    apex_turns,
                    bottom_bounces: k,
                });
            }
        }
        all
    }

    fn events(&self) -> u32 {
        self.apex_turns + self.bottom_bounces
    }

    fn is_direct(&self) -> bool {
        self.events() == 0
    }

    /// Last turning event is the apex (ray arrives travelling down).
    fn ends_at_apex(&self) -> bool {
        let odd = self.events() % 2 == 1;
        if self.start_up {
            odd
        } else {
            !odd
        }
    }

    fn launches_up(&self, z1: f64, z2: f64) -> bool {
        if self.is_direct() {
            z2 > z1
        } else {
            self.start_up
        }
    }

    fn arrives_up(&self, z1: f64, z2: f64) -> bool {
        if self.is_direct() {
            z2 > z1
        } else {
            !self.ends_at_apex()
        }
    }

    /// Monotonic legs (lower depth, upper depth, multiplicity).
    fn legs(&self, z1: f64, z2: f64, z_apex: f64, z_bottom: f64) -> Vec<Leg> {
        if self.is_direct() {
            return vec![Leg::new(z1.min(z2), z1.max(z2), 1)];
        }
        let first = if self.start_up {
            Leg::new(z1, z_apex, 1)
        } else {
            Leg::new(z_bottom, z1, 1)
        };
        let last = if self.ends_at_apex() {
            Leg::new(z2, z_apex, 1)
        } else {
            Leg::new(z_bottom, z2, 1)
        };
        let mut legs = vec![first];
        let full = self.events() - 1;
        if full > 0 {
            legs.push(Leg::new(z_bottom, z_apex, full));
        }
        legs.push(last);
        legs
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Leg {
    lo: f64,
    hi: f64,
    count: u32,
}

impl Leg {
    fn new(lo: f64, hi: f64, count: u32) -> Self {
        Leg { lo, hi, count }
    }
}

/// Horizontal distance [m], travel time [ns] and path length [m] of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathIntegrals {
    pub horizontal: f64,
    pub time: f64,
    pub length: f64,
}

/// Closed-form antiderivatives for a fixed ray parameter.
struct RayParameter<'a> {
    ice: &'a IceModel,
    beta: f64,
    c: f64,
    sqrt_c: f64,
}

impl<'a> RayParameter<'a> {
    fn new(ice: &'a IceModel, beta: f64) -> Self {
        let c = ice.n_ice * ice.n_ice - beta * beta;
        RayParameter {
            ice,
            beta,
            c,
            sqrt_c: c.sqrt(),
        }
    }

    fn gamma(&self, z: f64) -> f64 {
        self.ice.delta_n * (z / self.ice.z_0).exp()
    }

    fn sqrt_q(&self, gamma: f64) -> f64 {
        let n = self.ice.n_ice - gamma;
        (n * n - self.beta * self.beta).max(0.0).sqrt()
    }

    /// -(1 / sqrt(c)) ln((2c - b gamma + 2 sqrt(c) sqrt(Q)) / gamma)
    fn i1(&self, gamma: f64, sqrt_q: f64) -> f64 {
        let b = 2.0 * self.ice.n_ice;
        -((2.0 * self.c - b * gamma + 2.0 * self.sqrt_c * sqrt_q) / gamma).ln() / self.sqrt_c
    }

    fn antiderivatives(&self, z: f64) -> PathIntegrals {
        let n_ice = self.ice.n_ice;
        let z_0 = self.ice.z_0;
        let g = self.gamma(z);
        let sq = self.sqrt_q(g);
        let i1 = self.i1(g, sq);
        let i2 = (n_ice - g + sq).ln();
        PathIntegrals {
            horizontal: self.beta * z_0 * i1,
            time: z_0 / C_LIGHT * (n_ice * n_ice * i1 + sq + n_ice * i2),
            length: z_0 * (n_ice * i1 + i2),
        }
    }

    fn leg(&self, leg: &Leg) -> PathIntegrals {
        let hi = self.antiderivatives(leg.hi);
        let lo = self.antiderivatives(leg.lo);
        let k = leg.count as f64;
        PathIntegrals {
            horizontal: k * (hi.horizontal - lo.horizontal),
            time: k * (hi.time - lo.time),
            length: k * (hi.length - lo.length),
        }
    }

    /// Depth where the ray turns, or 0 if it reaches the surface first.
    fn apex(&self) -> (f64, bool) {
        let gamma_turn = self.ice.n_ice - self.beta;
        if gamma_turn >= self.ice.delta_n {
            (0.0, true)
        } else {
            (self.ice.z_0 * (gamma_turn / self.ice.delta_n).ln(), false)
        }
    }
}

/// Ray tracer for an ice model, selected by `propagation.module = analytic`.
#[derive(Debug, Clone)]
pub struct AnalyticRayTracer {
    ice: IceModel,
    n_reflections: u32,
    /// Upper clip of the focusing factor; `None` disables focusing.
    focusing_limit: Option<f64>,
    quadrature: GaussLegendre,
}

impl AnalyticRayTracer {
    pub fn new(ice: IceModel, n_reflections: u32, focusing_limit: Option<f64>) -> Self {
        AnalyticRayTracer {
            ice,
            n_reflections,
            focusing_limit,
            quadrature: GaussLegendre::new(ATTENUATION_ORDER),
        }
    }

    pub fn ice(&self) -> &IceModel {
        &self.ice
    }

    /// Path integrals for a topology, or `None` if the endpoints are
    /// unreachable with this ray parameter.
    pub fn path_integrals(&self, beta: f64, topology: Topology, z1: f64, z2: f64) -> Option<PathIntegrals> {
        if beta < 0.0 || beta > self.ice.n(z1).min(self.ice.n(z2)) {
            return None;
        }
        let ray = RayParameter::new(&self.ice, beta);
        let (z_apex, _) = ray.apex();
        let z_bottom = self.ice.z_bottom.unwrap_or(f64::NEG_INFINITY);
        let mut total = PathIntegrals {
            horizontal: 0.0,
            time: 0.0,
            length: 0.0,
        };
        for leg in topology.legs(z1, z2, z_apex, z_bottom) {
            let p = ray.leg(&leg);
            total.horizontal += p.horizontal;
            total.time += p.time;
            total.length += p.length;
        }
        if total.horizontal.is_finite() && total.time.is_finite() {
            Some(total)
        } else {
            None
        }
    }

    /// All ray solutions from `vertex` to `antenna`. Never fails; an
    /// unreachable geometry yields an empty set.
    pub fn trace(
        &self,
        vertex: Vec3,
        antenna: Vec3,
        attenuation: Option<&AttenuationLengthTable>,
    ) -> Vec<RaySolution> {
        if vertex.z > 0.0 || antenna.z > 0.0 {
            log::debug!(
                "no ray tracing above the surface (vertex z = {:.2} m, antenna z = {:.2} m)",
                vertex.z,
                antenna.z
            );
            return Vec::new();
        }
        if let Some(z_b) = self.ice.z_bottom {
            if vertex.z < z_b || antenna.z < z_b {
                log::debug!("endpoint below the reflecting layer at {z_b} m");
                return Vec::new();
            }
        }
        if vertex.distance(&antenna) < 1e-9 {
            return Vec::new();
        }
        if self.ice.is_homogeneous() {
            return self.trace_homogeneous(vertex, antenna, attenuation);
        }

        let d = vertex.horizontal_distance(&antenna);
        let (z1, z2) = (vertex.z, antenna.z);
        let beta_max = self.ice.n(z1).min(self.ice.n(z2));
        let betas: Vec<f64> = (0..=N_BETA_GRID)
            .map(|i| beta_max * (FRAC_PI_2 * i as f64 / N_BETA_GRID as f64).sin())
            .collect();
        let max_bottom = if self.ice.z_bottom.is_some() {
            self.n_reflections
        } else {
            0
        };

        let mut solutions = Vec::new();
        for topology in Topology::enumerate(max_bottom) {
            let residual = |beta: f64| {
                self.path_integrals(beta, topology, z1, z2)
                    .map_or(f64::NAN, |p| p.horizontal - d)
            };
            let values: Vec<f64> = betas.iter().map(|&b| residual(b)).collect();
            let mut roots: Vec<f64> = Vec::new();
            for i in sign_change_brackets(&values) {
                let Some(beta) = brent(residual, betas[i], betas[i + 1], ROOT_TOL, ROOT_MAX_ITER) else {
                    log::debug!(
                        "{topology:?}: root refinement failed in [{:.6}, {:.6}]",
                        betas[i],
                        betas[i + 1]
                    );
                    continue;
                };
                if residual(beta).abs() > MAX_DISTANCE_RESIDUAL {
                    log::debug!("{topology:?}: beta = {beta:.6} misses target by {:.3e} m", residual(beta));
                    continue;
                }
                if roots.iter().any(|r| (r - beta).abs() <= 1e-9 * beta_max) {
                    continue;
                }
                roots.push(beta);
            }
            for beta in roots {
                if let Some(sol) = self.build_solution(beta, topology, vertex, antenna, attenuation) {
                    solutions.push(sol);
                }
            }
        }
        solutions.sort_by(|a, b| a.travel_time.total_cmp(&b.travel_time));
        solutions
    }

    fn build_solution(
        &self,
        beta: f64,
        topology: Topology,
        vertex: Vec3,
        antenna: Vec3,
        attenuation: Option<&AttenuationLengthTable>,
    ) -> Option<RaySolution> {
        let (z1, z2) = (vertex.z, antenna.z);
        let integrals = self.path_integrals(beta, topology, z1, z2)?;
        let ray = RayParameter::new(&self.ice, beta);
        let (z_apex, apex_at_surface) = ray.apex();

        let u_h = horizontal_unit(vertex, antenna);
        let (n1, n2) = (self.ice.n(z1), self.ice.n(z2));
        let sin1 = (beta / n1).min(1.0);
        let sin2 = (beta / n2).min(1.0);
        let cos1 = (1.0 - sin1 * sin1).sqrt();
        let cos2 = (1.0 - sin2 * sin2).sqrt();
        let up1 = if topology.launches_up(z1, z2) { 1.0 } else { -1.0 };
        let up2 = if topology.arrives_up(z1, z2) { 1.0 } else { -1.0 };
        let launch_vector = (u_h * sin1 + Vec3::EZ * (up1 * cos1)).normalized();
        let travel_at_antenna = u_h * sin2 + Vec3::EZ * (up2 * cos2);
        let receive_vector = (-travel_at_antenna).normalized();

        let n_surface_reflections = if apex_at_surface {
            topology.apex_turns
        } else {
            0
        };
        let solution_type = if topology.is_direct() {
            SolutionType::Direct
        } else if n_surface_reflections > 0 || topology.bottom_bounces > 0 {
            SolutionType::Reflected
        } else {
            SolutionType::Refracted
        };

        let (mut reflection_theta, mut reflection_phi) = (Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0));
        if n_surface_reflections > 0 {
            let n_s = self.ice.n_surface();
            let theta_i = (beta / n_s).min(1.0).asin();
            let (r_par, r_perp) = reflection_coefficients(theta_i, n_s, N_AIR);
            for _ in 0..n_surface_reflections {
                reflection_theta *= r_par;
                reflection_phi *= r_perp;
            }
        }
        let bottom = self.ice.bottom_reflection.powi(topology.bottom_bounces as i32);
        reflection_theta *= bottom;
        reflection_phi *= bottom;

        let z_bottom = self.ice.z_bottom.unwrap_or(f64::NEG_INFINITY);
        let legs = topology.legs(z1, z2, z_apex, z_bottom);
        let attenuation = match attenuation {
            Some(table) => self.leg_attenuation(&ray, &legs, table),
            None => AttenuationSpectrum::unity(),
        };

        let focusing = self.focusing(beta, topology, vertex, antenna, integrals, cos1, cos2);

        Some(RaySolution {
            solution_type,
            ray_parameter: beta,
            launch_vector,
            receive_vector,
            launch_angle: launch_vector.zenith(),
            receive_angle: receive_vector.zenith(),
            travel_time: integrals.time,
            path_length: integrals.length,
            attenuation,
            focusing,
            n_bottom_reflections: topology.bottom_bounces,
            n_surface_reflections,
            reflection_theta,
            reflection_phi,
        })
    }

    /// exp(-integral ds / L(z, f)) at every reference frequency.
    ///
    /// Each leg is integrated in u with z = z_hi - u^2, which keeps the
    /// integrand finite at a turning point.
    fn leg_attenuation(&self, ray: &RayParameter, legs: &[Leg], table: &AttenuationLengthTable) -> AttenuationSpectrum {
        let frequencies = table.frequencies().to_vec();
        let mut exponents = vec![0.0; frequencies.len()];
        for leg in legs {
            let span = (leg.hi - leg.lo).max(0.0);
            if span == 0.0 {
                continue;
            }
            for (u, w) in self.quadrature.mapped(0.0, span.sqrt()) {
                let z = leg.hi - u * u;
                let n = self.ice.n(z);
                let denom = (n * n - ray.beta * ray.beta).max(0.0).sqrt();
                if denom == 0.0 {
                    continue;
                }
                // ds = n dz / sqrt(n^2 - beta^2), dz = 2 u du
                let ds = n / denom * 2.0 * u * w * leg.count as f64;
                for (e, &f) in exponents.iter_mut().zip(frequencies.iter()) {
                    *e += ds / table.length(z, f);
                }
            }
        }
        AttenuationSpectrum {
            factors: exponents.iter().map(|e| (-e).exp()).collect(),
            frequencies,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn focusing(
        &self,
        beta: f64,
        topology: Topology,
        vertex: Vec3,
        antenna: Vec3,
        integrals: PathIntegrals,
        cos_launch: f64,
        cos_receive: f64,
    ) -> f64 {
        let Some(limit) = self.focusing_limit else {
            return 1.0;
        };
        let (z1, z2) = (vertex.z, antenna.z);
        let step = FOCUSING_STEP * self.ice.n(z1).min(self.ice.n(z2));
        let shifted = self
            .path_integrals(beta + step, topology, z1, z2)
            .map(|p| (p, step))
            .or_else(|| self.path_integrals(beta - step, topology, z1, z2).map(|p| (p, -step)));
        let Some((shifted, d_beta)) = shifted else {
            return 1.0;
        };
        let n1 = self.ice.n(z1);
        let n2 = self.ice.n(z2);
        let d_theta = d_beta / (n1 * cos_launch);
        let d_y = shifted.horizontal - integrals.horizontal;
        let d = integrals.horizontal;
        let r = integrals.length;
        let sin_launch = beta / n1;
        let f = (r * r * sin_launch * d_theta.abs() / (d * (d_y * cos_receive).abs())).sqrt()
            * (n1 / n2).sqrt();
        if f.is_finite() {
            f.min(limit)
        } else {
            1.0
        }
    }

    /// Straight-line direct and surface-mirrored paths for delta_n = 0.
    fn trace_homogeneous(
        &self,
        vertex: Vec3,
        antenna: Vec3,
        attenuation: Option<&AttenuationLengthTable>,
    ) -> Vec<RaySolution> {
        let n = self.ice.n_ice;
        let mut solutions = Vec::new();

        let segments_direct = [(vertex, antenna)];
        let mirrored = Vec3::new(antenna.x, antenna.y, -antenna.z);
        let mut paths: Vec<(Vec3, u32, Vec<(Vec3, Vec3)>)> = vec![(antenna, 0, segments_direct.to_vec())];
        if vertex.z < 0.0 || antenna.z < 0.0 {
            let to_image = mirrored - vertex;
            // Parameter where the line to the image crosses z = 0
            let t = if to_image.z.abs() > 0.0 { -vertex.z / to_image.z } else { 0.0 };
            let surface_point = vertex + to_image * t;
            paths.push((mirrored, 1, vec![(vertex, surface_point), (surface_point, antenna)]));
        }

        for (target, n_surface, segments) in paths {
            let delta = target - vertex;
            let length = delta.norm();
            let launch_vector = delta.normalized();
            let travel_at_antenna = if n_surface == 0 {
                launch_vector
            } else {
                Vec3::new(launch_vector.x, launch_vector.y, -launch_vector.z)
            };
            let receive_vector = -travel_at_antenna;

            let (mut r_theta, mut r_phi) = (Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0));
            if n_surface > 0 {
                let theta_i = launch_vector.z.clamp(-1.0, 1.0).acos();
                let (r_par, r_perp) = reflection_coefficients(theta_i, n, N_AIR);
                r_theta = r_par;
                r_phi = r_perp;
            }

            let attenuation = match attenuation {
                Some(table) => self.straight_attenuation(&segments, table),
                None => AttenuationSpectrum::unity(),
            };

            solutions.push(RaySolution {
                solution_type: if n_surface == 0 {
                    SolutionType::Direct
                } else {
                    SolutionType::Reflected
                },
                ray_parameter: n * launch_vector.zenith().sin(),
                launch_vector,
                receive_vector,
                launch_angle: launch_vector.zenith(),
                receive_angle: receive_vector.zenith(),
                travel_time: n * length / C_LIGHT,
                path_length: length,
                attenuation,
                focusing: 1.0,
                n_bottom_reflections: 0,
                n_surface_reflections: n_surface,
                reflection_theta: r_theta,
                reflection_phi: r_phi,
            });
        }
        solutions.sort_by(|a, b| a.travel_time.total_cmp(&b.travel_time));
        solutions
    }

    fn straight_attenuation(&self, segments: &[(Vec3, Vec3)], table: &AttenuationLengthTable) -> AttenuationSpectrum {
        let frequencies = table.frequencies().to_vec();
        let mut exponents = vec![0.0; frequencies.len()];
        for (a, b) in segments {
            let length = a.distance(b);
            for (s, w) in self.quadrature.mapped(0.0, length) {
                let z = a.z + (b.z - a.z) * s / length;
                for (e, &f) in exponents.iter_mut().zip(frequencies.iter()) {
                    *e += w / table.length(z, f);
                }
            }
        }
        AttenuationSpectrum {
            factors: exponents.iter().map(|e| (-e).exp()).collect(),
            frequencies,
        }
    }
}

/// Unit vector from `from` to `to` in the horizontal plane (x if vertical).
fn horizontal_unit(from: Vec3, to: Vec3) -> Vec3 {
    let h = Vec3::new(to.x - from.x, to.y - from.y, 0.0);
    if h.norm() > 0.0 {
        h.normalized()
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuray_types::config::{AttenuationModelKind, IceModelKind};

    fn tracer(kind: IceModelKind) -> AnalyticRayTracer {
        AnalyticRayTracer::new(IceModel::new(kind), 0, None)
    }

    /// Numerical travel time of one monotonic leg: integral of n^2 / (c sqrt(n^2 - beta^2)) dz.
    fn numeric_leg_time(ice: &IceModel, beta: f64, lo: f64, hi: f64) -> f64 {
        let gl = GaussLegendre::new(200);
        let span = hi - lo;
        gl.integrate(
            |u| {
                let z = hi - u * u;
                let n = ice.n(z);
                n * n / (C_LIGHT * (n * n - beta * beta).sqrt()) * 2.0 * u
            },
            0.0,
            span.sqrt(),
        )
    }

    #[test]
    fn test_topology_enumeration() {
        assert_eq!(Topology::enumerate(0).len(), 2);
        let t = Topology::enumerate(2);
        assert_eq!(t.len(), 10);
        assert!(t.contains(&Topology {
            start_up: false,
            apex_turns: 0,
            bottom_bounces: 1
        }));
    }

    #[test]
    fn test_leg_decomposition_two_bounces() {
        let t = Topology {
            start_up: true,
            apex_turns: 3,
            bottom_bounces: 2,
        };
        let legs = t.legs(-100.0, -200.0, -10.0, -500.0);
        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0], Leg::new(-100.0, -10.0, 1));
        assert_eq!(legs[1], Leg::new(-500.0, -10.0, 4));
        assert_eq!(legs[2], Leg::new(-200.0, -10.0, 1));
        assert!(!t.arrives_up(-100.0, -200.0));
    }

    #[test]
    fn test_direct_and_refracted_found() {
        let rt = tracer(IceModelKind::SouthPole2015);
        let vertex = Vec3::new(0.0, 0.0, -1000.0);
        let antenna = Vec3::new(500.0, 0.0, -200.0);
        let sols = rt.trace(vertex, antenna, None);
        assert_eq!(sols.len(), 2, "{sols:#?}");
        assert_eq!(sols[0].solution_type, SolutionType::Direct);
        assert_ne!(sols[1].solution_type, SolutionType::Direct);
        assert!(sols[0].travel_time < sols[1].travel_time);
        for s in &sols {
            assert!(s.launch_vector.z > 0.0);
            assert!((s.launch_vector.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_endpoints_reproduce_horizontal_distance() {
        let rt = tracer(IceModelKind::SouthPole2015);
        let vertex = Vec3::new(10.0, -20.0, -1300.0);
        let antenna = Vec3::new(600.0, 300.0, -150.0);
        let d = vertex.horizontal_distance(&antenna);
        for s in rt.trace(vertex, antenna, None) {
            let topology = if s.solution_type == SolutionType::Direct {
                Topology::DIRECT
            } else {
                Topology {
                    start_up: true,
                    apex_turns: 1,
                    bottom_bounces: 0,
                }
            };
            let p = rt.path_integrals(s.ray_parameter, topology, vertex.z, antenna.z).unwrap();
            assert!((p.horizontal - d).abs() < 1e-2);
        }
    }

    #[test]
    fn test_analytic_time_matches_numeric_integration() {
        let ice = IceModel::new(IceModelKind::SouthPole2015);
        let rt = AnalyticRayTracer::new(ice, 0, None);
        for beta in [0.3, 0.9, 1.2] {
            let p = rt.path_integrals(beta, Topology::DIRECT, -1200.0, -100.0).unwrap();
            let numeric = numeric_leg_time(&ice, beta, -1200.0, -100.0);
            assert!((p.time - numeric).abs() / numeric < 1e-8, "beta={beta}: {} vs {numeric}", p.time);
        }
        // Through a turning point below the surface
        let beta = 1.5;
        let ray = RayParameter::new(&ice, beta);
        let (z_apex, at_surface) = ray.apex();
        assert!(!at_surface && z_apex < 0.0);
        let t = Topology {
            start_up: true,
            apex_turns: 1,
            bottom_bounces: 0,
        };
        let p = rt.path_integrals(beta, t, -400.0, -300.0).unwrap();
        let numeric =
            numeric_leg_time(&ice, beta, -400.0, z_apex) + numeric_leg_time(&ice, beta, -300.0, z_apex);
        assert!((p.time - numeric).abs() / numeric < 1e-6, "{} vs {numeric}", p.time);
    }

    #[test]
    fn test_homogeneous_equal_depth_symmetry() {
        let rt = tracer(IceModelKind::Homogeneous);
        let sols = rt.trace(Vec3::new(0.0, 0.0, -300.0), Vec3::new(400.0, 0.0, -300.0), None);
        assert_eq!(sols.len(), 2);
        let direct = &sols[0];
        assert_eq!(direct.solution_type, SolutionType::Direct);
        assert!((direct.launch_angle - direct.receive_angle).abs() < 1e-12);
        assert!((direct.travel_time - 1.78 * 400.0 / C_LIGHT).abs() < 1e-9);
        let reflected = &sols[1];
        assert_eq!(reflected.n_surface_reflections, 1);
        assert!((reflected.launch_angle - reflected.receive_angle).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_arc_symmetry() {
        // Equal depths: the arcing path is mirror-symmetric about its apex
        let rt = tracer(IceModelKind::SouthPole2015);
        let sols = rt.trace(Vec3::new(0.0, 0.0, -150.0), Vec3::new(300.0, 0.0, -150.0), None);
        assert!(!sols.is_empty());
        for s in &sols {
            assert!((s.launch_angle - s.receive_angle).abs() < 1e-9, "{s:#?}");
        }
    }

    #[test]
    fn test_above_surface_yields_no_solution() {
        let rt = tracer(IceModelKind::SouthPole2015);
        assert!(rt.trace(Vec3::new(0.0, 0.0, -500.0), Vec3::new(10.0, 0.0, 2.0), None).is_empty());
    }

    #[test]
    fn test_shadow_zone_has_no_solution() {
        // Shallow antenna far away from a shallow vertex lies in the shadow
        let rt = tracer(IceModelKind::SouthPole2015);
        let sols = rt.trace(Vec3::new(0.0, 0.0, -10.0), Vec3::new(5000.0, 0.0, -5.0), None);
        assert!(sols.is_empty(), "{sols:#?}");
    }

    #[test]
    fn test_bottom_reflection_paths() {
        let ice = IceModel::new(IceModelKind::MooresBaySimple);
        let rt = AnalyticRayTracer::new(ice, 1, None);
        let sols = rt.trace(Vec3::new(0.0, 0.0, -300.0), Vec3::new(200.0, 0.0, -5.0), None);
        let bounced: Vec<_> = sols.iter().filter(|s| s.n_bottom_reflections == 1).collect();
        assert!(!bounced.is_empty());
        for s in bounced {
            assert!((s.reflection_theta.re - 0.82).abs() < 1e-12 || s.n_surface_reflections > 0);
            assert!(s.path_length > 2.0 * 270.0);
        }
    }

    #[test]
    fn test_attenuation_decreases_with_frequency() {
        let ice = IceModel::new(IceModelKind::SouthPole2015);
        let rt = AnalyticRayTracer::new(ice, 0, None);
        let table = AttenuationLengthTable::build(AttenuationModelKind::Sp1, ice.thickness, &[0.1, 0.3, 0.6, 1.0]);
        let sols = rt.trace(Vec3::new(0.0, 0.0, -1500.0), Vec3::new(1000.0, 0.0, -100.0), Some(&table));
        assert!(!sols.is_empty());
        for s in &sols {
            let f = &s.attenuation.factors;
            assert!(f.windows(2).all(|w| w[1] <= w[0]));
            assert!(f.iter().all(|&x| x > 0.0 && x <= 1.0));
        }
    }

    #[test]
    fn test_focusing_is_clipped() {
        let ice = IceModel::new(IceModelKind::SouthPole2015);
        let rt = AnalyticRayTracer::new(ice, 0, Some(2.0));
        for s in rt.trace(Vec3::new(0.0, 0.0, -800.0), Vec3::new(700.0, 0.0, -60.0), None) {
            assert!(s.focusing > 0.0 && s.focusing <= 2.0);
        }
    }

    #[test]
    fn test_homogeneous_focusing_formula_is_unity() {
        // Same geometry in the limit of a tiny gradient behaves like straight lines
        let mut ice = IceModel::new(IceModelKind::SouthPole2015);
        ice.delta_n = 1e-7;
        let rt = AnalyticRayTracer::new(ice, 0, Some(10.0));
        let sols = rt.trace(Vec3::new(0.0, 0.0, -900.0), Vec3::new(500.0, 0.0, -400.0), None);
        let direct = sols.iter().find(|s| s.solution_type == SolutionType::Direct).unwrap();
        assert!((direct.focusing - 1.0).abs() < 1e-3, "f = {}", direct.focusing);
    }
}
