//! Neutrino trajectories with vertices uniform in a cylinder of ice.
//!
//! Directions are isotropic, energies fixed or drawn from E^-gamma, the
//! interaction is CC with the cross-section model's CC fraction, and the
//! inelasticity follows y = u^3 (mean 1/4). Trajectory `i` depends only on
//! (seed, i).

use crate::rng::{stream, StreamPurpose};
use nuray_earth::CrossSectionModel;
use nuray_math::vector::Vec3;
use nuray_types::error::{NurayError, NurayResult};
use nuray_types::state::{Flavor, InteractionType, Trajectory};
use rand::Rng;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergySpectrum {
    Fixed(f64),
    /// dN/dE ~ E^-gamma on [e_min, e_max] [eV].
    PowerLaw { gamma: f64, e_min: f64, e_max: f64 },
}

impl EnergySpectrum {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            EnergySpectrum::Fixed(e) => e,
            EnergySpectrum::PowerLaw { gamma, e_min, e_max } => {
                let u: f64 = rng.gen();
                if (gamma - 1.0).abs() < 1e-9 {
                    e_min * (e_max / e_min).powf(u)
                } else {
                    let k = 1.0 - gamma;
                    let lo = e_min.powf(k);
                    let hi = e_max.powf(k);
                    (lo + u * (hi - lo)).powf(1.0 / k)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    /// [m]
    pub r_max: f64,
    /// Bottom of the volume (negative, below the surface) [m].
    pub z_min: f64,
    pub z_max: f64,
}

#[derive(Debug, Clone)]
pub struct CylinderGenerator {
    volume: Cylinder,
    spectrum: EnergySpectrum,
    /// Flavours with relative weights.
    flavors: Vec<(Flavor, f64)>,
    cross_section: CrossSectionModel,
    seed: u64,
}

impl CylinderGenerator {
    /// Equal mix of all six (anti)neutrino flavours.
    pub fn new(
        volume: Cylinder,
        spectrum: EnergySpectrum,
        cross_section: CrossSectionModel,
        seed: u64,
    ) -> NurayResult<Self> {
        let flavors = Flavor::ALL.iter().map(|&f| (f, 1.0)).collect();
        Self::with_flavors(volume, spectrum, flavors, cross_section, seed)
    }

    pub fn with_flavors(
        volume: Cylinder,
        spectrum: EnergySpectrum,
        flavors: Vec<(Flavor, f64)>,
        cross_section: CrossSectionModel,
        seed: u64,
    ) -> NurayResult<Self> {
        let fail = |msg: &str| Err(NurayError::ConfigError(msg.to_string()));
        if !(volume.r_max > 0.0 && volume.z_min < volume.z_max && volume.z_max <= 0.0) {
            return fail("generator volume needs r_max > 0 and z_min < z_max <= 0");
        }
        match spectrum {
            EnergySpectrum::Fixed(e) if e > 0.0 => {}
            EnergySpectrum::PowerLaw { e_min, e_max, .. } if e_min > 0.0 && e_max > e_min => {}
            _ => return fail("generator energy must be > 0 with e_min < e_max"),
        }
        if flavors.is_empty() || flavors.iter().any(|&(_, w)| !(w >= 0.0)) || flavors.iter().all(|&(_, w)| w == 0.0) {
            return fail("generator flavour weights must be >= 0 and not all zero");
        }
        Ok(CylinderGenerator {
            volume,
            spectrum,
            flavors,
            cross_section,
            seed,
        })
    }

    pub fn volume(&self) -> &Cylinder {
        &self.volume
    }

    /// Trajectory number `index`.
    pub fn generate(&self, index: u64) -> Trajectory {
        let mut rng = stream(self.seed, index, StreamPurpose::Generator, 0);

        let r = self.volume.r_max * rng.gen::<f64>().sqrt();
        let phi = 2.0 * PI * rng.gen::<f64>();
        let z = self.volume.z_min + (self.volume.z_max - self.volume.z_min) * rng.gen::<f64>();
        let vertex = Vec3::new(r * phi.cos(), r * phi.sin(), z);

        let zenith = rng.gen_range(-1.0f64..=1.0).acos();
        let azimuth = 2.0 * PI * rng.gen::<f64>();

        let energy = self.spectrum.sample(&mut rng);
        let flavor = self.pick_flavor(rng.gen());
        let interaction = if rng.gen::<f64>() < self.cross_section.cc_fraction(energy, flavor) {
            InteractionType::Cc
        } else {
            InteractionType::Nc
        };
        // u in (0, 1] so y > 0
        let u = 1.0 - rng.gen::<f64>();
        let inelasticity = u * u * u;

        Trajectory::new(index, zenith, azimuth, vertex, flavor, energy, interaction, inelasticity)
    }

    /// Trajectories `0..n`.
    pub fn generate_batch(&self, n: u64) -> Vec<Trajectory> {
        (0..n).map(|i| self.generate(i)).collect()
    }

    fn pick_flavor(&self, u: f64) -> Flavor {
        let total: f64 = self.flavors.iter().map(|(_, w)| w).sum();
        let mut acc = 0.0;
        for &(flavor, w) in &self.flavors {
            acc += w / total;
            if u < acc {
                return flavor;
            }
        }
        self.flavors.last().map_or(Flavor::NuE, |&(f, _)| f)
    }
}
