// ─────────────────────────────────────────────────────────────────────
// Nuray — Earth
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Neutrino-nucleon cross sections, Earth density profiles and the
//! survival-probability weight of a trajectory.

pub mod cross_section;
pub mod density;
pub mod weights;

pub use cross_section::{CrossSectionModel, InteractionKind};
pub use density::DensityProfile;
pub use weights::EarthAttenuationModel;
