//! Per-trajectory random sub-streams.
//!
//! Every stream is an independent `StdRng` seeded from a SplitMix64 mix of
//! (run seed, trajectory index, purpose, channel), so a trajectory draws
//! the same numbers whichever worker simulates it.

use rand::rngs::StdRng;
use rand::SeedableRng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPurpose {
    /// Sampling of the trajectory itself.
    Generator,
    /// Noise of one readout event.
    Noise { event: usize },
}

impl StreamPurpose {
    fn code(self) -> u64 {
        match self {
            StreamPurpose::Generator => 1,
            StreamPurpose::Noise { event } => 2 | ((event as u64) << 8),
        }
    }
}

/// SplitMix64 finalizer.
pub fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn stream_seed(seed: u64, trajectory: u64, purpose: StreamPurpose, channel: u64) -> u64 {
    let mut h = splitmix64(seed);
    for word in [trajectory, purpose.code(), channel] {
        h = splitmix64(h ^ word);
    }
    h
}

pub fn stream(seed: u64, trajectory: u64, purpose: StreamPurpose, channel: u64) -> StdRng {
    StdRng::seed_from_u64(stream_seed(seed, trajectory, purpose, channel))
}
