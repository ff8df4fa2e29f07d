//! Per-worker memo of ray solutions keyed by (vertex, channel).

use crate::RayTracingEngine;
use nuray_math::vector::Vec3;
use nuray_types::state::RaySolution;
use std::collections::HashMap;

type CacheKey = ([u64; 3], usize);

fn key(vertex: Vec3, channel_id: usize) -> CacheKey {
    ([vertex.x.to_bits(), vertex.y.to_bits(), vertex.z.to_bits()], channel_id)
}

#[derive(Debug, Default)]
pub struct RaySolutionCache {
    entries: HashMap<CacheKey, Vec<RaySolution>>,
    hits: usize,
    misses: usize,
}

impl RaySolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached solutions for (vertex, channel), tracing on a miss.
    /// With `redo` every call traces again.
    pub fn get_or_trace(
        &mut self,
        engine: &RayTracingEngine,
        vertex: Vec3,
        channel_id: usize,
        antenna: Vec3,
        redo: bool,
    ) -> &[RaySolution] {
        let k = key(vertex, channel_id);
        if redo || !self.entries.contains_key(&k) {
            self.misses += 1;
            self.entries.insert(k, engine.trace(vertex, antenna));
        } else {
            self.hits += 1;
        }
        self.entries.get(&k).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
