use std::collections::BTreeSet;

use crate::types::{Particle, ParticleId, Tone, Vec2};

/// Initial state for a particle about to enter the store.
#[derive(Clone, Copy, Debug)]
pub struct ParticleSpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub tone: Tone,
}

/// Ordered particle sequence; store position is the index every other pass uses.
#[derive(Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    next_id: ParticleId,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, spec: ParticleSpec) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;
        self.particles.push(Particle {
            id,
            pos: spec.pos,
            vel: spec.vel,
            radius: spec.radius,
            tone: spec.tone,
        });
        id
    }

    /// Removes the given store positions, highest first, keeping survivors in order.
    /// Out-of-range positions are ignored. Returns how many were removed.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> usize {
        let mut removed = 0;
        for &idx in indices.iter().rev() {
            if idx < self.particles.len() {
                self.particles.remove(idx);
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn all(&self) -> &[Particle] {
        &self.particles
    }

    pub fn all_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.particles.iter().map(|p| p.pos).collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }
}
