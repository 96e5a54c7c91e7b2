//! Per-pair bond tension.
//!
//! A dense symmetric N x N matrix indexed by store position. Growth appends a
//! zero row and column; removal drops the rows and columns of the removed
//! positions so every survivor keeps its own values whatever order particles
//! are removed in.

use std::collections::BTreeSet;

use crate::{
    config,
    core::cluster::Bond,
    types::{Particle, Vec2},
};

#[derive(Clone, Debug, Default)]
pub struct TensionMatrix {
    n: usize,
    values: Vec<f32>,
}

impl TensionMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Missing pairs read as zero.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        if i < self.n && j < self.n {
            self.values[i * self.n + j]
        } else {
            0.0
        }
    }

    /// Writes both (i, j) and (j, i); out-of-range pairs are ignored.
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        if i < self.n && j < self.n {
            self.values[i * self.n + j] = value;
            self.values[j * self.n + i] = value;
        }
    }

    pub fn push(&mut self) {
        let n = self.n + 1;
        let mut next = vec![0.0; n * n];
        for i in 0..self.n {
            next[i * n..i * n + self.n].copy_from_slice(&self.values[i * self.n..(i + 1) * self.n]);
        }
        self.n = n;
        self.values = next;
    }

    pub fn remove(&mut self, indices: &BTreeSet<usize>) {
        let survivors: Vec<usize> = (0..self.n).filter(|i| !indices.contains(i)).collect();
        let mut next = vec![0.0; survivors.len() * survivors.len()];
        for (ni, &oi) in survivors.iter().enumerate() {
            for (nj, &oj) in survivors.iter().enumerate() {
                next[ni * survivors.len() + nj] = self.values[oi * self.n + oj];
            }
        }
        self.n = survivors.len();
        self.values = next;
    }

    pub fn reset(&mut self, n: usize) {
        *self = Self::new(n);
    }

    /// Accumulates tension for each bond and snaps the ones past the break threshold.
    /// Returns the number of snapped bonds.
    pub fn track(&mut self, particles: &mut [Particle], bonds: &[Bond]) -> usize {
        let mut snaps = 0;
        for bond in bonds {
            let (i, j) = (bond.a, bond.b);
            if i >= particles.len() || j >= particles.len() {
                continue;
            }
            let dist = particles[i].pos.distance(particles[j].pos);
            let tension = self.get(i, j);
            let next = if dist < config::STUCK_DISTANCE {
                tension + 1.0
            } else {
                tension * config::TENSION_DECAY
            };
            if next > config::TENSION_BREAK {
                repel(particles, i, j, config::SNAP_IMPULSE);
                self.set(i, j, 0.0);
                snaps += 1;
            } else {
                self.set(i, j, next);
            }
        }
        snaps
    }
}

/// Pushes `i` and `j` apart along their separation, lighter particles more.
pub fn repel(particles: &mut [Particle], i: usize, j: usize, impulse: f32) {
    let dir = (particles[j].pos - particles[i].pos).normalize_or(Vec2::UNIT_X);
    let ri = particles[i].radius.max(f32::EPSILON);
    let rj = particles[j].radius.max(f32::EPSILON);
    particles[i].vel -= dir * (impulse / ri);
    particles[j].vel += dir * (impulse / rj);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tone;

    fn particle(x: f32) -> Particle {
        Particle {
            id: 0,
            pos: Vec2::new(x, 0.0),
            vel: Vec2::ZERO,
            radius: 2.0,
            tone: Tone::Dim,
        }
    }

    fn is_symmetric(m: &TensionMatrix) -> bool {
        (0..m.len()).all(|i| (0..m.len()).all(|j| m.get(i, j) == m.get(j, i)))
    }

    mod matrix {
        use super::*;

        #[test]
        fn out_of_range_reads_zero() {
            let m = TensionMatrix::new(2);
            assert_eq!(m.get(5, 0), 0.0);
            assert_eq!(m.get(0, 2), 0.0);
        }

        #[test]
        fn set_is_symmetric() {
            let mut m = TensionMatrix::new(3);
            m.set(0, 2, 7.0);
            assert_eq!(m.get(2, 0), 7.0);
            assert!(is_symmetric(&m));
        }

        #[test]
        fn push_preserves_existing_entries() {
            let mut m = TensionMatrix::new(3);
            m.set(0, 1, 1.5);
            m.set(1, 2, 2.5);
            m.push();
            assert_eq!(m.len(), 4);
            assert_eq!(m.get(0, 1), 1.5);
            assert_eq!(m.get(2, 1), 2.5);
            assert_eq!(m.get(3, 0), 0.0);
        }

        #[test]
        fn remove_keeps_survivor_pairs() {
            let mut m = TensionMatrix::new(5);
            m.set(0, 4, 3.0);
            m.set(2, 3, 9.0);
            m.set(1, 3, 4.0);
            let doomed: BTreeSet<usize> = [1].into_iter().collect();
            m.remove(&doomed);
            assert_eq!(m.len(), 4);
            // old 0/4 -> new 0/3, old 2/3 -> new 1/2
            assert_eq!(m.get(0, 3), 3.0);
            assert_eq!(m.get(1, 2), 9.0);
            assert!(is_symmetric(&m));
        }

        #[test]
        fn reset_zeroes_everything() {
            let mut m = TensionMatrix::new(2);
            m.set(0, 1, 1.0);
            m.reset(4);
            assert_eq!(m.len(), 4);
            assert_eq!(m.get(0, 1), 0.0);
        }
    }

    mod track {
        use super::*;

        #[test]
        fn close_bond_accumulates() {
            let mut particles = vec![particle(0.0), particle(20.0)];
            let mut m = TensionMatrix::new(2);
            let bonds = [Bond::new(0, 1)];
            for _ in 0..10 {
                m.track(&mut particles, &bonds);
            }
            assert_eq!(m.get(0, 1), 10.0);
            assert_eq!(m.get(1, 0), 10.0);
        }

        #[test]
        fn distant_bond_decays() {
            let mut particles = vec![particle(0.0), particle(100.0)];
            let mut m = TensionMatrix::new(2);
            m.set(0, 1, 50.0);
            m.track(&mut particles, &[Bond::new(0, 1)]);
            assert!((m.get(0, 1) - 50.0 * config::TENSION_DECAY).abs() < 1e-4);
        }

        #[test]
        fn stuck_bond_snaps_after_threshold() {
            let mut particles = vec![particle(0.0), particle(20.0)];
            let mut m = TensionMatrix::new(2);
            let bonds = [Bond::new(0, 1)];
            let threshold = config::TENSION_BREAK as usize;
            for _ in 0..threshold {
                assert_eq!(m.track(&mut particles, &bonds), 0);
            }
            assert_eq!(particles[0].vel, Vec2::ZERO);

            let before = (particles[1].vel - particles[0].vel).x;
            assert_eq!(m.track(&mut particles, &bonds), 1);
            let after = (particles[1].vel - particles[0].vel).x;
            assert_eq!(m.get(0, 1), 0.0);
            assert_eq!(m.get(1, 0), 0.0);
            assert!(after > before);
        }

        #[test]
        fn stale_bond_is_ignored() {
            let mut particles = vec![particle(0.0)];
            let mut m = TensionMatrix::new(1);
            assert_eq!(m.track(&mut particles, &[Bond::new(0, 3)]), 0);
        }
    }

    mod repel_fn {
        use super::*;

        #[test]
        fn heavier_particle_moves_less() {
            let mut particles = vec![particle(0.0), particle(10.0)];
            particles[1].radius = 4.0;
            repel(&mut particles, 0, 1, 2.0);
            assert!(particles[0].vel.x < 0.0);
            assert!(particles[1].vel.x > 0.0);
            assert!(particles[1].vel.x < -particles[0].vel.x);
        }

        #[test]
        fn coincident_particles_still_separate() {
            let mut particles = vec![particle(5.0), particle(5.0)];
            repel(&mut particles, 0, 1, 2.0);
            assert!(particles[1].vel.x - particles[0].vel.x > 0.0);
        }
    }
}
