//! The particle network simulation.
//!
//! One tick runs spawn, clustering, collision resolution, forces and
//! integration strictly in that order. All mutable state lives in
//! [`Simulation`]; the host only supplies [`FrameInputs`].

pub mod cluster;
pub mod collision;
pub mod forces;
pub mod integrate;
pub mod spawn;
pub mod store;
pub mod tension;

use std::collections::BTreeSet;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace};

use crate::{
    config::{self, Settings},
    spatial::SpatialHash,
    types::{FrameInputs, Particle, ParticleId},
};

use cluster::{compute_clusters, Bond};
use spawn::Spawner;
use store::{ParticleSpec, ParticleStore};
use tension::TensionMatrix;

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Option<ParticleId>,
    pub destroyed: usize,
    pub merges: usize,
    pub repulsions: usize,
    pub snaps: usize,
    pub kicked: usize,
    pub bonds: usize,
    pub largest_cluster: usize,
    pub physics_skipped: bool,
}

/// Running totals plus the latest cluster picture, for the host's status line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    pub ticks: u64,
    pub particles: usize,
    pub clusters: usize,
    pub largest_cluster: usize,
    pub linked: usize,
    pub bonds: usize,
    pub spawned: u64,
    pub destroyed: u64,
    pub merges: u64,
    pub repulsions: u64,
    pub snaps: u64,
    pub kicks: u64,
    pub skipped: u64,
}

impl SimStats {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.spawned.is_some() {
            self.spawned += 1;
        }
        self.destroyed += report.destroyed as u64;
        self.merges += report.merges as u64;
        self.repulsions += report.repulsions as u64;
        self.snaps += report.snaps as u64;
        self.kicks += report.kicked as u64;
        if report.physics_skipped {
            self.skipped += 1;
        }
        self.bonds = report.bonds;
        self.largest_cluster = report.largest_cluster;
    }
}

pub struct Simulation {
    store: ParticleStore,
    tension: TensionMatrix,
    spawner: Spawner,
    phase: f32,
    bonds: Vec<Bond>,
    stats: SimStats,
    initial_count: usize,
    rng: StdRng,
}

impl Simulation {
    pub fn new(settings: &Settings, inputs: &FrameInputs) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spawner = Spawner::new(&mut rng);
        let mut sim = Self {
            store: ParticleStore::new(),
            tension: TensionMatrix::default(),
            spawner,
            phase: 0.0,
            bonds: Vec::new(),
            stats: SimStats::default(),
            initial_count: settings.particles,
            rng,
        };
        sim.populate(inputs);
        sim
    }

    /// Discards every particle and starts over with a fresh population.
    pub fn restart(&mut self, inputs: &FrameInputs) {
        self.store.clear();
        self.bonds.clear();
        self.phase = 0.0;
        self.spawner = Spawner::new(&mut self.rng);
        self.stats = SimStats::default();
        self.populate(inputs);
        info!(particles = self.store.len(), "simulation restarted");
    }

    fn populate(&mut self, inputs: &FrameInputs) {
        for _ in 0..self.initial_count {
            let spec = spawn::ambient(&mut self.rng, inputs);
            self.store.add(spec);
        }
        self.tension.reset(self.store.len());
        self.stats.particles = self.store.len();
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.all()
    }

    pub fn tension(&self) -> &TensionMatrix {
        &self.tension
    }

    /// Bonds from the latest cluster pass, re-indexed after any removals.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Ticks until the next spawn.
    pub fn spawn_cooldown(&self) -> i32 {
        self.spawner.cooldown()
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn add_particle(&mut self, spec: ParticleSpec) -> ParticleId {
        let id = self.store.add(spec);
        self.tension.push();
        debug_assert_eq!(self.tension.len(), self.store.len());
        id
    }

    /// Removes store positions and compacts the tension matrix and bonds to match.
    pub fn remove_particles(&mut self, indices: &BTreeSet<usize>) -> usize {
        let before = self.store.len();
        let removed = self.store.remove(indices);
        self.tension.remove(indices);
        self.bonds = reindex_bonds(&self.bonds, indices, before);
        debug_assert_eq!(self.tension.len(), self.store.len());
        removed
    }

    pub fn tick(&mut self, inputs: &FrameInputs) -> TickReport {
        let mut report = TickReport::default();
        self.phase += config::PHASE_STEP;
        let scale = inputs.device_scale;

        if self.spawner.step(&mut self.rng) {
            let spec = spawn::energetic(&mut self.rng, inputs);
            let id = self.add_particle(spec);
            debug!(id, count = self.store.len(), "spawned particle");
            report.spawned = Some(id);
        }

        let positions = self.store.positions();
        let spatial = SpatialHash::build(config::CONNECTION_RADIUS, &positions);
        let mut clusters = compute_clusters(&positions, &spatial);

        let resolution =
            collision::resolve_collisions(self.store.all_mut(), &mut clusters, &spatial);
        report.merges = resolution.merges;
        report.repulsions = resolution.repulsions;
        if resolution.merges > 0 {
            debug!(merges = resolution.merges, "clusters hijacked");
        }

        let sizes = clusters.cluster_sizes();
        report.largest_cluster = sizes.values().copied().max().unwrap_or(0);
        self.stats.clusters = sizes.len();
        self.stats.linked = (0..clusters.len())
            .filter(|&i| !clusters.neighbors(i).is_empty())
            .count();
        self.bonds = clusters.bonds().to_vec();

        if resolution.doomed.is_empty() {
            let particles = self.store.all_mut();
            forces::apply_drift(particles, self.phase, scale);
            forces::apply_springs(particles, &self.bonds, self.phase);
            report.snaps = self.tension.track(particles, &self.bonds);
            if report.snaps > 0 {
                debug!(snaps = report.snaps, "bonds snapped");
            }
            forces::apply_idle_floor(particles, &mut self.rng, scale);
            forces::apply_friction(particles);
            report.kicked = forces::inject_energy(particles, &mut self.rng, scale);
            integrate::integrate(particles, inputs.width, inputs.height);
        } else {
            // Indices are stale after removal; physics resumes next tick.
            report.destroyed = self.remove_particles(&resolution.doomed);
            report.physics_skipped = true;
            debug!(removed = report.destroyed, count = self.store.len(), "destroyed particles");
        }

        report.bonds = self.bonds.len();
        self.stats.particles = self.store.len();
        self.stats.absorb(&report);
        report
    }
}

/// Maps bonds onto post-removal store positions, dropping those that lost an end.
fn reindex_bonds(bonds: &[Bond], removed: &BTreeSet<usize>, old_len: usize) -> Vec<Bond> {
    let mut shift = vec![None; old_len];
    let mut next = 0;
    for (old, slot) in shift.iter_mut().enumerate() {
        if !removed.contains(&old) {
            *slot = Some(next);
            next += 1;
        }
    }
    bonds
        .iter()
        .filter_map(|bond| {
            let a = shift.get(bond.a).copied().flatten()?;
            let b = shift.get(bond.b).copied().flatten()?;
            Some(Bond::new(a, b))
        })
        .collect()
}

/// Outcome of one animation-frame callback.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Stopped,
    Skipped,
    Ticked(TickReport),
}

/// Wraps the simulation with the host's running flag.
pub struct Animator {
    sim: Simulation,
    running: bool,
}

impl Animator {
    pub fn new(sim: Simulation) -> Self {
        Self { sim, running: true }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(ticks = self.sim.stats().ticks, "animation stopped");
        }
        self.running = false;
    }

    pub fn restart(&mut self, inputs: &FrameInputs) {
        self.sim.restart(inputs);
    }

    /// Runs one tick unless stopped or there is nothing to draw into.
    pub fn on_frame(&mut self, inputs: &FrameInputs) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        if !inputs.has_surface() {
            trace!(width = inputs.width, height = inputs.height, "no drawing surface, frame skipped");
            return FrameOutcome::Skipped;
        }
        FrameOutcome::Ticked(self.sim.tick(inputs))
    }
}
